use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Automation webhook (n8n or compatible) that receives finalized expense records.
    #[serde(default)]
    webhook_url: Option<String>,
    /// Chat-completion provider for fallback categorization ("deepseek" or "openai").
    #[serde(default)]
    llm_provider: String,
    #[serde(default)]
    llm_api_key: String,
    /// Port for the liveness endpoint.
    #[serde(default = "default_health_port")]
    health_port: u16,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_health_port() -> u16 {
    8080
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Missing URL disables dispatch entirely (fails closed).
    pub webhook_url: Option<String>,
    /// Empty provider or key disables remote categorization (fails open).
    pub llm_provider: String,
    pub llm_api_key: String,
    pub health_port: u16,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        // Validate required fields
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        // An empty webhook URL means "not configured", same as omitting the field
        let webhook_url = file.webhook_url.filter(|url| !url.is_empty());
        if let Some(ref url) = webhook_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "webhook_url must be an HTTP(S) URL, got '{url}'"
            )));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            webhook_url,
            llm_provider: file.llm_provider,
            llm_api_key: file.llm_api_key,
            health_port: file.health_port,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz",
            "webhook_url": "https://n8n.example.com/webhook/expenses",
            "llm_provider": "deepseek",
            "llm_api_key": "sk-test"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://n8n.example.com/webhook/expenses")
        );
        assert_eq!(config.llm_provider, "deepseek");
        assert_eq!(config.health_port, 8080);
    }

    #[test]
    fn test_minimal_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef"
        }"#);
        let config = Config::load(file.path()).expect("should load minimal config");
        assert!(config.webhook_url.is_none());
        assert!(config.llm_provider.is_empty());
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_empty_webhook_url_means_unconfigured() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "webhook_url": ""
        }"#);
        let config = Config::load(file.path()).expect("should load config");
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_non_http_webhook_url() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "webhook_url": "ftp://example.com/hook"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("webhook_url"));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
