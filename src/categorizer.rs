//! Two-tier expense categorization: keyword table first, LLM fallback.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Label when no keyword matches and no LLM provider is configured.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Label when the LLM call fails for any reason. Categorization must
/// never block expense recording.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Substring → category table covering the common cases, to keep most
/// messages off the LLM entirely. Keywords are lowercase; the item text
/// is lowercased before matching. If several keywords match, whichever
/// comes first wins, and all mappings for a given word agree anyway.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("food", "Food"),
    ("makan", "Food"),
    ("nasi", "Food"),
    ("ayam", "Food"),
    ("sate", "Food"),
    ("transport", "Transportation"),
    ("grab", "Transportation"),
    ("gojek", "Transportation"),
    ("taxi", "Transportation"),
    ("shopping", "Shopping"),
    ("beli", "Shopping"),
    ("belanja", "Shopping"),
    ("bill", "Bills"),
    ("listrik", "Bills"),
    ("air", "Bills"),
    ("internet", "Bills"),
    ("health", "Health"),
    ("obat", "Health"),
    ("dokter", "Health"),
    ("rumah sakit", "Health"),
];

/// Tier 1: free, local, case-insensitive substring lookup.
pub fn quick_categorize(item: &str) -> Option<&'static str> {
    let item = item.to_lowercase();
    for &(keyword, category) in CATEGORY_KEYWORDS {
        if item.contains(keyword) {
            return Some(category);
        }
    }
    None
}

/// Supported chat-completion providers. Each knows its own endpoint and
/// model, so adding one is a type-checked change here rather than a
/// stringly-typed branch at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Deepseek,
    OpenAi,
}

impl Provider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "deepseek" => Some(Self::Deepseek),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            Self::Deepseek => "https://api.deepseek.com/v1/chat/completions",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    fn model(&self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek-chat",
            Self::OpenAi => "gpt-3.5-turbo",
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

pub struct Categorizer {
    provider: Option<Provider>,
    provider_id: String,
    api_key: String,
    http: reqwest::Client,
}

impl Categorizer {
    pub fn new(provider_id: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            provider: Provider::from_id(provider_id),
            provider_id: provider_id.to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    /// Categorize an item description. Never fails: every LLM error path
    /// degrades to a fixed label.
    pub async fn categorize(&self, item: &str) -> String {
        if let Some(category) = quick_categorize(item) {
            debug!("Keyword match for \"{item}\" → {category}");
            return category.to_string();
        }
        self.classify_remote(item).await
    }

    async fn classify_remote(&self, item: &str) -> String {
        if self.provider_id.is_empty() || self.api_key.is_empty() {
            return UNCATEGORIZED.to_string();
        }

        let Some(provider) = self.provider else {
            warn!("Unknown LLM provider '{}', skipping classification", self.provider_id);
            return FALLBACK_CATEGORY.to_string();
        };

        self.request_category(provider.endpoint(), provider.model(), item).await
    }

    async fn request_category(&self, endpoint: &str, model: &'static str, item: &str) -> String {
        let prompt = format!(
            "Categorize this Indonesian expense item into exactly one category: \
             Food, Transportation, Shopping, Entertainment, Bills, Health, Education, Other.\n\n\
             Item: {item}\n\n\
             Reply with only the category name."
        );

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens: 10,
            temperature: 0.1,
        };

        let response = match self
            .http
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("LLM API call failed: {e}");
                return FALLBACK_CATEGORY.to_string();
            }
        };

        if !response.status().is_success() {
            warn!("LLM API returned status {}", response.status());
            return FALLBACK_CATEGORY.to_string();
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("LLM response decode failed: {e}");
                return FALLBACK_CATEGORY.to_string();
            }
        };

        match parsed.choices.first() {
            Some(choice) => {
                let category = choice.message.content.trim();
                if category.is_empty() {
                    FALLBACK_CATEGORY.to_string()
                } else {
                    category.to_string()
                }
            }
            None => FALLBACK_CATEGORY.to_string(),
        }
    }
}
