//! Delivers expense records to the automation webhook and renders the
//! canned chat replies for admin commands.

use std::fmt;
use std::time::Duration;

use crate::record::ExpenseRecord;

/// Reply when the amount token failed to parse.
pub const INVALID_AMOUNT_REPLY: &str =
    "❌ Invalid amount format. Use numbers only (e.g., 50000)";
/// Reply when the webhook rejected or never received the record.
pub const DISPATCH_FAILED_REPLY: &str = "❌ Failed to record expense. Please try again.";

#[derive(Debug)]
pub enum DispatchError {
    /// No webhook URL configured; dispatch fails closed.
    NotConfigured,
    /// Request never completed (connect error, timeout, bad body).
    Http(String),
    /// Webhook answered with a non-200 status.
    Status(u16),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "webhook URL not configured"),
            Self::Http(e) => write!(f, "webhook request failed: {e}"),
            Self::Status(code) => write!(f, "webhook returned status {code}"),
        }
    }
}

impl std::error::Error for DispatchError {}

pub struct Dispatcher {
    webhook_url: Option<String>,
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new(webhook_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self { webhook_url, http }
    }

    /// Single at-most-once POST of the record. No retry at this layer;
    /// a failure is reported back to the chat instead.
    pub async fn dispatch(&self, record: &ExpenseRecord) -> Result<(), DispatchError> {
        let url = self.webhook_url.as_deref().ok_or(DispatchError::NotConfigured)?;

        let response = self
            .http
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(DispatchError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Live values interpolated into the `/status` reply.
pub struct StatusInfo<'a> {
    pub uptime: Duration,
    pub webhook_url: Option<&'a str>,
    pub provider: &'a str,
}

/// Map a recognized command to its fixed reply. `args` is accepted but
/// not consumed by any command yet.
pub fn render_command(name: &str, _args: &str, status: &StatusInfo<'_>) -> String {
    match name {
        "help" => "🤖 Expense Tracker Commands\n\n\
                   📝 Record an expense:\n\
                   Format: item amount\n\
                   Example: ayam bakar 50000\n\n\
                   🔧 Admin commands:\n\
                   • /summary - Monthly expense summary\n\
                   • /categories - List all categories\n\
                   • /status - Bot status\n\
                   • /help - Show this help\n\n\
                   💡 Tips:\n\
                   • Use clear item names for better categorization\n\
                   • Amount should be numbers only (50000, not 50k)\n\
                   • Bot works in group chats only"
            .to_string(),

        "status" => format!(
            "🤖 Bot Status\n\n\
             ✅ Status: Online\n\
             🕒 Uptime: {}\n\
             📡 Webhook: {}\n\
             🤖 LLM: {}\n\n\
             Ready to track expenses! 💰",
            format_uptime(status.uptime),
            status.webhook_url.map(mask_url).unwrap_or_else(|| "not configured".to_string()),
            if status.provider.is_empty() { "none" } else { status.provider },
        ),

        "categories" => "📋 Available Categories\n\n\
                         🍽️ Food - meals, snacks, groceries\n\
                         🚗 Transportation - taxi, gas, parking\n\
                         🛍️ Shopping - clothes, electronics, misc\n\
                         🎮 Entertainment - movies, games, fun\n\
                         💡 Bills - utilities, subscriptions\n\
                         🏥 Health - medicine, doctor visits\n\
                         📚 Education - books, courses, school\n\
                         📦 Other - miscellaneous expenses\n\n\
                         Categories are auto-assigned 🤖"
            .to_string(),

        "summary" => "📊 Monthly Summary\n\n\
                      Coming soon! This will show:\n\
                      • 💰 Total expenses this month\n\
                      • 📈 Top categories\n\
                      • 👥 Group member contributions\n\
                      • 📅 Daily averages\n\n\
                      For now, check the spreadsheet directly 📋"
            .to_string(),

        // Unreachable with the current classifier pattern, but cheap to handle.
        _ => "❓ Unknown command. Type /help for available commands.".to_string(),
    }
}

/// Success reply sent to the chat after the webhook accepted a record.
pub fn confirmation_message(record: &ExpenseRecord) -> String {
    format!(
        "✅ Expense Recorded\n\n\
         📝 Item: {}\n\
         💰 Amount: Rp {}\n\
         🏷️ Category: {}\n\
         👤 By: {}\n\n\
         Saved to {} expenses 📊",
        record.item,
        format_currency(record.amount),
        record.category,
        record.sender_name,
        record.group_name,
    )
}

/// Thousands-grouped whole-Rupiah formatting: 50000 → "50,000".
pub fn format_currency(amount: f64) -> String {
    let digits = (amount.round() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Hide the secret part of a webhook URL in logs and status replies.
pub fn mask_url(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() > 50 {
        let head: String = chars[..30].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{head}...{tail}")
    } else {
        url.to_string()
    }
}

/// Render an uptime as a compact "3h 12m 5s".
fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MessageContext;
    use chrono::{TimeZone, Utc};

    fn status() -> StatusInfo<'static> {
        StatusInfo {
            uptime: Duration::from_secs(3 * 3600 + 12 * 60 + 5),
            webhook_url: Some("https://n8n.example.com/webhook/expenses"),
            provider: "deepseek",
        }
    }

    #[test]
    fn test_help_lists_all_commands() {
        let reply = render_command("help", "", &status());
        for command in ["/summary", "/categories", "/status", "/help"] {
            assert!(reply.contains(command), "help should mention {command}");
        }
    }

    #[test]
    fn test_status_interpolates_live_values() {
        let reply = render_command("status", "", &status());
        assert!(reply.contains("3h 12m 5s"));
        assert!(reply.contains("n8n.example.com"));
        assert!(reply.contains("deepseek"));
    }

    #[test]
    fn test_status_without_webhook_or_provider() {
        let info = StatusInfo { uptime: Duration::from_secs(42), webhook_url: None, provider: "" };
        let reply = render_command("status", "", &info);
        assert!(reply.contains("not configured"));
        assert!(reply.contains("LLM: none"));
    }

    #[test]
    fn test_categories_lists_the_full_label_set() {
        let reply = render_command("categories", "", &status());
        for label in [
            "Food", "Transportation", "Shopping", "Entertainment",
            "Bills", "Health", "Education", "Other",
        ] {
            assert!(reply.contains(label), "categories should mention {label}");
        }
    }

    #[test]
    fn test_unknown_command_fallback() {
        let reply = render_command("reboot", "", &status());
        assert!(reply.contains("Unknown command"));
    }

    #[test]
    fn test_args_are_ignored_for_now() {
        assert_eq!(
            render_command("summary", "july 2025", &status()),
            render_command("summary", "", &status())
        );
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "0");
        assert_eq!(format_currency(500.0), "500");
        assert_eq!(format_currency(50000.0), "50,000");
        assert_eq!(format_currency(1250000.0), "1,250,000");
    }

    #[test]
    fn test_mask_url_truncates_long_urls() {
        let url = "https://n8n.example.com/webhook/3f9c2a1b-7e4d-4c5a-9b8e-6d2f1a0c3e5b";
        let masked = mask_url(url);
        assert!(masked.starts_with("https://n8n.example.com/webho"));
        assert!(masked.contains("..."));
        assert!(masked.len() < url.len());
    }

    #[test]
    fn test_mask_url_keeps_short_urls() {
        assert_eq!(mask_url("https://short.example/hook"), "https://short.example/hook");
    }

    #[test]
    fn test_confirmation_message_contents() {
        let ctx = MessageContext {
            chat_id: -100123,
            group_name: Some("Kos Warga".to_string()),
            sender_name: "Budi Santoso".to_string(),
            sender_phone: "budi_s".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            message_id: "4521".to_string(),
        };
        let record = ExpenseRecord::build("sate ayam", 50000.0, "Food".to_string(), &ctx);
        let reply = confirmation_message(&record);
        assert!(reply.contains("sate ayam"));
        assert!(reply.contains("Rp 50,000"));
        assert!(reply.contains("Food"));
        assert!(reply.contains("Budi Santoso"));
        assert!(reply.contains("Kos Warga"));
    }
}
