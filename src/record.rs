//! The canonical expense record and the per-message context it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group name used when the transport could not resolve a title.
/// Capturing the expense takes priority over metadata completeness.
pub const UNKNOWN_GROUP: &str = "Unknown Group";

/// Transport-level context for one inbound message, extracted by the
/// adapter at the system boundary. The pipeline never sees transport
/// types, only this struct.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub chat_id: i64,
    pub group_name: Option<String>,
    pub sender_name: String,
    /// Sender handle forwarded downstream. On Telegram this is the
    /// username (or numeric id); the webhook schema keeps the
    /// `sender_phone` key it has always used.
    pub sender_phone: String,
    pub timestamp: DateTime<Utc>,
    /// For logging and traceability only, never deduplication.
    pub message_id: String,
}

/// One finalized expense, built exactly once per successfully parsed
/// message, serialized to the automation webhook, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub item: String,
    pub amount: f64,
    pub category: String,
    pub group_name: String,
    pub sender_name: String,
    pub sender_phone: String,
    pub timestamp: DateTime<Utc>,
    pub message_id: String,
}

impl ExpenseRecord {
    /// Pure assembly; the inputs have already been validated upstream.
    pub fn build(item: &str, amount: f64, category: String, ctx: &MessageContext) -> Self {
        Self {
            item: item.trim().to_string(),
            amount,
            category,
            group_name: ctx.group_name.clone().unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            sender_name: ctx.sender_name.clone(),
            sender_phone: ctx.sender_phone.clone(),
            timestamp: ctx.timestamp,
            message_id: ctx.message_id.clone(),
        }
    }
}
