//! Transport adapter: the only module that touches teloxide types.
//!
//! Filters inbound updates down to group text messages, extracts a
//! [`MessageContext`], and runs the classify → normalize → categorize →
//! build → dispatch pipeline.

use std::sync::Arc;
use std::time::Instant;

use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::{info, warn};

use crate::amount::normalize_amount;
use crate::categorizer::Categorizer;
use crate::classifier::{ClassifiedMessage, Classifier};
use crate::config::Config;
use crate::dispatcher::{self, StatusInfo};
use crate::record::{ExpenseRecord, MessageContext};

/// Shared, read-only state for all handler invocations.
pub struct BotState {
    pub config: Config,
    pub classifier: Classifier,
    pub categorizer: Categorizer,
    pub dispatcher: dispatcher::Dispatcher,
    /// Our own user id; messages we sent are never processed.
    pub bot_user_id: i64,
    pub started_at: Instant,
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    // Only group messages not sent by this bot reach the classifier.
    if !matches!(msg.chat.kind, ChatKind::Public(_)) {
        return Ok(());
    }
    if let Some(ref user) = msg.from
        && user.id.0 as i64 == state.bot_user_id
    {
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    match state.classifier.classify(text) {
        ClassifiedMessage::Ignored => {}

        ClassifiedMessage::AdminCommand { name, args } => {
            info!("Admin command /{name} in chat {}", msg.chat.id);
            let status = StatusInfo {
                uptime: state.started_at.elapsed(),
                webhook_url: state.config.webhook_url.as_deref(),
                provider: &state.config.llm_provider,
            };
            let reply = dispatcher::render_command(&name, &args, &status);
            send_reply(&bot, msg.chat.id, &reply).await;
        }

        ClassifiedMessage::ExpenseCandidate { item, raw_amount } => {
            let amount = match normalize_amount(&raw_amount) {
                Ok(a) => a,
                Err(e) => {
                    warn!("❌ Failed to parse amount: {e}");
                    send_reply(&bot, msg.chat.id, dispatcher::INVALID_AMOUNT_REPLY).await;
                    return Ok(());
                }
            };

            let category = state.categorizer.categorize(&item).await;
            let ctx = message_context(&msg);
            let record = ExpenseRecord::build(&item, amount, category, &ctx);

            match state.dispatcher.dispatch(&record).await {
                Ok(()) => {
                    info!(
                        "✅ Expense processed: {} | {} | {} | {}",
                        record.group_name, record.item, record.amount, record.category
                    );
                    send_reply(&bot, msg.chat.id, &dispatcher::confirmation_message(&record)).await;
                }
                Err(e) => {
                    warn!("❌ Failed to deliver expense (msg {}): {e}", record.message_id);
                    send_reply(&bot, msg.chat.id, dispatcher::DISPATCH_FAILED_REPLY).await;
                }
            }
        }
    }

    Ok(())
}

/// Flatten the teloxide message into the minimal context the pipeline needs.
fn message_context(msg: &Message) -> MessageContext {
    let sender_name = msg
        .from
        .as_ref()
        .map(|u| u.full_name())
        .unwrap_or_default();
    // Telegram has no phone numbers to hand out; the username (or the
    // numeric id) fills the sender handle slot in the webhook payload.
    let sender_phone = msg
        .from
        .as_ref()
        .map(|u| u.username.clone().unwrap_or_else(|| u.id.to_string()))
        .unwrap_or_default();

    MessageContext {
        chat_id: msg.chat.id.0,
        group_name: msg.chat.title().map(str::to_string),
        sender_name,
        sender_phone,
        timestamp: msg.date,
        message_id: msg.id.to_string(),
    }
}

/// Replies are fire-and-forget: a failed send is logged and dropped,
/// there is no further channel to report through.
async fn send_reply(bot: &Bot, chat_id: ChatId, text: &str) {
    if let Err(e) = bot.send_message(chat_id, text).await {
        warn!("Failed to send reply to {chat_id}: {e}");
    }
}
