//! Splits raw group-chat text into admin commands and expense candidates.

use regex::Regex;

/// Result of classifying one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedMessage {
    /// A recognized slash command, e.g. `/status`.
    AdminCommand {
        name: String,
        /// Trailing text after the command word. No command consumes it
        /// yet; kept for future parameterization (e.g. `/summary july`).
        args: String,
    },
    /// Looks like `<description> <amount>`; amount still unparsed.
    ExpenseCandidate { item: String, raw_amount: String },
    /// Anything else. Dropped silently to avoid noise in busy groups.
    Ignored,
}

pub struct Classifier {
    command: Regex,
    expense: Regex,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            command: Regex::new(r"^/(summary|categories|help|status)\s*(.*)$").unwrap(),
            // Non-greedy item capture, then a numeric token that may use
            // `.` or `,` as three-digit group separators and an optional
            // two-digit decimal suffix ("25.000", "25,000.00", "50000").
            expense: Regex::new(r"^(.+?)\s+(\d+(?:[.,]\d{3})*(?:[.,]\d{2})?)$").unwrap(),
        }
    }

    pub fn classify(&self, text: &str) -> ClassifiedMessage {
        let text = text.trim();

        if let Some(caps) = self.command.captures(text) {
            return ClassifiedMessage::AdminCommand {
                name: caps[1].to_string(),
                args: caps[2].to_string(),
            };
        }

        if let Some(caps) = self.expense.captures(text) {
            return ClassifiedMessage::ExpenseCandidate {
                item: caps[1].to_string(),
                raw_amount: caps[2].to_string(),
            };
        }

        ClassifiedMessage::Ignored
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
