//! # catatbot
//!
//! Telegram group-chat expense tracker. Messages shaped like
//! `"sate ayam 50000"` are parsed into structured expense records,
//! categorized (keyword table first, LLM fallback), and relayed to an
//! automation webhook; slash commands get canned replies.

pub mod amount;
pub mod bot;
pub mod categorizer;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod health;
pub mod record;
