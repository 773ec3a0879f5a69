use std::sync::Arc;
use std::time::Instant;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use catatbot::bot::{self, BotState};
use catatbot::categorizer::Categorizer;
use catatbot::classifier::Classifier;
use catatbot::config::Config;
use catatbot::{dispatcher, health};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "catatbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("catatbot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting catatbot...");
    info!("Loaded config from {config_path}");
    info!(
        "📡 Webhook: {}",
        config
            .webhook_url
            .as_deref()
            .map(dispatcher::mask_url)
            .unwrap_or_else(|| "not configured".to_string())
    );
    info!(
        "🤖 LLM provider: {}",
        if config.llm_provider.is_empty() { "none" } else { &config.llm_provider }
    );

    let bot = Bot::new(&config.telegram_bot_token);

    let bot_user_id = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            me.id.0 as i64
        }
        Err(e) => {
            warn!("Failed to get bot info: {e}");
            0
        }
    };

    tokio::spawn(health::serve(config.health_port));

    let state = Arc::new(BotState {
        classifier: Classifier::new(),
        categorizer: Categorizer::new(&config.llm_provider, &config.llm_api_key),
        dispatcher: dispatcher::Dispatcher::new(config.webhook_url.clone()),
        bot_user_id,
        started_at: Instant::now(),
        config,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(bot::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
