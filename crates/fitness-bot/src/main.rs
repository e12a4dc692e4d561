mod config;

use database::Database;
use dialog::{DialogConfig, DialogEngine};
use message_listener::{MessageProcessor, ProcessorConfig};
use telegram_client::{TelegramClient, TelegramConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::BotConfig;

fn telegram_config(config: &BotConfig) -> TelegramConfig {
    let mut telegram = TelegramConfig::new(&config.telegram_token);
    if let Some(url) = &config.api_url {
        telegram = telegram.with_api_url(url);
    }
    if let Some(timeout) = config.poll_timeout {
        telegram = telegram.with_poll_timeout(timeout);
    }
    telegram
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()?;
    info!(
        "Starting fitness bot (telegram-client {}, admin @{})",
        telegram_client::version(),
        config.admin_username
    );

    let db = Database::connect_with_pool_size(&config.database_url, config.pool_size).await?;
    db.migrate().await?;

    let client = TelegramClient::connect(telegram_config(&config)).await?;
    let engine = DialogEngine::new(
        db.clone(),
        client.clone(),
        DialogConfig::new(config.admin_username.clone()),
    );

    let processor_config = ProcessorConfig {
        skip_backlog: config.skip_backlog,
        ..Default::default()
    };

    let processor = MessageProcessor::new(client, engine, processor_config);
    processor.run_until_stopped().await?;

    db.close().await;
    info!("Fitness bot stopped");
    Ok(())
}
