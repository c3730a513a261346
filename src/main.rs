use anyhow::Result;
use publicity_forwarder::bot::{self, PubliciseFlow, TelegramMessenger};
use publicity_forwarder::config::AppConfig;
use publicity_forwarder::destinations::ChatListFile;
use publicity_forwarder::localization;
use publicity_forwarder::observability;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    // Validate configuration early
    let config = AppConfig::from_env()?;
    config.validate()?;

    // Initialize observability stack (tracing, logging, metrics)
    observability::init_observability_with_config(config.observability.clone()).await?;
    info!(
        chat_list_path = %config.destinations.chat_list_path.display(),
        owner_restricted = config.bot.owner_id.is_some(),
        "Configuration validated successfully"
    );

    // Initialize localization manager
    let localization_manager = localization::create_localization_manager()?;

    // Initialize the bot with custom client configuration for better reliability
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.bot.http_timeout_secs))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

    let bot = Bot::with_client(config.bot.token.clone(), client);

    info!(
        timeout_secs = config.bot.http_timeout_secs,
        "Bot initialized, starting dispatcher"
    );

    // Commands suffixed with another bot's name are left to that bot
    let bot_username = Arc::new(bot.get_me().await?.username().to_string());
    info!(bot_username = %bot_username, "Bot identity resolved");

    let chat_list = ChatListFile::new(config.destinations.chat_list_path.clone());
    if !chat_list.path().exists() {
        warn!(
            path = %chat_list.path().display(),
            "Chat list not found; submissions will fail until it is created"
        );
    }

    let flow = Arc::new(
        PubliciseFlow::new(
            Arc::new(TelegramMessenger::new(bot.clone())),
            Arc::new(chat_list),
            Arc::clone(&localization_manager),
        )
        .with_owner(config.bot.owner()),
    );

    // Set up the dispatcher with the shared flow
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let flow = Arc::clone(&flow);
            let localization = Arc::clone(&localization_manager);
            let bot_username = Arc::clone(&bot_username);
            move |bot: Bot, msg: Message| {
                let flow = Arc::clone(&flow);
                let localization = Arc::clone(&localization);
                let bot_username = Arc::clone(&bot_username);
                async move {
                    bot::message_handler(bot, msg, flow, localization, bot_username).await
                }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let flow = Arc::clone(&flow);
            move |bot: Bot, q: CallbackQuery| {
                let flow = Arc::clone(&flow);
                async move { bot::callback_handler(bot, q, flow).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
