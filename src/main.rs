use std::sync::Arc;

// external packages
use futures_util::StreamExt;

// reywen lib
use reywen::{
    client::Client,
    websocket::{data::WebSocketEvent, WebSocket},
};

use memebot::{
    transport::revolt::{self, Revolt},
    Bot, BotConfig, Services,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("memebot=info")),
        )
        .init();

    let mut config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!("booting...");

    let client = match Client::from_token(&config.token, true) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = ?e, "could not create client");
            std::process::exit(1);
        }
    };

    if config.bot_id.is_none() {
        match client.user_fetch_self().await {
            Ok(user) => config = config.with_bot_id(user.id),
            Err(e) => tracing::warn!(error = ?e, "could not look up own user id"),
        }
    }

    let services = Services::load(&config);
    tracing::info!(
        memes = services.media.read().await.len(),
        "loaded media list"
    );

    let token = config.token.clone();
    let bot = Bot::new(Arc::new(Revolt::new(client)), services, config);

    let (mut read, _write) = WebSocket::from_token(&token).dual_async().await;
    tracing::info!("websocket established");

    // one event at a time; upload sessions run on their own tasks
    while let Some(event) = read.next().await {
        match event {
            WebSocketEvent::Message { message } => bot.on_message((&message).into()).await,
            WebSocketEvent::MessageDelete {
                message_id,
                channel_id,
            } => bot.on_delete(revolt::deletion(message_id, channel_id)).await,
            _ => {}
        }
    }

    tracing::warn!("websocket closed, shutting down");
}
