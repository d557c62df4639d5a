use super::{Bot, Target, SERVER_ONLY, STORE_ERROR};
use crate::{
    common::{chunk_lines, MESSAGE_LIMIT},
    transport::Incoming,
};

pub const REMOVED: &str = "Meme removed successfully!";
pub const NOT_FOUND: &str = "That meme was not found in the list!";
pub const EMPTY: &str = "No memes stored yet!";
pub const CLEARED_ALL: &str = "Cleared posting history for every channel.";

pub async fn remove(bot: &Bot, message: &Incoming, url: &str) {
    let reply = {
        let mut media = bot.services.media.write().await;
        let removed = media.remove(url);
        // a failed save still drops the item from memory, so prune either way
        let forgotten = if media.contains(url) {
            Ok(false)
        } else {
            bot.services.tracker.write().await.forget(url)
        };
        match (removed, forgotten) {
            (Ok(false), _) => NOT_FOUND,
            (Ok(true), Ok(_)) => REMOVED,
            _ => STORE_ERROR,
        }
    };
    bot.reply(&message.channel, reply).await;
}

pub async fn list(bot: &Bot, message: &Incoming) {
    let items = bot.services.media.read().await.list();
    if items.is_empty() {
        bot.reply(&message.channel, EMPTY).await;
        return;
    }

    let lines = std::iter::once("Stored memes:").chain(items.iter().map(String::as_str));
    let delay = bot.config.send_delay();
    for (i, chunk) in chunk_lines(lines, MESSAGE_LIMIT).iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        if bot.reply(&message.channel, chunk).await.is_none() {
            return;
        }
    }
}

pub async fn clear(bot: &Bot, message: &Incoming, target: Option<String>) {
    let channel = match bot.resolve_target(&message.channel, target.as_deref()).await {
        Ok(Some(channel)) => channel,
        Ok(None) => {
            bot.reply(
                &message.channel,
                &format!(
                    "Couldn't find the #{} channel!",
                    target.as_deref().unwrap_or_default().trim_start_matches('#')
                ),
            )
            .await;
            return;
        }
        Err(Target::NotInServer) => {
            bot.reply(&message.channel, SERVER_ONLY).await;
            return;
        }
    };

    let cleared = bot.services.tracker.write().await.clear_channel(&channel.id);
    tracing::info!(channel = %channel.id, "cleared posting history");
    let reply = match cleared {
        Ok(()) => format!("Cleared posting history for #{}.", channel.name),
        Err(_) => STORE_ERROR.to_string(),
    };
    bot.reply(&message.channel, &reply).await;
}

pub async fn clear_all(bot: &Bot, message: &Incoming) {
    let cleared = bot.services.tracker.write().await.clear_all();
    bot.services.sent.write().await.clear();
    tracing::info!("cleared all posting history");
    let reply = match cleared {
        Ok(()) => CLEARED_ALL,
        Err(_) => STORE_ERROR,
    };
    bot.reply(&message.channel, reply).await;
}
