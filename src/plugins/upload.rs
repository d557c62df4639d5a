use tokio::{sync::mpsc, time::timeout};

use super::{Bot, DM_ONLY, STORE_ERROR};
use crate::transport::{ChannelKind, Incoming};

pub const PROMPT: &str = "Please send your images. Type 'done' when you're finished.";
pub const COMPLETED: &str = "Upload session completed!";
pub const ALREADY_RUNNING: &str = "An upload session is already running here.";
pub const NO_IMAGES: &str =
    "No images found in message. Please send images or type 'done' to finish.";
pub const DUPLICATE: &str = "This meme was already in the list!";

/// Opens an upload session for the (already authorised) author of `message`.
pub async fn start(bot: &Bot, message: &Incoming) {
    match bot.transport.channel_kind(&message.channel).await {
        Ok(ChannelKind::Direct) => {}
        Ok(_) => {
            bot.reply(&message.channel, DM_ONLY).await;
            return;
        }
        Err(e) => {
            tracing::warn!(channel = %message.channel, error = %e, "could not inspect channel");
            bot.reply(&message.channel, DM_ONLY).await;
            return;
        }
    }

    let key = (message.author.clone(), message.channel.clone());
    let (sender, receiver) = mpsc::channel(16);
    {
        let mut sessions = bot.sessions.lock().await;
        if sessions.contains_key(&key) {
            drop(sessions);
            bot.reply(&message.channel, ALREADY_RUNNING).await;
            return;
        }
        sessions.insert(key.clone(), sender.clone());
    }

    tracing::info!(author = %message.author, channel = %message.channel, "upload session started");
    bot.reply(&message.channel, PROMPT).await;

    let bot = bot.clone();
    tokio::spawn(async move {
        run(&bot, &key.1, receiver).await;

        let mut sessions = bot.sessions.lock().await;
        if sessions
            .get(&key)
            .is_some_and(|current| current.same_channel(&sender))
        {
            sessions.remove(&key);
        }
        tracing::info!(author = %key.0, channel = %key.1, "upload session ended");
    });
}

/// Feeds messages into the media store until "done", the sender goes away,
/// or nothing arrives within the idle timeout.
pub async fn run(bot: &Bot, channel: &str, mut receiver: mpsc::Receiver<Incoming>) {
    let idle = bot.config.upload_timeout();
    loop {
        match timeout(idle, receiver.recv()).await {
            Err(_) => {
                bot.reply(
                    channel,
                    &format!(
                        "Upload session timed out after {} seconds of inactivity.",
                        idle.as_secs()
                    ),
                )
                .await;
                return;
            }
            Ok(None) => return,
            Ok(Some(message)) => {
                if message.content().trim().eq_ignore_ascii_case("done") {
                    bot.reply(channel, COMPLETED).await;
                    return;
                }
                accept(bot, channel, &message).await;
            }
        }
    }
}

async fn accept(bot: &Bot, channel: &str, message: &Incoming) {
    if message.attachments.is_empty() {
        bot.reply(channel, NO_IMAGES).await;
        return;
    }

    for attachment in &message.attachments {
        if !bot.config.is_supported(&attachment.filename) {
            bot.reply(
                channel,
                &format!(
                    "Skipped {} - not a supported image format",
                    attachment.filename
                ),
            )
            .await;
            continue;
        }

        if attachment.size > bot.config.size_warn_bytes {
            bot.reply(
                channel,
                &format!(
                    "Warning: {} is {:.1} MiB, some clients may not preview it.",
                    attachment.filename,
                    attachment.size as f64 / (1024.0 * 1024.0)
                ),
            )
            .await;
        }

        let added = bot.services.media.write().await.add(attachment.url.as_str());
        let reply = match added {
            Ok(true) => format!("Added: {}", attachment.url),
            Ok(false) => DUPLICATE.to_string(),
            Err(_) => format!("Added: {}\n{STORE_ERROR}", attachment.url),
        };
        bot.reply(channel, &reply).await;
    }
}
