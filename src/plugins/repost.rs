use std::time::Duration;

use super::Bot;
use crate::{
    error::TransportError,
    transport::{AuditEntry, Deletion},
};

// audit entries older than this relative to the message are someone else's
const AUDIT_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// not ours, or not a meme we can identify
    Ignored,
    /// the owner deleted it
    Suppressed,
    Reposted { url: String, by: Option<String> },
    Failed,
}

pub async fn on_delete(bot: &Bot, deletion: Deletion) -> Outcome {
    let Some(url) = carried_item(bot, &deletion).await else {
        return Outcome::Ignored;
    };

    let deleter = match bot.transport.last_message_delete(&deletion.channel).await {
        Ok(entry) => entry.filter(|entry| matches_deletion(bot, entry, &deletion)),
        Err(TransportError::Unsupported(what)) => {
            tracing::debug!(what, "no audit log, reposting anonymously");
            None
        }
        Err(e) => {
            tracing::warn!(channel = %deletion.channel, error = %e, "audit log lookup failed");
            None
        }
    }
    .map(|entry| entry.actor);

    if deleter.as_deref().is_some_and(|actor| bot.config.is_owner(actor)) {
        tracing::info!(%url, "owner deleted a meme, not reposting");
        return Outcome::Suppressed;
    }

    let header = match &deleter {
        Some(actor) => format!(
            "{} deleted my meme! Here it is again:",
            bot.transport.mention(actor)
        ),
        None => String::from("Someone deleted my meme! Here it is again:"),
    };

    if let Err(e) = bot.transport.send(&deletion.channel, &header).await {
        tracing::warn!(channel = %deletion.channel, error = %e, "failed to repost meme");
        return Outcome::Failed;
    }
    match bot.transport.send(&deletion.channel, &url).await {
        Ok(message_id) => {
            tracing::info!(channel = %deletion.channel, %url, deleter = ?deleter, "reposted deleted meme");
            bot.services.sent.write().await.insert(message_id, url.as_str());
            Outcome::Reposted { url, by: deleter }
        }
        Err(e) => {
            tracing::warn!(channel = %deletion.channel, error = %e, "failed to repost meme");
            Outcome::Failed
        }
    }
}

/// Works out which stored item a deleted message carried: first from what we
/// recorded at send time, then by searching the message text when the
/// platform kept it and the message was ours.
async fn carried_item(bot: &Bot, deletion: &Deletion) -> Option<String> {
    let ours = match (&deletion.author, &bot.config.bot_id) {
        (Some(author), Some(bot_id)) => Some(author == bot_id),
        _ => None,
    };
    if ours == Some(false) {
        return None;
    }

    let recorded = bot.services.sent.write().await.take(&deletion.id);
    let media = bot.services.media.read().await;
    match recorded {
        // removed from the list since it was sent
        Some(url) => media.contains(&url).then_some(url),
        None if ours == Some(true) => deletion
            .content
            .as_deref()
            .and_then(|content| media.find_in(content))
            .map(String::from),
        None => None,
    }
}

fn matches_deletion(bot: &Bot, entry: &AuditEntry, deletion: &Deletion) -> bool {
    let targets_bot = bot
        .config
        .bot_id
        .as_deref()
        .map_or(true, |bot_id| entry.target == bot_id);
    let recent = deletion
        .created_at
        .map_or(true, |created| entry.at + AUDIT_WINDOW > created);
    targets_bot && recent
}
