use std::time::Duration;

use super::{Bot, Services, Target, SERVER_ONLY};
use crate::{error::TransportError, transport::Incoming, transport::Transport};

pub const NOTHING_NEW: &str = "No new memes to post!";
pub const FINISHED: &str = "Finished posting all new memes!";

#[derive(Debug, Default)]
pub struct PostReport {
    pub posted: Vec<String>,
    pub failed: Vec<(String, TransportError)>,
    /// posted, but the tracking file could not be written
    pub unsaved: usize,
}

impl PostReport {
    pub fn summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let mut out = format!(
            "Failed to post {} of {} memes:",
            self.failed.len(),
            self.failed.len() + self.posted.len()
        );
        for (url, e) in &self.failed {
            out += &format!("\n{url} ({e})");
        }
        Some(out)
    }
}

/// Items `channel` has not seen yet, in media-list order.
pub async fn pending(services: &Services, channel: &str) -> Vec<String> {
    let media = services.media.read().await;
    services.tracker.write().await.unposted(channel, &media)
}

/// Sends `items` one at a time, waiting `delay` after each. A failed send is
/// recorded and the loop carries on; items already marked stay marked.
pub async fn post_all(
    transport: &dyn Transport,
    services: &Services,
    channel: &str,
    items: Vec<String>,
    delay: Duration,
) -> PostReport {
    let mut report = PostReport::default();

    for url in items {
        match transport.send(channel, &url).await {
            Ok(message_id) => {
                if services
                    .tracker
                    .write()
                    .await
                    .mark_posted(channel, &url)
                    .is_err()
                {
                    report.unsaved += 1;
                }
                services.sent.write().await.insert(message_id, url.as_str());
                report.posted.push(url);
            }
            Err(e) => {
                tracing::warn!(%channel, %url, error = %e, "failed to post meme");
                report.failed.push((url, e));
            }
        }
        tokio::time::sleep(delay).await;
    }

    tracing::info!(
        %channel,
        posted = report.posted.len(),
        failed = report.failed.len(),
        "posting finished"
    );
    report
}

pub async fn on_command(bot: &Bot, message: &Incoming, target: Option<String>) {
    let target = target.unwrap_or_else(|| bot.config.default_channel.clone());
    let channel = match bot.resolve_target(&message.channel, Some(target.as_str())).await {
        Ok(Some(channel)) => channel,
        Ok(None) => {
            bot.reply(
                &message.channel,
                &format!(
                    "Couldn't find the #{} channel!",
                    target.trim_start_matches('#')
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

    let pending = pending(&bot.services, &channel.id).await;
    if pending.is_empty() {
        bot.reply(&message.channel, NOTHING_NEW).await;
        return;
    }

    bot.reply(
        &message.channel,
        &format!(
            "Posting {} new memes to #{}...",
            pending.len(),
            channel.name
        ),
    )
    .await;

    let report = post_all(
        bot.transport.as_ref(),
        &bot.services,
        &channel.id,
        pending,
        bot.config.send_delay(),
    )
    .await;

    if let Some(summary) = report.summary() {
        bot.reply(&message.channel, &summary).await;
    }
    if report.unsaved > 0 {
        bot.reply(&message.channel, super::STORE_ERROR).await;
    }
    bot.reply(&message.channel, FINISHED).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::*;
    use tempfile::TempDir;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn posts_in_order_with_delay() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport(), &["u1", "u2"]);

        let started = Instant::now();
        let items = pending(&bot.services, MEMES).await;
        let report = post_all(
            transport.as_ref(),
            &bot.services,
            MEMES,
            items,
            Duration::from_secs(1),
        )
        .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].content, "u1");
        assert_eq!(sent[1].content, "u2");
        assert_eq!(sent[1].at - sent[0].at, Duration::from_secs(1));
        assert!(started.elapsed() >= Duration::from_secs(2));

        assert_eq!(report.posted, vec!["u1", "u2"]);
        assert_eq!(bot.services.tracker.read().await.posted(MEMES), vec!["u1", "u2"]);
        assert_eq!(bot.services.sent.write().await.get(&sent[0].id), Some("u1"));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_stop_the_loop() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport().failing_on("u2"), &["u1", "u2", "u3"]);

        let items = pending(&bot.services, MEMES).await;
        let report = post_all(
            transport.as_ref(),
            &bot.services,
            MEMES,
            items,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(report.posted, vec!["u1", "u3"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(bot.services.tracker.read().await.posted(MEMES), vec!["u1", "u3"]);
        assert!(report
            .summary()
            .unwrap()
            .starts_with("Failed to post 1 of 3 memes:\nu2"));
    }

    #[tokio::test(start_paused = true)]
    async fn command_reports_progress() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport(), &["u1", "u2"]);

        bot.on_message(message(STRANGER, GENERAL, "!post #memes")).await;

        assert_eq!(transport.sent_to(MEMES), vec!["u1", "u2"]);
        assert_eq!(
            transport.sent_to(GENERAL),
            vec!["Posting 2 new memes to #memes...", FINISHED]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_new_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport(), &["u1"]);
        bot.services
            .tracker
            .write()
            .await
            .mark_posted(GENERAL, "u1")
            .unwrap();

        bot.on_message(message(OWNER, GENERAL, "!post")).await;

        assert_eq!(transport.sent_to(GENERAL), vec![NOTHING_NEW]);
    }

    #[tokio::test(start_paused = true)]
    async fn second_post_only_sends_new_items() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport(), &["u1"]);

        bot.on_message(message(OWNER, GENERAL, "!post <#01MEMES>")).await;
        bot.services.media.write().await.add("u2").unwrap();
        bot.on_message(message(OWNER, GENERAL, "!post <#01MEMES>")).await;

        assert_eq!(transport.sent_to(MEMES), vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn unknown_channel_and_dm() {
        let dir = TempDir::new().unwrap();
        let (bot, transport) = bot(&dir, transport(), &["u1"]);

        bot.on_message(message(OWNER, GENERAL, "!post #random")).await;
        bot.on_message(message(OWNER, DM, "!post")).await;

        assert_eq!(
            transport.sent_to(GENERAL),
            vec!["Couldn't find the #random channel!"]
        );
        assert_eq!(transport.sent_to(DM), vec![SERVER_ONLY]);
    }
}
