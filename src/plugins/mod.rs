use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc, Mutex};

use crate::{
    config::BotConfig,
    store::{shared, MediaStore, PostingTracker, SentTable, Shared},
    transport::{channel_mention, ChannelKind, ChannelRef, Deletion, Incoming, Transport},
};

pub mod admin;
pub mod command;
pub mod post;
pub mod repost;
pub mod upload;

pub use command::Command;

pub const DENIED: &str = "You don't have permission to use this command!";
pub const DM_ONLY: &str = "Please use this command in DMs!";
pub const SERVER_ONLY: &str = "This command can only be used in a server!";
pub const STORE_ERROR: &str =
    "**Storage error, the change is kept in memory but may not survive a restart**";

/// The bot's state. Each store sits behind its own lock; take them in the
/// order media -> tracker -> sent.
#[derive(Debug, Clone)]
pub struct Services {
    pub media: Shared<MediaStore>,
    pub tracker: Shared<PostingTracker>,
    pub sent: Shared<SentTable>,
}

impl Services {
    pub fn load(config: &BotConfig) -> Self {
        Self::new(
            MediaStore::load(&config.media_path),
            PostingTracker::load(&config.posted_path),
            SentTable::new(config.sent_capacity, config.sent_ttl()),
        )
    }

    pub fn new(media: MediaStore, tracker: PostingTracker, sent: SentTable) -> Self {
        Self {
            media: shared(media),
            tracker: shared(tracker),
            sent: shared(sent),
        }
    }
}

/// (author, channel) of a running upload session
pub type SessionKey = (String, String);

#[derive(Clone)]
pub struct Bot {
    pub transport: Arc<dyn Transport>,
    pub services: Services,
    pub config: Arc<BotConfig>,
    sessions: Arc<Mutex<HashMap<SessionKey, mpsc::Sender<Incoming>>>>,
}

impl Bot {
    pub fn new(transport: Arc<dyn Transport>, services: Services, config: BotConfig) -> Self {
        Self {
            transport,
            services,
            config: Arc::new(config),
            sessions: Arc::default(),
        }
    }

    pub async fn on_message(&self, message: Incoming) {
        if self.config.bot_id.as_deref() == Some(message.author.as_str()) {
            return;
        }

        // commands win over a running upload session
        let Some(command) = Command::parse(&self.config.prefix, message.content()) else {
            self.route_to_session(message).await;
            return;
        };
        tracing::debug!(?command, author = %message.author, channel = %message.channel, "command");

        if command.needs_owner() && !self.config.is_owner(&message.author) {
            tracing::info!(author = %message.author, ?command, "denied non-owner");
            self.reply(&message.channel, DENIED).await;
            return;
        }

        match command {
            Command::Upload => upload::start(self, &message).await,
            Command::Remove(url) => admin::remove(self, &message, &url).await,
            Command::List => admin::list(self, &message).await,
            Command::Post(target) => post::on_command(self, &message, target).await,
            Command::Clear(target) => admin::clear(self, &message, target).await,
            Command::ClearAll => admin::clear_all(self, &message).await,
            Command::Help => {
                self.reply(&message.channel, &command::help(&self.config.prefix))
                    .await;
            }
            Command::Usage(usage) => {
                self.reply(
                    &message.channel,
                    &format!("Usage: `{}{usage}`", self.config.prefix),
                )
                .await;
            }
        }
    }

    pub async fn on_delete(&self, deletion: Deletion) {
        repost::on_delete(self, deletion).await;
    }

    /// Sends `content`, logging instead of failing.
    pub async fn reply(&self, channel: &str, content: &str) -> Option<String> {
        match self.transport.send(channel, content).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(%channel, error = %e, "reply failed");
                None
            }
        }
    }

    /// Hands the message to an upload session waiting on this author and channel.
    /// Anything else that is not a command is dropped.
    async fn route_to_session(&self, message: Incoming) {
        let key = (message.author.clone(), message.channel.clone());
        let Some(sender) = self.sessions.lock().await.get(&key).cloned() else {
            return;
        };
        if sender.send(message).await.is_err() {
            // session ended between lookup and send
            self.sessions.lock().await.remove(&key);
        }
    }

    /// Resolves a `<#id>` mention or a channel name within the server of `origin`.
    /// `None` as target means the origin channel itself.
    pub async fn resolve_target(
        &self,
        origin: &str,
        target: Option<&str>,
    ) -> Result<Option<ChannelRef>, Target> {
        let server = match self.transport.channel_kind(origin).await {
            Ok(ChannelKind::Server { server, name }) => {
                if target.is_none() {
                    return Ok(Some(ChannelRef {
                        id: origin.to_owned(),
                        name,
                    }));
                }
                server
            }
            Ok(_) => return Err(Target::NotInServer),
            Err(e) => {
                tracing::warn!(channel = %origin, error = %e, "could not inspect channel");
                return Err(Target::NotInServer);
            }
        };

        let target = target.unwrap_or_default();
        if let Some(id) = channel_mention(target) {
            return Ok(match self.transport.channel_kind(id).await {
                Ok(ChannelKind::Server { name, .. }) => Some(ChannelRef {
                    id: id.to_owned(),
                    name,
                }),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(channel = %id, error = %e, "mentioned channel lookup failed");
                    None
                }
            });
        }

        let name = target.trim_start_matches('#');
        match self.transport.find_channel(&server, name).await {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::warn!(%server, %name, error = %e, "channel lookup failed");
                Ok(None)
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    NotInServer,
}
