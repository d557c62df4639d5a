//! Everything the bot needs from the chat platform.
//!
//! The command layer only talks to [`Transport`]; [`revolt::Revolt`] binds it to
//! Revolt through reywen.

use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::TransportError;

#[cfg(test)]
pub mod recording;
pub mod revolt;

/// An inbound chat message, already stripped of platform types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Incoming {
    pub id: String,
    pub channel: String,
    pub author: String,
    pub content: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Incoming {
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

/// A deletion notification. Platforms differ in how much they tell us, so
/// everything past the ids is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deletion {
    pub id: String,
    pub channel: String,
    pub author: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelKind {
    Direct,
    Server { server: String, name: String },
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// Most recent message-delete entry from a server audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub actor: String,
    /// author of the deleted message
    pub target: String,
    pub at: SystemTime,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends plain text, returning the new message id.
    async fn send(&self, channel: &str, content: &str) -> Result<String, TransportError>;

    async fn channel_kind(&self, channel: &str) -> Result<ChannelKind, TransportError>;

    /// Looks a channel up by name within `server`.
    async fn find_channel(
        &self,
        server: &str,
        name: &str,
    ) -> Result<Option<ChannelRef>, TransportError>;

    /// Latest message deletion recorded for the server owning `channel`.
    async fn last_message_delete(
        &self,
        channel: &str,
    ) -> Result<Option<AuditEntry>, TransportError>;

    fn mention(&self, user: &str) -> String {
        format!("<@{user}>")
    }
}

/// `<#ID>` -> `ID`
pub fn channel_mention(input: &str) -> Option<&str> {
    input
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|id| !id.is_empty())
}
