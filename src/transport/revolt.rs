use async_trait::async_trait;
use reywen::{
    client::{methods::message::DataMessageSend, Client},
    structures::channels::{message::Message, Channel},
};

use super::{Attachment, AuditEntry, ChannelKind, ChannelRef, Deletion, Incoming, Transport};
use crate::error::TransportError;

pub const AUTUMN: &str = "https://autumn.revolt.chat/attachments";

/// Revolt over reywen's HTTP client.
#[derive(Clone)]
pub struct Revolt {
    client: Client,
}

impl Revolt {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for Revolt {
    async fn send(&self, channel: &str, content: &str) -> Result<String, TransportError> {
        self.client
            .message_send(channel, &DataMessageSend::new().set_content(content))
            .await
            .map(|Message { id, .. }| id)
            .map_err(|e| TransportError::Send(format!("{e:?}")))
    }

    async fn channel_kind(&self, channel: &str) -> Result<ChannelKind, TransportError> {
        let channel = self
            .client
            .channel_fetch(channel)
            .await
            .map_err(|e| TransportError::Lookup(format!("{e:?}")))?;

        Ok(match channel {
            Channel::DirectMessage { .. } => ChannelKind::Direct,
            Channel::TextChannel { server, name, .. } => ChannelKind::Server { server, name },
            _ => ChannelKind::Other,
        })
    }

    async fn find_channel(
        &self,
        server: &str,
        name: &str,
    ) -> Result<Option<ChannelRef>, TransportError> {
        let server = self
            .client
            .server_fetch(server)
            .await
            .map_err(|e| TransportError::Lookup(format!("{e:?}")))?;

        // revolt has no lookup by name, so walk the server's channels
        for id in server.channels {
            match self.client.channel_fetch(&id).await {
                Ok(Channel::TextChannel { name: found, .. }) if found == name => {
                    return Ok(Some(ChannelRef { id, name: found }))
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(channel = %id, error = ?e, "skipping unreadable channel"),
            }
        }
        Ok(None)
    }

    async fn last_message_delete(
        &self,
        _channel: &str,
    ) -> Result<Option<AuditEntry>, TransportError> {
        Err(TransportError::Unsupported("audit log"))
    }
}

impl From<&Message> for Incoming {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            channel: message.channel.clone(),
            author: message.author.clone(),
            content: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .flatten()
                .map(|file| Attachment {
                    url: format!(
                        "{AUTUMN}/{}/{}",
                        file.id,
                        urlencoding::encode(&file.filename)
                    ),
                    filename: file.filename.clone(),
                    size: file.size as u64,
                })
                .collect(),
        }
    }
}

/// Revolt only tells us which message went away and where.
pub fn deletion(id: String, channel: String) -> Deletion {
    Deletion {
        id,
        channel,
        ..Default::default()
    }
}
