use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{AuditEntry, ChannelKind, ChannelRef, Transport};
use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub channel: String,
    pub content: String,
    pub id: String,
    pub at: Instant,
}

/// In-memory platform that records every send.
#[derive(Default)]
pub struct RecordingTransport {
    pub channels: HashMap<String, ChannelKind>,
    /// sends whose content is listed here fail
    pub failing: HashSet<String>,
    pub audit: Option<Result<Option<AuditEntry>, ()>>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_channel(mut self, id: &str, server: &str, name: &str) -> Self {
        self.channels.insert(
            id.to_owned(),
            ChannelKind::Server {
                server: server.to_owned(),
                name: name.to_owned(),
            },
        );
        self
    }

    pub fn with_dm(mut self, id: &str) -> Self {
        self.channels.insert(id.to_owned(), ChannelKind::Direct);
        self
    }

    pub fn failing_on(mut self, content: &str) -> Self {
        self.failing.insert(content.to_owned());
        self
    }

    pub fn with_audit(mut self, audit: Result<Option<AuditEntry>, ()>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|s| s.channel == channel)
            .map(|s| s.content)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, channel: &str, content: &str) -> Result<String, TransportError> {
        if self.failing.contains(content) {
            return Err(TransportError::Send(String::from("missing permission")));
        }
        let mut sent = self.sent.lock().unwrap();
        let id = format!("msg-{}", sent.len());
        sent.push(Sent {
            channel: channel.to_owned(),
            content: content.to_owned(),
            id: id.clone(),
            at: Instant::now(),
        });
        Ok(id)
    }

    async fn channel_kind(&self, channel: &str) -> Result<ChannelKind, TransportError> {
        self.channels
            .get(channel)
            .cloned()
            .ok_or_else(|| TransportError::Lookup(format!("unknown channel {channel}")))
    }

    async fn find_channel(
        &self,
        server: &str,
        name: &str,
    ) -> Result<Option<ChannelRef>, TransportError> {
        Ok(self.channels.iter().find_map(|(id, kind)| match kind {
            ChannelKind::Server { server: s, name: n } if s == server && n == name => {
                Some(ChannelRef {
                    id: id.clone(),
                    name: n.clone(),
                })
            }
            _ => None,
        }))
    }

    async fn last_message_delete(
        &self,
        _channel: &str,
    ) -> Result<Option<AuditEntry>, TransportError> {
        match &self.audit {
            None => Err(TransportError::Unsupported("audit log")),
            Some(Ok(entry)) => Ok(entry.clone()),
            Some(Err(())) => Err(TransportError::Lookup(String::from("audit log forbidden"))),
        }
    }
}
