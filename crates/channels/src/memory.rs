//! In-memory [`Session`] used by the console host and tests.

use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
};

use {async_trait::async_trait, tracing::debug};

use crate::{
    Error, Result,
    model::{Channel, Guild},
    session::Session,
};

/// A message posted through [`MemorySession::send_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel_id: String,
    pub text: String,
}

/// Session backed by plain maps.
///
/// Lookups fail with [`Error::NotFound`] for anything not inserted first,
/// which mirrors a platform cache that has not seen the guild or channel.
pub struct MemorySession {
    self_user_id: String,
    guilds: RwLock<HashMap<String, Guild>>,
    channels: RwLock<HashMap<String, Channel>>,
    sent: Mutex<Vec<SentMessage>>,
    typing: Mutex<Vec<String>>,
}

impl MemorySession {
    pub fn new(self_user_id: impl Into<String>) -> Self {
        Self {
            self_user_id: self_user_id.into(),
            guilds: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_guild(self, guild: Guild) -> Self {
        self.insert_guild(guild);
        self
    }

    #[must_use]
    pub fn with_channel(self, channel: Channel) -> Self {
        self.insert_channel(channel);
        self
    }

    pub fn insert_guild(&self, guild: Guild) {
        self.guilds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(guild.id.clone(), guild);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.id.clone(), channel);
    }

    /// Snapshot of every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Channel IDs that received a typing indicator, oldest first.
    pub fn typing(&self) -> Vec<String> {
        self.typing.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Session for MemorySession {
    fn self_user_id(&self) -> &str {
        &self.self_user_id
    }

    async fn guild(&self, guild_id: &str) -> Result<Guild> {
        self.guilds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(guild_id)
            .cloned()
            .ok_or_else(|| Error::not_found("guild", guild_id))
    }

    async fn channel(&self, channel_id: &str) -> Result<Channel> {
        self.channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel_id)
            .cloned()
            .ok_or_else(|| Error::not_found("channel", channel_id))
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        debug!(channel_id, len = text.len(), "memory session: send_text");
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                channel_id: channel_id.to_string(),
                text: text.to_string(),
            });
        Ok(())
    }

    async fn send_typing(&self, channel_id: &str) -> Result<()> {
        self.typing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(channel_id.to_string());
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_lookups_fail() {
        let session = MemorySession::new("bot");
        assert!(matches!(
            session.guild("g").await,
            Err(Error::NotFound { kind: "guild", .. })
        ));
        assert!(matches!(
            session.channel("c").await,
            Err(Error::NotFound { kind: "channel", .. })
        ));
    }

    #[tokio::test]
    async fn records_outbound_calls() {
        let session = MemorySession::new("bot")
            .with_guild(Guild::new("g", "guild"))
            .with_channel(Channel::guild_text("c", "general", "g"));

        assert_eq!(session.guild("g").await.unwrap().name, "guild");
        assert_eq!(session.channel("c").await.unwrap().guild_id.as_deref(), Some("g"));

        session.send_typing("c").await.unwrap();
        session.send_text("c", "pong").await.unwrap();

        assert_eq!(session.typing(), vec!["c".to_string()]);
        assert_eq!(session.sent(), vec![SentMessage {
            channel_id: "c".into(),
            text: "pong".into(),
        }]);
    }
}
