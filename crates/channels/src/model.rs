use serde::{Deserialize, Serialize};

/// The user that sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    /// Whether the account is flagged as a bot by the platform.
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    #[must_use]
    pub fn bot(mut self) -> Self {
        self.bot = true;
        self
    }
}

/// Immutable snapshot of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub author: Author,
    /// Set when the message was posted through a webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    pub channel_id: String,
    /// `None` for direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author: Author,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author,
            webhook_id: None,
            channel_id: channel_id.into(),
            guild_id: None,
        }
    }

    #[must_use]
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    #[must_use]
    pub fn via_webhook(mut self, webhook_id: impl Into<String>) -> Self {
        self.webhook_id = Some(webhook_id.into());
        self
    }
}

/// Kind of channel a message was posted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[default]
    GuildText,
    Dm,
    GroupDm,
}

/// Resolved channel state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

impl Channel {
    /// Direct-message channel with a single user.
    pub fn dm(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind: ChannelKind::Dm,
            guild_id: None,
        }
    }

    pub fn guild_text(
        id: impl Into<String>,
        name: impl Into<String>,
        guild_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ChannelKind::GuildText,
            guild_id: Some(guild_id.into()),
        }
    }

    /// Only one-to-one DMs count; group DMs use the guild-style prefix/language.
    pub fn is_dm(&self) -> bool {
        self.kind == ChannelKind::Dm
    }
}

/// Resolved guild state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Guild {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: None,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dm_message_has_no_guild() {
        let msg = Message::new("1", "c", Author::new("u", "alice"), "hi");
        assert!(msg.guild_id.is_none());
        assert!(msg.webhook_id.is_none());
        assert!(!msg.author.bot);
    }

    #[test]
    fn deserialize_minimal_message() {
        let json = r#"{
            "id": "10",
            "content": "!ping",
            "author": { "id": "u1", "name": "alice" },
            "channel_id": "c1"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.content, "!ping");
        assert!(!msg.author.bot);
        assert_eq!(msg.guild_id, None);
    }

    #[test]
    fn channel_kinds() {
        assert!(Channel::dm("d").is_dm());
        assert!(!Channel::guild_text("t", "general", "g").is_dm());
        let group = Channel {
            kind: ChannelKind::GroupDm,
            ..Channel::dm("g")
        };
        assert!(!group.is_dm());
    }
}
