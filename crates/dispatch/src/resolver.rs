//! Per-message prefix and language resolution.
//!
//! Both resolvers receive the message and whether it arrived in a DM, so a
//! host can implement per-guild prefixes or per-user languages. Plain closures
//! work as resolvers:
//!
//! ```rust,ignore
//! Bot::builder().prefix(|msg: &Message, is_dm: bool| {
//!     if is_dm { String::new() } else { guild_prefix(msg) }
//! })
//! ```

use sapphire_channels::Message;

pub trait PrefixResolver: Send + Sync {
    fn prefix(&self, message: &Message, is_dm: bool) -> String;
}

impl<F> PrefixResolver for F
where
    F: Fn(&Message, bool) -> String + Send + Sync,
{
    fn prefix(&self, message: &Message, is_dm: bool) -> String {
        self(message, is_dm)
    }
}

pub trait LanguageResolver: Send + Sync {
    /// Key into the bot's locale table.
    fn language(&self, message: &Message, is_dm: bool) -> String;
}

impl<F> LanguageResolver for F
where
    F: Fn(&Message, bool) -> String + Send + Sync,
{
    fn language(&self, message: &Message, is_dm: bool) -> String {
        self(message, is_dm)
    }
}

/// Fixed prefix, optionally different in direct messages.
#[derive(Debug, Clone)]
pub struct StaticPrefix {
    prefix: String,
    dm_prefix: Option<String>,
}

impl StaticPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dm_prefix: None,
        }
    }

    #[must_use]
    pub fn with_dm_prefix(mut self, dm_prefix: impl Into<String>) -> Self {
        self.dm_prefix = Some(dm_prefix.into());
        self
    }
}

impl PrefixResolver for StaticPrefix {
    fn prefix(&self, _message: &Message, is_dm: bool) -> String {
        match (&self.dm_prefix, is_dm) {
            (Some(dm), true) => dm.clone(),
            _ => self.prefix.clone(),
        }
    }
}

/// Same language for every message.
#[derive(Debug, Clone)]
pub struct StaticLanguage(pub String);

impl LanguageResolver for StaticLanguage {
    fn language(&self, _message: &Message, _is_dm: bool) -> String {
        self.0.clone()
    }
}
