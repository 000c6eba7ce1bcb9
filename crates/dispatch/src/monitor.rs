//! Monitors: handlers that see every inbound message.
//!
//! A monitor's gate flags decide which messages reach it. The defaults skip
//! messages from the bot itself, from other bots and from webhooks.

use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    async_trait::async_trait,
    sapphire_channels::{Author, Channel, Guild, Message, Session},
};

use crate::{
    Bot,
    error::{Error, Result},
};

#[async_trait]
pub trait MonitorHandler: Send + Sync {
    async fn run(&self, ctx: MonitorContext) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MonitorHandler for F
where
    F: Fn(MonitorContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: MonitorContext) -> anyhow::Result<()> {
        self(ctx).await
    }
}

/// Everything a monitor handler gets for one message.
#[derive(Clone)]
pub struct MonitorContext {
    pub bot: Arc<Bot>,
    pub session: Arc<dyn Session>,
    pub message: Arc<Message>,
    pub channel: Channel,
    /// `None` in DMs and when the guild lookup failed.
    pub guild: Option<Guild>,
    pub monitor: Arc<Monitor>,
}

impl MonitorContext {
    pub fn author(&self) -> &Author {
        &self.message.author
    }

    pub fn is_dm(&self) -> bool {
        self.channel.is_dm()
    }

    /// Post `text` to the message's channel.
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.session.send_text(&self.channel.id, text).await?;
        Ok(())
    }
}

/// Why a monitor did not run for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    GuildOnly,
    OwnMessage,
    Bot,
    Webhook,
    ChannelUnavailable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::GuildOnly => "guild_only",
            Self::OwnMessage => "own_message",
            Self::Bot => "bot",
            Self::Webhook => "webhook",
            Self::ChannelUnavailable => "channel_unavailable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Monitor {
    name: String,
    enabled: AtomicBool,
    handler: Arc<dyn MonitorHandler>,
    guild_only: bool,
    ignore_webhooks: bool,
    ignore_bots: bool,
    ignore_self: bool,
}

impl Monitor {
    pub fn new(name: impl Into<String>, handler: impl MonitorHandler + 'static) -> Self {
        Self {
            name: name.into(),
            enabled: AtomicBool::new(true),
            handler: Arc::new(handler),
            guild_only: false,
            ignore_webhooks: true,
            ignore_bots: true,
            ignore_self: true,
        }
    }

    #[must_use]
    pub fn allow_bots(mut self) -> Self {
        self.ignore_bots = false;
        self
    }

    #[must_use]
    pub fn allow_webhooks(mut self) -> Self {
        self.ignore_webhooks = false;
        self
    }

    #[must_use]
    pub fn allow_self(mut self) -> Self {
        self.ignore_self = false;
        self
    }

    #[must_use]
    pub fn guild_only(mut self, guild_only: bool) -> Self {
        self.guild_only = guild_only;
        self
    }

    /// Start disabled; enable later with [`Monitor::set_enabled`].
    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::Relaxed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    /// Apply the author and guild gates.
    ///
    /// `has_guild` is whether a guild was resolved for the message, not just
    /// whether it carried a guild id.
    pub fn admits(
        &self,
        message: &Message,
        has_guild: bool,
        self_user_id: &str,
    ) -> std::result::Result<(), SkipReason> {
        if self.guild_only && !has_guild {
            return Err(SkipReason::GuildOnly);
        }
        if self.ignore_self && message.author.id == self_user_id {
            return Err(SkipReason::OwnMessage);
        }
        if self.ignore_bots && message.author.bot {
            return Err(SkipReason::Bot);
        }
        if self.ignore_webhooks && message.webhook_id.is_some() {
            return Err(SkipReason::Webhook);
        }
        Ok(())
    }

    pub(crate) fn handler(&self) -> &Arc<dyn MonitorHandler> {
        &self.handler
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("guild_only", &self.guild_only)
            .field("ignore_webhooks", &self.ignore_webhooks)
            .field("ignore_bots", &self.ignore_bots)
            .field("ignore_self", &self.ignore_self)
            .finish_non_exhaustive()
    }
}

/// Monitors in registration order.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: Vec<Arc<Monitor>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, monitor: Monitor) -> Result<()> {
        check_name("monitor", monitor.name())?;
        if self.get(monitor.name()).is_some() {
            return Err(Error::DuplicateMonitor(monitor.name.clone()));
        }
        self.monitors.push(Arc::new(monitor));
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Monitor>> {
        self.monitors.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Monitor>> {
        self.monitors.iter().find(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.name()).collect()
    }

    /// Toggle a monitor by name. Returns `false` if no such monitor exists.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.get(name) {
            Some(monitor) => {
                monitor.set_enabled(enabled);
                true
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

pub(crate) fn check_name(kind: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
