//! The dispatch host: registries, resolvers and the monitor loop.

use std::{
    collections::HashMap,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use {
    futures::FutureExt,
    sapphire_channels::{Channel, Guild, Message, Session},
    sapphire_common::panic_message,
    sapphire_config::SapphireConfig,
    tokio::task::JoinHandle,
    tracing::{debug, error, info, trace},
};

#[cfg(feature = "metrics")]
use sapphire_metrics::{counter, dispatch as dispatch_metrics, histogram, labels};

use crate::{
    command::{Command, CommandRegistry},
    command_monitor::command_monitor,
    cooldown::{CooldownTracker, DEFAULT_PRUNE_EVERY},
    error::Result,
    failure::{ErrorHandler, FailureKind, LogErrorHandler, MonitorFailure},
    locale::{Locale, StaticLocale},
    monitor::{Monitor, MonitorContext, MonitorRegistry, SkipReason},
    resolver::{LanguageResolver, PrefixResolver, StaticLanguage, StaticPrefix},
};

const DEFAULT_LANGUAGE: &str = "en-US";

/// Owns every monitor and command and runs messages through them.
///
/// Built once through [`BotBuilder`] and shared as `Arc<Bot>`; only the
/// enabled toggles, cooldowns and counters change afterwards.
pub struct Bot {
    monitors: MonitorRegistry,
    commands: CommandRegistry,
    languages: HashMap<String, Arc<dyn Locale>>,
    prefix: Box<dyn PrefixResolver>,
    language: Box<dyn LanguageResolver>,
    owner_id: Option<String>,
    command_typing: bool,
    cooldowns: CooldownTracker,
    commands_ran: AtomicU64,
    error_handler: Box<dyn ErrorHandler>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub fn monitors(&self) -> &MonitorRegistry {
        &self.monitors
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn locale(&self, language: &str) -> Option<&Arc<dyn Locale>> {
        self.languages.get(language)
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn command_typing(&self) -> bool {
        self.command_typing
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Commands whose handler was invoked since startup.
    pub fn commands_ran(&self) -> u64 {
        self.commands_ran.load(Ordering::Relaxed)
    }

    pub fn resolve_prefix(&self, message: &Message, is_dm: bool) -> String {
        self.prefix.prefix(message, is_dm)
    }

    pub fn resolve_language(&self, message: &Message, is_dm: bool) -> String {
        self.language.language(message, is_dm)
    }

    pub(crate) fn record_command_run(&self) {
        self.commands_ran.fetch_add(1, Ordering::Relaxed);
    }

    /// Run `message` through every monitor, in registration order.
    ///
    /// A failing or panicking monitor is reported to the error handler and
    /// the loop moves on to the next one.
    pub async fn on_message(self: &Arc<Self>, session: Arc<dyn Session>, message: Message) {
        let message = Arc::new(message);
        #[cfg(feature = "metrics")]
        counter!(dispatch_metrics::MESSAGES_RECEIVED_TOTAL).increment(1);

        // Looked up at most once per message, on first use.
        let mut guild_slot: Option<Option<Guild>> = None;
        let mut channel_slot: Option<Option<Channel>> = None;

        for monitor in self.monitors.iter() {
            if !monitor.is_enabled() {
                skipped(monitor, SkipReason::Disabled);
                continue;
            }

            if guild_slot.is_none() {
                guild_slot = Some(lookup_guild(session.as_ref(), &message).await);
            }
            let guild = guild_slot.clone().flatten();

            if let Err(reason) =
                monitor.admits(&message, guild.is_some(), session.self_user_id())
            {
                skipped(monitor, reason);
                continue;
            }

            if channel_slot.is_none() {
                channel_slot = Some(lookup_channel(session.as_ref(), &message).await);
            }
            let Some(channel) = channel_slot.clone().flatten() else {
                skipped(monitor, SkipReason::ChannelUnavailable);
                continue;
            };

            let ctx = MonitorContext {
                bot: Arc::clone(self),
                session: Arc::clone(&session),
                message: Arc::clone(&message),
                channel,
                guild,
                monitor: Arc::clone(monitor),
            };
            self.run_monitor(monitor, ctx).await;
        }
    }

    /// Dispatch `message` on its own task.
    pub fn spawn_message(
        self: &Arc<Self>,
        session: Arc<dyn Session>,
        message: Message,
    ) -> JoinHandle<()> {
        let bot = Arc::clone(self);
        tokio::spawn(async move { bot.on_message(session, message).await })
    }

    async fn run_monitor(&self, monitor: &Monitor, ctx: MonitorContext) {
        let handler = Arc::clone(monitor.handler());
        let message_id = ctx.message.id.clone();
        let channel_id = ctx.message.channel_id.clone();
        trace!(monitor = %monitor.name(), message_id = %message_id, "running monitor");

        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();

        let outcome = AssertUnwindSafe(handler.run(ctx)).catch_unwind().await;

        #[cfg(feature = "metrics")]
        {
            histogram!(
                dispatch_metrics::MONITOR_DURATION_SECONDS,
                labels::MONITOR => monitor.name().to_string()
            )
            .record(started.elapsed().as_secs_f64());
            counter!(
                dispatch_metrics::MONITOR_RUNS_TOTAL,
                labels::MONITOR => monitor.name().to_string()
            )
            .increment(1);
        }

        let kind = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => FailureKind::Error(err),
            Err(payload) => FailureKind::Panic(panic_message(&*payload)),
        };
        self.report_failure(MonitorFailure {
            monitor: monitor.name().to_string(),
            message_id,
            channel_id,
            kind,
        });
    }

    fn report_failure(&self, failure: MonitorFailure) {
        #[cfg(feature = "metrics")]
        counter!(
            dispatch_metrics::MONITOR_FAILURES_TOTAL,
            labels::MONITOR => failure.monitor.clone(),
            labels::KIND => failure.kind.as_str()
        )
        .increment(1);

        let monitor = failure.monitor.clone();
        let handled =
            std::panic::catch_unwind(AssertUnwindSafe(|| self.error_handler.handle(self, failure)));
        if let Err(payload) = handled {
            error!(
                monitor = %monitor,
                panic = %panic_message(&*payload),
                "error handler panicked"
            );
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("monitors", &self.monitors.names())
            .field("commands", &self.commands.names())
            .field("languages", &self.languages.keys().collect::<Vec<_>>())
            .field("owner_id", &self.owner_id)
            .field("command_typing", &self.command_typing)
            .field("commands_ran", &self.commands_ran())
            .finish_non_exhaustive()
    }
}

async fn lookup_guild(session: &dyn Session, message: &Message) -> Option<Guild> {
    let guild_id = message.guild_id.as_deref()?;
    match session.guild(guild_id).await {
        Ok(guild) => Some(guild),
        Err(e) => {
            debug!(guild_id, error = %e, "guild lookup failed, treating message as guildless");
            None
        },
    }
}

async fn lookup_channel(session: &dyn Session, message: &Message) -> Option<Channel> {
    match session.channel(&message.channel_id).await {
        Ok(channel) => Some(channel),
        Err(e) => {
            debug!(channel_id = %message.channel_id, error = %e, "channel lookup failed");
            None
        },
    }
}

fn skipped(monitor: &Monitor, reason: SkipReason) {
    trace!(monitor = %monitor.name(), %reason, "monitor skipped");
    #[cfg(feature = "metrics")]
    counter!(
        dispatch_metrics::MONITOR_SKIPS_TOTAL,
        labels::MONITOR => monitor.name().to_string(),
        labels::REASON => reason.as_str()
    )
    .increment(1);
}

/// Collects monitors, commands and resolvers for a [`Bot`].
///
/// ```rust,ignore
/// let bot = Bot::builder()
///     .prefix(StaticPrefix::new("?"))
///     .owner("1234")
///     .command(Command::new("ping", |ctx: CommandContext| async move {
///         ctx.reply("pong").await?;
///         Ok(())
///     }))
///     .build()?;
/// ```
pub struct BotBuilder {
    monitors: Vec<Monitor>,
    commands: Vec<Command>,
    languages: HashMap<String, Arc<dyn Locale>>,
    prefix: Box<dyn PrefixResolver>,
    language: Box<dyn LanguageResolver>,
    owner_id: Option<String>,
    command_typing: bool,
    prune_every: u64,
    error_handler: Box<dyn ErrorHandler>,
    command_monitor: bool,
}

impl Default for BotBuilder {
    fn default() -> Self {
        let mut languages: HashMap<String, Arc<dyn Locale>> = HashMap::new();
        languages.insert(DEFAULT_LANGUAGE.into(), Arc::new(StaticLocale::english()));
        Self {
            monitors: Vec::new(),
            commands: Vec::new(),
            languages,
            prefix: Box::new(StaticPrefix::new("!")),
            language: Box::new(StaticLanguage(DEFAULT_LANGUAGE.into())),
            owner_id: None,
            command_typing: false,
            prune_every: DEFAULT_PRUNE_EVERY,
            error_handler: Box::new(LogErrorHandler),
            command_monitor: true,
        }
    }
}

impl BotBuilder {
    /// Start from the `[bot]` and `[cooldowns]` config sections.
    pub fn from_config(config: &SapphireConfig) -> Self {
        let mut prefix = StaticPrefix::new(config.bot.prefix.clone());
        if let Some(dm_prefix) = &config.bot.dm_prefix {
            prefix = prefix.with_dm_prefix(dm_prefix.clone());
        }
        let mut builder = Self::default()
            .prefix(prefix)
            .language_resolver(StaticLanguage(config.bot.default_language.clone()))
            .command_typing(config.bot.command_typing)
            .cooldown_prune_every(config.cooldowns.prune_every);
        builder.owner_id = config.bot.owner_id.clone();
        builder
    }

    #[must_use]
    pub fn monitor(mut self, monitor: Monitor) -> Self {
        self.monitors.push(monitor);
        self
    }

    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Register (or replace) the locale for a language key.
    #[must_use]
    pub fn language(mut self, key: impl Into<String>, locale: impl Locale + 'static) -> Self {
        self.languages.insert(key.into(), Arc::new(locale));
        self
    }

    #[must_use]
    pub fn prefix(mut self, resolver: impl PrefixResolver + 'static) -> Self {
        self.prefix = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn language_resolver(mut self, resolver: impl LanguageResolver + 'static) -> Self {
        self.language = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    #[must_use]
    pub fn command_typing(mut self, enabled: bool) -> Self {
        self.command_typing = enabled;
        self
    }

    #[must_use]
    pub fn cooldown_prune_every(mut self, checks: u64) -> Self {
        self.prune_every = checks;
        self
    }

    #[must_use]
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Box::new(handler);
        self
    }

    /// Leave out the built-in command monitor; commands then never run.
    #[must_use]
    pub fn without_command_monitor(mut self) -> Self {
        self.command_monitor = false;
        self
    }

    /// Register everything. The command monitor goes first, so commands see
    /// a message before any user monitor does.
    pub fn build(self) -> Result<Arc<Bot>> {
        let mut monitors = MonitorRegistry::new();
        if self.command_monitor {
            monitors.register(command_monitor())?;
        }
        for monitor in self.monitors {
            monitors.register(monitor)?;
        }

        let mut commands = CommandRegistry::new();
        for command in self.commands {
            commands.register(command)?;
        }

        info!(
            monitors = monitors.len(),
            commands = commands.len(),
            languages = self.languages.len(),
            "bot built"
        );

        Ok(Arc::new(Bot {
            monitors,
            commands,
            languages: self.languages,
            prefix: self.prefix,
            language: self.language,
            owner_id: self.owner_id,
            command_typing: self.command_typing,
            cooldowns: CooldownTracker::new(self.prune_every),
            commands_ran: AtomicU64::new(0),
            error_handler: self.error_handler,
        }))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use sapphire_channels::Author;

    use super::*;
    use crate::{COMMAND_MONITOR, Error};

    async fn noop(_ctx: MonitorContext) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn command_monitor_is_registered_first() {
        let bot = Bot::builder()
            .monitor(Monitor::new("audit", noop))
            .build()
            .unwrap();
        assert_eq!(bot.monitors().names(), vec![COMMAND_MONITOR, "audit"]);

        let bare = Bot::builder().without_command_monitor().build().unwrap();
        assert!(bare.monitors().is_empty());
    }

    #[test]
    fn duplicate_monitor_fails_build() {
        let err = Bot::builder()
            .monitor(Monitor::new(COMMAND_MONITOR, noop))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateMonitor(_)));
    }

    #[test]
    fn from_config_applies_bot_section() {
        let mut config = SapphireConfig::default();
        config.bot.prefix = "?".into();
        config.bot.dm_prefix = Some(String::new());
        config.bot.owner_id = Some("42".into());
        config.bot.default_language = "fr".into();

        let bot = BotBuilder::from_config(&config).build().unwrap();
        let msg = Message::new("1", "c", Author::new("u", "alice"), "hi");
        assert_eq!(bot.resolve_prefix(&msg, false), "?");
        assert_eq!(bot.resolve_prefix(&msg, true), "");
        assert_eq!(bot.resolve_language(&msg, false), "fr");
        assert_eq!(bot.owner_id(), Some("42"));
        // Only en-US ships by default.
        assert!(bot.locale("fr").is_none());
        assert!(bot.locale("en-US").is_some());
    }
}
