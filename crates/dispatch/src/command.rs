//! Command definitions and the name/alias registry.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    arguments::{ArgumentParser, ArgumentSpec},
    context::CommandContext,
    error::{Error, Result},
    monitor::check_name,
};

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        self(ctx).await
    }
}

pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: String,
    usage: String,
    category: String,
    enabled: AtomicBool,
    owner_only: bool,
    guild_only: bool,
    cooldown: Duration,
    arguments: Arc<dyn ArgumentParser>,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            usage: String::new(),
            category: String::new(),
            enabled: AtomicBool::new(true),
            owner_only: false,
            guild_only: false,
            cooldown: Duration::ZERO,
            arguments: Arc::new(ArgumentSpec::default()),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    #[must_use]
    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Replace the default (empty) [`ArgumentSpec`] with any parser.
    #[must_use]
    pub fn arguments(mut self, parser: impl ArgumentParser + 'static) -> Self {
        self.arguments = Arc::new(parser);
        self
    }

    /// Like [`Command::arguments`], and derives the usage line from the spec
    /// when none was set.
    #[must_use]
    pub fn args(mut self, spec: ArgumentSpec) -> Self {
        if self.usage.is_empty() {
            self.usage = spec.usage();
        }
        self.arguments(spec)
    }

    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::Relaxed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_owner_only(&self) -> bool {
        self.owner_only
    }

    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub(crate) fn parser(&self) -> &Arc<dyn ArgumentParser> {
        &self.arguments
    }

    pub(crate) fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("category", &self.category)
            .field("enabled", &self.is_enabled())
            .field("owner_only", &self.owner_only)
            .field("guild_only", &self.guild_only)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Commands keyed by lower-cased name and alias.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name and every alias.
    ///
    /// Nothing is inserted if any key is invalid or already taken.
    pub fn register(&mut self, command: Command) -> Result<()> {
        let mut keys = Vec::with_capacity(1 + command.aliases.len());
        for key in std::iter::once(&command.name).chain(&command.aliases) {
            check_name("command", key)?;
            let key = key.to_lowercase();
            if self.lookup.contains_key(&key) || keys.contains(&key) {
                return Err(Error::DuplicateCommand(key));
            }
            keys.push(key);
        }

        let idx = self.commands.len();
        self.commands.push(Arc::new(command));
        self.lookup.extend(keys.into_iter().map(|key| (key, idx)));
        Ok(())
    }

    /// Case-insensitive lookup by name or alias.
    pub fn resolve(&self, token: &str) -> Option<&Arc<Command>> {
        let idx = self.lookup.get(&token.to_lowercase())?;
        self.commands.get(*idx)
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Toggle a command by name or alias. Returns `false` if unknown.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.resolve(name) {
            Some(command) => {
                command.set_enabled(enabled);
                true
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
