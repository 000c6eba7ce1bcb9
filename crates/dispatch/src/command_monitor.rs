//! The built-in monitor that turns prefixed messages into command runs.

use std::{sync::Arc, time::Duration};

use {
    anyhow::Context as _,
    async_trait::async_trait,
    tracing::{debug, trace, warn},
};

#[cfg(feature = "metrics")]
use sapphire_metrics::{commands as cmd_metrics, cooldowns as cooldown_metrics, counter, histogram, labels};

use crate::{
    command::Command,
    context::CommandContext,
    cooldown::CooldownDecision,
    locale::keys,
    monitor::{Monitor, MonitorContext, MonitorHandler},
    tokenizer::tokenize,
};

/// Name the command monitor is registered under.
pub const COMMAND_MONITOR: &str = "commandHandler";

pub(crate) fn command_monitor() -> Monitor {
    Monitor::new(COMMAND_MONITOR, CommandMonitor)
}

struct CommandMonitor;

#[async_trait]
impl MonitorHandler for CommandMonitor {
    async fn run(&self, ctx: MonitorContext) -> anyhow::Result<()> {
        handle_command(ctx).await
    }
}

async fn handle_command(ctx: MonitorContext) -> anyhow::Result<()> {
    let MonitorContext {
        bot,
        session,
        message,
        channel,
        guild,
        ..
    } = ctx;
    let is_dm = channel.is_dm();

    let prefix = bot.resolve_prefix(&message, is_dm);
    let Some(invocation) = tokenize(&message.content, &prefix) else {
        return Ok(());
    };
    let Some(command) = bot.commands().resolve(&invocation.command).cloned() else {
        trace!(token = %invocation.command, "no command matches token");
        return Ok(());
    };

    let language = bot.resolve_language(&message, is_dm);
    let Some(locale) = bot.locale(&language).cloned() else {
        warn!(
            command = %command.name(),
            language = %language,
            "no locale registered for resolved language, dropping command"
        );
        #[cfg(feature = "metrics")]
        counter!(cmd_metrics::MISSING_LOCALE_TOTAL, labels::COMMAND => command.name().to_string())
            .increment(1);
        return Ok(());
    };

    let mut cmd = CommandContext {
        bot: Arc::clone(&bot),
        session,
        command: Arc::clone(&command),
        invoked_name: invocation.command,
        message: Arc::clone(&message),
        channel,
        guild,
        prefix,
        content: invocation.content,
        raw_args: invocation.args,
        args: Vec::new(),
        flags: invocation.flags,
        language,
        locale,
    };

    if let Err(key) = check_command(
        &command,
        &message.author.id,
        bot.owner_id(),
        message.guild_id.is_some(),
    ) {
        reject(&cmd, key, cmd.localize(key, &[])).await;
        return Ok(());
    }

    let parser = Arc::clone(command.parser());
    if !parser.parse(&mut cmd).await {
        debug!(command = %command.name(), "argument parser rejected input");
        #[cfg(feature = "metrics")]
        counter!(
            cmd_metrics::REJECTED_TOTAL,
            labels::COMMAND => command.name().to_string(),
            labels::REASON => "arguments"
        )
        .increment(1);
        return Ok(());
    }

    if bot.command_typing() {
        let session = Arc::clone(&cmd.session);
        let channel_id = cmd.channel.id.clone();
        tokio::spawn(async move {
            if let Err(e) = session.send_typing(&channel_id).await {
                debug!(channel_id = %channel_id, error = %e, "typing indicator failed");
            }
        });
    }

    let decision = bot
        .cooldowns()
        .check(&message.author.id, command.name(), command.cooldown());
    if let CooldownDecision::Denied { retry_after } = decision {
        #[cfg(feature = "metrics")]
        counter!(cooldown_metrics::DENIALS_TOTAL, labels::COMMAND => command.name().to_string())
            .increment(1);
        let secs = whole_seconds(retry_after);
        let text = cmd.localize(keys::COMMAND_COOLDOWN, &[&secs]);
        reject(&cmd, keys::COMMAND_COOLDOWN, text).await;
        return Ok(());
    }

    bot.record_command_run();
    debug!(
        command = %command.name(),
        invoked_as = %cmd.invoked_name,
        user_id = %message.author.id,
        "running command"
    );

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();

    let result = Arc::clone(command.handler()).run(cmd).await;

    #[cfg(feature = "metrics")]
    {
        let name = command.name().to_string();
        histogram!(cmd_metrics::DURATION_SECONDS, labels::COMMAND => name.clone())
            .record(started.elapsed().as_secs_f64());
        counter!(cmd_metrics::EXECUTED_TOTAL, labels::COMMAND => name).increment(1);
    }

    result.with_context(|| format!("command {} failed", command.name()))
}

/// Owner, guild and enabled policy for one invocation.
///
/// Returns the locale key to reply with when the invocation is refused.
fn check_command(
    command: &Command,
    author_id: &str,
    owner_id: Option<&str>,
    in_guild: bool,
) -> Result<(), &'static str> {
    if !command.is_enabled() {
        return Err(keys::COMMAND_DISABLED);
    }
    if command.is_owner_only() && owner_id != Some(author_id) {
        return Err(keys::COMMAND_OWNER_ONLY);
    }
    if command.is_guild_only() && !in_guild {
        return Err(keys::COMMAND_GUILD_ONLY);
    }
    Ok(())
}

/// Remaining wait rounded up to whole seconds, never below one.
fn whole_seconds(wait: Duration) -> u64 {
    let secs = wait
        .as_secs()
        .saturating_add(u64::from(wait.subsec_nanos() > 0));
    secs.max(1)
}

async fn reject(ctx: &CommandContext, key: &'static str, text: String) {
    debug!(command = %ctx.command.name(), reason = key, "command refused");
    #[cfg(feature = "metrics")]
    counter!(
        cmd_metrics::REJECTED_TOTAL,
        labels::COMMAND => ctx.command.name().to_string(),
        labels::REASON => key
    )
    .increment(1);
    if let Err(e) = ctx.reply(&text).await {
        warn!(command = %ctx.command.name(), error = %e, "failed to send refusal");
    }
}
