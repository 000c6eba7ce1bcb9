//! Commands the console host ships with.

use std::time::Duration;

use sapphire_dispatch::{ArgKind, Argument, ArgumentSpec, BotBuilder, Command, CommandContext};

pub fn register(builder: BotBuilder) -> BotBuilder {
    builder
        .command(
            Command::new("ping", ping)
                .with_description("Check that the bot is alive")
                .with_category("general")
                .with_cooldown(Duration::from_secs(3)),
        )
        .command(
            Command::new("help", help)
                .alias("commands")
                .with_description("List available commands")
                .with_category("general"),
        )
        .command(
            Command::new("stats", stats)
                .with_description("Show dispatch counters")
                .with_category("system"),
        )
        .command(
            Command::new("echo", echo)
                .alias("say")
                .with_description("Repeat the text back, --upper to shout")
                .with_category("general")
                .args(ArgumentSpec::new().arg(Argument::required("text", ArgKind::Rest))),
        )
}

async fn ping(ctx: CommandContext) -> anyhow::Result<()> {
    let reply = if ctx.has_flag("loud") { "PONG!" } else { "Pong!" };
    ctx.reply(reply).await?;
    Ok(())
}

async fn help(ctx: CommandContext) -> anyhow::Result<()> {
    let mut lines = vec!["Commands:".to_string()];
    for command in ctx.bot.commands().iter().filter(|c| c.is_enabled()) {
        let mut line = format!("  {}{}", ctx.prefix, command.name());
        if !command.usage().is_empty() {
            line.push(' ');
            line.push_str(command.usage());
        }
        if !command.description().is_empty() {
            line.push_str(" - ");
            line.push_str(command.description());
        }
        lines.push(line);
    }
    ctx.reply(&lines.join("\n")).await?;
    Ok(())
}

async fn stats(ctx: CommandContext) -> anyhow::Result<()> {
    let bot = &ctx.bot;
    let text = format!(
        "commands ran: {}\ncommands: {}\nmonitors: {}\ncooldown entries: {}",
        bot.commands_ran(),
        bot.commands().len(),
        bot.monitors().len(),
        bot.cooldowns().len(),
    );
    ctx.reply(&text).await?;
    Ok(())
}

async fn echo(ctx: CommandContext) -> anyhow::Result<()> {
    let text = ctx.arg(0).and_then(|v| v.as_str()).unwrap_or_default();
    let text = if ctx.has_flag("upper") {
        text.to_uppercase()
    } else {
        text.to_string()
    };
    ctx.reply(&text).await?;
    Ok(())
}
