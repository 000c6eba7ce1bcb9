//! Stdin/stdout stand-in for a chat platform connection.

use std::sync::Arc;

use {
    async_trait::async_trait,
    sapphire_channels::{Author, Channel, Guild, MemorySession, Message, Session},
    sapphire_dispatch::Bot,
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::{debug, info, warn},
};

pub const CONSOLE_CHANNEL: &str = "console";
const BOT_USER_ID: &str = "sapphire";

pub struct ConsoleOptions {
    pub user_id: String,
    pub guild_id: Option<String>,
}

/// [`MemorySession`] that also echoes every reply to stdout.
pub struct ConsoleSession {
    inner: MemorySession,
}

impl ConsoleSession {
    pub fn new(guild_id: Option<&str>) -> Self {
        let inner = MemorySession::new(BOT_USER_ID);
        match guild_id {
            Some(guild_id) => {
                inner.insert_guild(Guild::new(guild_id, "console guild"));
                inner.insert_channel(Channel::guild_text(CONSOLE_CHANNEL, "console", guild_id));
            },
            None => inner.insert_channel(Channel::dm(CONSOLE_CHANNEL)),
        }
        Self { inner }
    }

    #[cfg(test)]
    pub fn sent(&self) -> Vec<String> {
        self.inner.sent().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait]
impl Session for ConsoleSession {
    fn self_user_id(&self) -> &str {
        self.inner.self_user_id()
    }

    async fn guild(&self, guild_id: &str) -> sapphire_channels::Result<Guild> {
        self.inner.guild(guild_id).await
    }

    async fn channel(&self, channel_id: &str) -> sapphire_channels::Result<Channel> {
        self.inner.channel(channel_id).await
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> sapphire_channels::Result<()> {
        println!("{text}");
        self.inner.send_text(channel_id, text).await
    }

    async fn send_typing(&self, channel_id: &str) -> sapphire_channels::Result<()> {
        debug!(channel_id, "typing");
        self.inner.send_typing(channel_id).await
    }
}

/// Turn one input line into a message from the console user.
pub fn console_message(id: u64, line: &str, options: &ConsoleOptions) -> Message {
    let message = Message::new(
        id.to_string(),
        CONSOLE_CHANNEL,
        Author::new(options.user_id.clone(), "console"),
        line,
    );
    match &options.guild_id {
        Some(guild_id) => message.in_guild(guild_id.clone()),
        None => message,
    }
}

/// Dispatch stdin lines until EOF.
pub async fn run(bot: Arc<Bot>, options: ConsoleOptions) -> anyhow::Result<()> {
    let session: Arc<dyn Session> = Arc::new(ConsoleSession::new(options.guild_id.as_deref()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_id = 0u64;

    info!(
        prefix = %bot.resolve_prefix(&console_message(0, "", &options), options.guild_id.is_none()),
        commands = ?bot.commands().names(),
        "reading messages from stdin"
    );

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        next_id += 1;
        let message = console_message(next_id, &line, &options);
        // Wait for each message so replies come out in input order.
        if let Err(e) = bot.spawn_message(Arc::clone(&session), message).await {
            warn!(error = %e, "dispatch task failed");
        }
    }

    info!(commands_ran = bot.commands_ran(), "stdin closed");
    Ok(())
}
