use std::{fmt::Display, sync::Arc};

use sapphire_channels::{Author, Channel, Guild, Message, Session};

use crate::{
    Bot,
    arguments::ArgValue,
    command::Command,
    error::{Context as _, Result},
    locale::Locale,
    tokenizer::FlagMap,
};

/// One matched command invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub bot: Arc<Bot>,
    pub session: Arc<dyn Session>,
    pub command: Arc<Command>,
    /// The name or alias the user typed, lower-cased.
    pub invoked_name: String,
    pub message: Arc<Message>,
    pub channel: Channel,
    pub guild: Option<Guild>,
    pub prefix: String,
    /// Message text with flags removed and whitespace collapsed.
    pub content: String,
    pub raw_args: Vec<String>,
    /// Filled in by the command's argument parser.
    pub args: Vec<ArgValue>,
    pub flags: FlagMap,
    /// Locale key the language resolver picked.
    pub language: String,
    pub locale: Arc<dyn Locale>,
}

impl CommandContext {
    pub fn author(&self) -> &Author {
        &self.message.author
    }

    pub fn is_dm(&self) -> bool {
        self.channel.is_dm()
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn arg(&self, idx: usize) -> Option<&ArgValue> {
        self.args.get(idx)
    }

    /// Render `key` in the invocation's locale.
    pub fn localize(&self, key: &str, args: &[&(dyn Display + Sync)]) -> String {
        self.locale.get(key, args)
    }

    pub async fn reply(&self, text: &str) -> Result<()> {
        self.session
            .send_text(&self.channel.id, text)
            .await
            .with_context(|| format!("replying in channel {}", self.channel.id))
    }

    pub async fn reply_locale(&self, key: &str, args: &[&(dyn Display + Sync)]) -> Result<()> {
        self.reply(&self.localize(key, args)).await
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command.name())
            .field("invoked_name", &self.invoked_name)
            .field("message_id", &self.message.id)
            .field("raw_args", &self.raw_args)
            .field("flags", &self.flags)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}
