//! Inbound message dispatch for sapphire.
//!
//! Every message handed to [`Bot::on_message`] runs through the registered
//! monitors in order. The built-in command monitor tokenizes prefixed text
//! (see [`tokenizer`]), resolves a [`Command`], applies owner/guild/cooldown
//! policy and invokes the command handler with a [`CommandContext`].

pub mod arguments;
pub mod bot;
pub mod command;
mod command_monitor;
pub mod context;
pub mod cooldown;
pub mod error;
pub mod failure;
pub mod locale;
pub mod monitor;
pub mod resolver;
pub mod tokenizer;

pub use {
    arguments::{ArgKind, ArgValue, Argument, ArgumentError, ArgumentParser, ArgumentSpec},
    bot::{Bot, BotBuilder},
    command::{Command, CommandHandler, CommandRegistry},
    command_monitor::COMMAND_MONITOR,
    context::CommandContext,
    cooldown::{CooldownDecision, CooldownTracker},
    error::{Error, Result},
    failure::{ErrorHandler, FailureKind, LogErrorHandler, MonitorFailure},
    locale::{Locale, StaticLocale},
    monitor::{Monitor, MonitorContext, MonitorHandler, MonitorRegistry, SkipReason},
    resolver::{LanguageResolver, PrefixResolver, StaticLanguage, StaticPrefix},
    tokenizer::{FlagMap, Invocation, extract_flags, tokenize},
};
