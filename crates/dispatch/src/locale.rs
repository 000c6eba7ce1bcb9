//! Localized reply lookup.
//!
//! Rendering and storing translations is up to the host; the dispatcher only
//! needs to turn a reply key plus arguments into text.

use std::{collections::HashMap, fmt::Display};

use {
    once_cell::sync::Lazy,
    regex::{Captures, Regex},
};

use crate::tokenizer::compile;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| compile(r"\{(\d+)\}"));

/// Reply keys emitted by the built-in command monitor.
pub mod keys {
    pub const COMMAND_DISABLED: &str = "COMMAND_DISABLED";
    pub const COMMAND_OWNER_ONLY: &str = "COMMAND_OWNER_ONLY";
    pub const COMMAND_GUILD_ONLY: &str = "COMMAND_GUILD_ONLY";
    /// Argument: seconds until the command can be used again.
    pub const COMMAND_COOLDOWN: &str = "COMMAND_COOLDOWN";
    /// Argument: name of the missing argument.
    pub const COMMAND_MISSING_ARGS: &str = "COMMAND_MISSING_ARGS";
    /// Arguments: argument name, expected kind.
    pub const COMMAND_INVALID_ARG: &str = "COMMAND_INVALID_ARG";
}

/// A set of reply templates for one language.
pub trait Locale: Send + Sync {
    /// Render `key` with positional `args`.
    fn get(&self, key: &str, args: &[&(dyn Display + Sync)]) -> String;
}

/// HashMap-backed [`Locale`] with `{0}`, `{1}`, … placeholders.
///
/// Unknown keys render as the key itself so a missing translation is visible
/// instead of silent.
#[derive(Debug, Clone, Default)]
pub struct StaticLocale {
    templates: HashMap<String, String>,
}

impl StaticLocale {
    pub fn new() -> Self {
        Self::default()
    }

    /// English templates for every key in [`keys`].
    pub fn english() -> Self {
        Self::new()
            .with(keys::COMMAND_DISABLED, "This command is currently disabled.")
            .with(
                keys::COMMAND_OWNER_ONLY,
                "Only the bot owner can use this command.",
            )
            .with(
                keys::COMMAND_GUILD_ONLY,
                "This command can only be used in a server.",
            )
            .with(
                keys::COMMAND_COOLDOWN,
                "You are on cooldown. Try again in {0} second(s).",
            )
            .with(keys::COMMAND_MISSING_ARGS, "Missing required argument `{0}`.")
            .with(
                keys::COMMAND_INVALID_ARG,
                "Argument `{0}` must be a valid {1}.",
            )
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }
}

impl Locale for StaticLocale {
    fn get(&self, key: &str, args: &[&(dyn Display + Sync)]) -> String {
        let Some(template) = self.templates.get(key) else {
            return key.to_string();
        };
        // One pass, so argument text is never treated as a placeholder.
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                match caps[1].parse::<usize>().ok().and_then(|idx| args.get(idx)) {
                    Some(arg) => arg.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_covers_builtin_keys() {
        let en = StaticLocale::english();
        for key in [
            keys::COMMAND_DISABLED,
            keys::COMMAND_OWNER_ONLY,
            keys::COMMAND_GUILD_ONLY,
            keys::COMMAND_COOLDOWN,
            keys::COMMAND_MISSING_ARGS,
            keys::COMMAND_INVALID_ARG,
        ] {
            assert_ne!(en.get(key, &[]), key, "{key} has no template");
        }
    }

    #[test]
    fn substitutes_positional_args() {
        let en = StaticLocale::english();
        assert_eq!(
            en.get(keys::COMMAND_COOLDOWN, &[&3]),
            "You are on cooldown. Try again in 3 second(s)."
        );
        assert_eq!(
            en.get(keys::COMMAND_INVALID_ARG, &[&"count", &"integer"]),
            "Argument `count` must be a valid integer."
        );
    }

    #[test]
    fn unknown_key_renders_as_key() {
        assert_eq!(StaticLocale::new().get("NOPE", &[]), "NOPE");
    }

    #[test]
    fn argument_text_is_not_substituted_again() {
        let en = StaticLocale::english();
        assert_eq!(
            en.get(keys::COMMAND_INVALID_ARG, &[&"{1}", &"integer"]),
            "Argument `{1}` must be a valid integer."
        );
    }

    #[test]
    fn missing_argument_keeps_placeholder() {
        let l = StaticLocale::new().with("PAIR", "{0}/{1}");
        assert_eq!(l.get("PAIR", &[&"a"]), "a/{1}");
    }

    #[test]
    fn repeated_placeholder() {
        let l = StaticLocale::new().with("ECHO", "{0} and {0}");
        assert_eq!(l.get("ECHO", &[&"x"]), "x and x");
    }
}
