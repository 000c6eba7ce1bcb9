use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SapphireConfig {
    pub bot: BotConfig,
    pub cooldowns: CooldownConfig,
    pub metrics: MetricsConfig,
}

/// Command handling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Command prefix used in guild channels.
    pub prefix: String,

    /// Prefix used in direct messages. Falls back to `prefix` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dm_prefix: Option<String>,

    /// User allowed to run owner-only commands. Nobody when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Language key returned by the default language resolver.
    pub default_language: String,

    /// Send a typing indicator before running a command.
    pub command_typing: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".into(),
            dm_prefix: None,
            owner_id: None,
            default_language: "en-US".into(),
            command_typing: false,
        }
    }
}

/// Cooldown tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Sweep expired entries every N cooldown checks.
    pub prune_every: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { prune_every: 512 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SapphireConfig::default();
        assert_eq!(cfg.bot.prefix, "!");
        assert_eq!(cfg.bot.dm_prefix, None);
        assert_eq!(cfg.bot.default_language, "en-US");
        assert!(!cfg.bot.command_typing);
        assert_eq!(cfg.cooldowns.prune_every, 512);
        assert!(!cfg.metrics.enabled);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: SapphireConfig = toml::from_str(
            r#"
            [bot]
            prefix = "?"
            owner_id = "42"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bot.prefix, "?");
        assert_eq!(cfg.bot.owner_id.as_deref(), Some("42"));
        assert_eq!(cfg.bot.default_language, "en-US");
        assert_eq!(cfg.cooldowns, CooldownConfig::default());
    }

    #[test]
    fn serialize_skips_unset_options() {
        let toml_str = toml::to_string(&SapphireConfig::default()).unwrap();
        assert!(!toml_str.contains("owner_id"));
        assert!(!toml_str.contains("dm_prefix"));
        assert!(toml_str.contains("prefix = \"!\""));
    }
}
