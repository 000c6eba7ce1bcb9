use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SapphireConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "sapphire.toml",
    "sapphire.yaml",
    "sapphire.yml",
    "sapphire.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SapphireConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./sapphire.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/sapphire/sapphire.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SapphireConfig::default()` if no file is found or it fails to load.
pub fn discover_and_load() -> SapphireConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SapphireConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/sapphire/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sapphire").map(|d| d.config_dir().to_path_buf())
}

/// Apply `SAPPHIRE_*` environment overrides on top of a loaded config.
///
/// - `SAPPHIRE_PREFIX` → `bot.prefix`
/// - `SAPPHIRE_OWNER_ID` → `bot.owner_id`
/// - `SAPPHIRE_LANGUAGE` → `bot.default_language`
pub fn apply_env_overrides(config: SapphireConfig) -> SapphireConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: SapphireConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SapphireConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(prefix) = non_empty("SAPPHIRE_PREFIX") {
        config.bot.prefix = prefix;
    }
    if let Some(owner) = non_empty("SAPPHIRE_OWNER_ID") {
        config.bot.owner_id = Some(owner);
    }
    if let Some(lang) = non_empty("SAPPHIRE_LANGUAGE") {
        config.bot.default_language = lang;
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SapphireConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "sapphire.toml",
            "[bot]\nprefix = \"?\"\ncommand_typing = true\n",
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.prefix, "?");
        assert!(cfg.bot.command_typing);
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "sapphire.yaml", "bot:\n  owner_id: \"99\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.owner_id.as_deref(), Some("99"));
        assert_eq!(cfg.bot.prefix, "!");
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "sapphire.json", r#"{"cooldowns": {"prune_every": 8}}"#);
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.cooldowns.prune_every, 8);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "sapphire.ini", "prefix=!");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn env_overrides_replace_values() {
        let lookup = |name: &str| match name {
            "SAPPHIRE_PREFIX" => Some(">".to_string()),
            "SAPPHIRE_OWNER_ID" => Some("7".to_string()),
            "SAPPHIRE_LANGUAGE" => Some(String::new()),
            _ => None,
        };
        let cfg = apply_env_overrides_with(SapphireConfig::default(), lookup);
        assert_eq!(cfg.bot.prefix, ">");
        assert_eq!(cfg.bot.owner_id.as_deref(), Some("7"));
        // Empty values are ignored.
        assert_eq!(cfg.bot.default_language, "en-US");
    }
}
