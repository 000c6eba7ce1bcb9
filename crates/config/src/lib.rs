//! Configuration loading, validation and env substitution.
//!
//! Config files: `sapphire.toml`, `sapphire.yaml` or `sapphire.json`,
//! searched in `./` then `~/.config/sapphire/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file text before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{BotConfig, CooldownConfig, MetricsConfig, SapphireConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
