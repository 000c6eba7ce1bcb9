//! Semantic validation of a loaded configuration.

use crate::schema::SapphireConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "bot.prefix"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Check values that parse fine but cannot work at runtime.
pub fn validate(config: &SapphireConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_prefix(&mut result, "bot.prefix", Some(&config.bot.prefix));
    check_prefix(&mut result, "bot.dm_prefix", config.bot.dm_prefix.as_deref());

    if config.bot.default_language.trim().is_empty() {
        result.push(
            Severity::Error,
            "bot.default_language",
            "language key must not be empty",
        );
    }

    if config.bot.owner_id.as_deref().is_some_and(str::is_empty) {
        result.push(
            Severity::Warning,
            "bot.owner_id",
            "empty owner id; owner-only commands will be unusable",
        );
    }

    if config.cooldowns.prune_every == 0 {
        result.push(
            Severity::Error,
            "cooldowns.prune_every",
            "must be at least 1",
        );
    }

    result
}

fn check_prefix(result: &mut ValidationResult, path: &str, prefix: Option<&str>) {
    let Some(prefix) = prefix else {
        return;
    };
    if prefix.is_empty() {
        result.push(Severity::Error, path, "prefix must not be empty");
    } else if prefix.chars().any(char::is_whitespace) {
        // Whitespace runs are collapsed before the prefix is stripped.
        result.push(
            Severity::Warning,
            path,
            "prefix contains whitespace; repeated spaces in it never match",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_clean() {
        let result = validate(&SapphireConfig::default());
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn empty_prefix_is_an_error() {
        let mut cfg = SapphireConfig::default();
        cfg.bot.prefix.clear();
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].path, "bot.prefix");
    }

    #[test]
    fn whitespace_prefix_warns() {
        let mut cfg = SapphireConfig::default();
        cfg.bot.dm_prefix = Some("hey bot".into());
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(
            result.diagnostics[0].to_string(),
            "warning: bot.dm_prefix: prefix contains whitespace; repeated spaces in it never match"
        );
    }

    #[test]
    fn zero_prune_interval_is_an_error() {
        let mut cfg = SapphireConfig::default();
        cfg.cooldowns.prune_every = 0;
        let result = validate(&cfg);
        assert_eq!(result.count(Severity::Error), 1);
    }
}
