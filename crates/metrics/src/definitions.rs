//! Metric name and label definitions.
//!
//! Every metric the dispatch pipeline records is named here so the exported
//! set is documented in one place.

/// Inbound message and monitor loop metrics
pub mod dispatch {
    /// Total number of inbound messages handed to the monitor loop
    pub const MESSAGES_RECEIVED_TOTAL: &str = "sapphire_messages_received_total";
    /// Total number of monitor invocations that passed gating
    pub const MONITOR_RUNS_TOTAL: &str = "sapphire_monitor_runs_total";
    /// Total number of monitor invocations skipped by a gate
    pub const MONITOR_SKIPS_TOTAL: &str = "sapphire_monitor_skips_total";
    /// Monitor invocations that returned an error or panicked
    pub const MONITOR_FAILURES_TOTAL: &str = "sapphire_monitor_failures_total";
    /// Monitor handler duration in seconds
    pub const MONITOR_DURATION_SECONDS: &str = "sapphire_monitor_duration_seconds";
}

/// Command execution metrics
pub mod commands {
    /// Total number of command handlers invoked
    pub const EXECUTED_TOTAL: &str = "sapphire_commands_executed_total";
    /// Command invocations rejected before the handler ran
    pub const REJECTED_TOTAL: &str = "sapphire_commands_rejected_total";
    /// Command handler duration in seconds
    pub const DURATION_SECONDS: &str = "sapphire_command_duration_seconds";
    /// Invocations aborted because the resolved language has no locale
    pub const MISSING_LOCALE_TOTAL: &str = "sapphire_commands_missing_locale_total";
}

/// Cooldown tracker metrics
pub mod cooldowns {
    /// Invocations denied by an active cooldown
    pub const DENIALS_TOTAL: &str = "sapphire_cooldown_denials_total";
    /// Number of tracked (user, command) entries after the last prune
    pub const ENTRIES: &str = "sapphire_cooldown_entries";
}

/// Common label keys
pub mod labels {
    pub const MONITOR: &str = "monitor";
    pub const COMMAND: &str = "command";
    /// Why a monitor was skipped or a command rejected
    pub const REASON: &str = "reason";
    /// `error` or `panic`
    pub const KIND: &str = "kind";
}

/// Standard histogram buckets
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Handler duration buckets (in seconds)
    /// Covers 1ms to 60s
    pub static HANDLER_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]
    });
}
