//! Metrics collection and export for sapphire.
//!
//! Call sites record through the `metrics` crate facade re-exported here. When
//! the `prometheus` feature is enabled, [`init_metrics`] installs a Prometheus
//! recorder whose handle renders the text exposition format.
//!
//! ```rust,ignore
//! use sapphire_metrics::{commands, counter, labels};
//!
//! counter!(commands::EXECUTED_TOTAL, labels::COMMAND => "ping").increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

pub use metrics::{counter, gauge, histogram};
