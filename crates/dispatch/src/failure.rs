//! Monitor failure reporting.

use std::fmt;

use tracing::error;

use crate::Bot;

/// How a monitor invocation failed.
#[derive(Debug)]
pub enum FailureKind {
    /// The handler returned `Err`.
    Error(anyhow::Error),
    /// The handler panicked; carries the panic message.
    Panic(String),
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error(_) => "error",
            Self::Panic(_) => "panic",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err:#}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// A caught monitor fault, handed to the bot's [`ErrorHandler`].
#[derive(Debug)]
pub struct MonitorFailure {
    pub monitor: String,
    pub message_id: String,
    pub channel_id: String,
    pub kind: FailureKind,
}

impl fmt::Display for MonitorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "monitor {} failed on message {}: {}",
            self.monitor, self.message_id, self.kind
        )
    }
}

/// Process-wide sink for monitor failures.
///
/// Called inline on the dispatch task; spawn if the handler needs to do I/O.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, bot: &Bot, failure: MonitorFailure);
}

impl<F> ErrorHandler for F
where
    F: Fn(&Bot, MonitorFailure) + Send + Sync,
{
    fn handle(&self, bot: &Bot, failure: MonitorFailure) {
        self(bot, failure);
    }
}

/// Default handler: one `error!` event per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, _bot: &Bot, failure: MonitorFailure) {
        error!(
            monitor = %failure.monitor,
            message_id = %failure.message_id,
            channel_id = %failure.channel_id,
            kind = failure.kind.as_str(),
            error = %failure.kind,
            "monitor failed"
        );
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_monitor_and_cause() {
        let failure = MonitorFailure {
            monitor: "audit".into(),
            message_id: "42".into(),
            channel_id: "c1".into(),
            kind: FailureKind::Error(anyhow::anyhow!("db down").context("writing audit row")),
        };
        assert_eq!(
            failure.to_string(),
            "monitor audit failed on message 42: writing audit row: db down"
        );

        let panic = FailureKind::Panic("boom".into());
        assert_eq!(panic.as_str(), "panic");
        assert_eq!(panic.to_string(), "panicked: boom");
    }
}
