use sapphire_common::FromMessage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Monitor or command names must be non-empty and free of whitespace.
    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    #[error("a monitor named {0:?} is already registered")]
    DuplicateMonitor(String),

    /// Names and aliases share one case-insensitive namespace.
    #[error("command name or alias {0:?} is already registered")]
    DuplicateCommand(String),

    #[error(transparent)]
    Channel(#[from] sapphire_channels::Error),

    #[error("{0}")]
    Message(String),
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

sapphire_common::impl_context!();

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(err: &Error) -> &'static str {
        match err {
            Error::InvalidName { .. } => "name",
            Error::DuplicateMonitor(_) | Error::DuplicateCommand(_) => "duplicate",
            Error::Channel(_) => "channel",
            Error::Message(_) => "message",
        }
    }

    #[test]
    fn registration_errors_render_names() {
        let err = Error::InvalidName {
            kind: "command",
            name: "two words".into(),
        };
        assert_eq!(describe(&err), "name");
        assert_eq!(err.to_string(), "invalid command name: \"two words\"");

        let err = Error::DuplicateCommand("p".into());
        assert_eq!(describe(&err), "duplicate");
        assert_eq!(err.to_string(), "command name or alias \"p\" is already registered");
    }

    #[test]
    fn context_wraps_into_message() {
        let missing: Option<u8> = None;
        let Err(err) = missing.context("no channel") else {
            panic!("expected an error");
        };
        assert_eq!(describe(&err), "message");
        assert_eq!(err.to_string(), "no channel");
    }
}
