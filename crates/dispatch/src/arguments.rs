//! Typed positional arguments.
//!
//! Every command carries an [`ArgumentParser`]. The default is an empty
//! [`ArgumentSpec`], which accepts any input and leaves `ctx.args` empty.

use std::fmt;

use {async_trait::async_trait, tracing::warn};

use crate::{context::CommandContext, locale::keys};

/// Turns `ctx.raw_args` into `ctx.args`.
///
/// Returning `false` aborts the invocation without further replies, so a
/// parser that rejects input is expected to have told the user why.
#[async_trait]
pub trait ArgumentParser: Send + Sync {
    async fn parse(&self, ctx: &mut CommandContext) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    /// Finite floating point number.
    Number,
    /// `true/false`, `yes/no`, `on/off` or `1/0`, case-insensitive.
    Boolean,
    /// All remaining tokens joined with single spaces.
    Rest,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Rest => "text",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Num(f64),
    Bool(bool),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to `f64`.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub kind: ArgKind,
    pub required: bool,
}

impl Argument {
    pub fn required(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

/// Why an [`ArgumentSpec`] rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("missing required argument {0:?}")]
    Missing(String),
    #[error("argument {name:?} is not a valid {kind}")]
    Invalid { name: String, kind: ArgKind },
}

/// Ordered positional arguments.
///
/// Parsing stops at the first absent optional argument. Tokens beyond the
/// last declared argument are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    args: Vec<Argument>,
}

impl ArgumentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.args
    }

    /// Short usage string such as `<user> [reason...]`.
    pub fn usage(&self) -> String {
        self.args
            .iter()
            .map(|arg| {
                let dots = if arg.kind == ArgKind::Rest { "..." } else { "" };
                if arg.required {
                    format!("<{}{dots}>", arg.name)
                } else {
                    format!("[{}{dots}]", arg.name)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn parse_values(&self, raw: &[String]) -> Result<Vec<ArgValue>, ArgumentError> {
        let mut values = Vec::with_capacity(self.args.len());
        let mut rest = raw.iter().filter(|token| !token.is_empty());

        for arg in &self.args {
            let token = if arg.kind == ArgKind::Rest {
                let joined = rest.by_ref().map(String::as_str).collect::<Vec<_>>().join(" ");
                (!joined.is_empty()).then_some(joined)
            } else {
                rest.next().cloned()
            };

            let Some(token) = token else {
                if arg.required {
                    return Err(ArgumentError::Missing(arg.name.clone()));
                }
                break;
            };

            let value = convert(arg.kind, token).ok_or_else(|| ArgumentError::Invalid {
                name: arg.name.clone(),
                kind: arg.kind,
            })?;
            values.push(value);
        }
        Ok(values)
    }
}

impl From<Vec<Argument>> for ArgumentSpec {
    fn from(args: Vec<Argument>) -> Self {
        Self { args }
    }
}

fn convert(kind: ArgKind, token: String) -> Option<ArgValue> {
    match kind {
        ArgKind::String | ArgKind::Rest => Some(ArgValue::Str(token)),
        ArgKind::Integer => token.parse().ok().map(ArgValue::Int),
        ArgKind::Number => token
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ArgValue::Num),
        ArgKind::Boolean => match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(ArgValue::Bool(true)),
            "false" | "no" | "off" | "0" => Some(ArgValue::Bool(false)),
            _ => None,
        },
    }
}

#[async_trait]
impl ArgumentParser for ArgumentSpec {
    async fn parse(&self, ctx: &mut CommandContext) -> bool {
        let reply = match self.parse_values(&ctx.raw_args) {
            Ok(values) => {
                ctx.args = values;
                return true;
            },
            Err(ArgumentError::Missing(name)) => ctx.localize(keys::COMMAND_MISSING_ARGS, &[&name]),
            Err(ArgumentError::Invalid { name, kind }) => {
                ctx.localize(keys::COMMAND_INVALID_ARG, &[&name, &kind])
            },
        };
        if let Err(e) = ctx.reply(&reply).await {
            warn!(command = %ctx.command.name(), error = %e, "failed to send argument error");
        }
        false
    }
}
