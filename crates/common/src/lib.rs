//! Error plumbing and small utilities shared across sapphire crates.

pub mod error;
pub mod panic;

pub use {error::FromMessage, panic::panic_message};
