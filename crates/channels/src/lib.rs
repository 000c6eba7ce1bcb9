//! Chat platform model consumed by the dispatch pipeline.
//!
//! The realtime connection lives outside sapphire. A connectivity layer turns
//! platform events into [`Message`] snapshots and hands them over together with
//! a [`Session`], which answers state lookups (guilds, channels) and performs
//! outbound calls (replies, typing indicators).

pub mod error;
pub mod memory;
pub mod model;
pub mod session;

pub use {
    error::{Error, Result},
    memory::{MemorySession, SentMessage},
    model::{Author, Channel, ChannelKind, Guild, Message},
    session::Session,
};
