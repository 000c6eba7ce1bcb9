use async_trait::async_trait;

use crate::{
    Result,
    model::{Channel, Guild},
};

/// Handle to a live platform connection.
///
/// One session is shared by every message it delivers; implementations must
/// tolerate concurrent calls from many dispatch tasks.
#[async_trait]
pub trait Session: Send + Sync {
    /// ID of the bot's own user on this connection.
    fn self_user_id(&self) -> &str;

    /// Look up a guild in the platform state cache.
    async fn guild(&self, guild_id: &str) -> Result<Guild>;

    /// Look up a channel in the platform state cache.
    async fn channel(&self, channel_id: &str) -> Result<Channel>;

    /// Post a plain text message to a channel.
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Send a "typing" indicator. No-op by default.
    async fn send_typing(&self, _channel_id: &str) -> Result<()> {
        Ok(())
    }
}
