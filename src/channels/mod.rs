//! Voice delivery channels
//!
//! A channel delivers synthesized audio to a chat and hands back a durable
//! reference that later requests can reuse instead of uploading again.

mod local;
mod telegram;

use async_trait::async_trait;

pub use local::LocalVoiceStore;
pub use telegram::TelegramVoiceChannel;

use crate::Result;

/// Delivers voice messages
#[async_trait]
pub trait VoiceChannel: Send + Sync {
    /// Upload and deliver `audio` to `chat_id`
    ///
    /// Returns the reference the transport assigned to the delivered audio,
    /// or `None` if it did not report one.
    ///
    /// # Errors
    ///
    /// Returns error if delivery fails
    async fn send_voice(
        &self,
        chat_id: &str,
        audio: Vec<u8>,
        reply_to: Option<&str>,
    ) -> Result<Option<String>>;

    /// Deliver previously uploaded audio by reference
    ///
    /// # Errors
    ///
    /// Returns error if delivery fails
    async fn share_voice(&self, chat_id: &str, reference: &str, reply_to: Option<&str>)
    -> Result<()>;

    /// Channel name for logging
    fn name(&self) -> &'static str;
}
