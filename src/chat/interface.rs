use super::data::{ChatIdentity, InboundMessage};
use super::error::ChatError;
use async_trait::async_trait;

/// A connection to a chat service.
#[async_trait]
pub trait ChatTransport: Send {
    type Sender: ChatSender + 'static;

    /// Logs in as `identity` and joins its channel.
    async fn connect(&mut self, identity: &ChatIdentity) -> Result<Self::Sender, ChatError>;

    /// Waits for the next chat message, reconnecting first if the connection
    /// dropped and the transport can recover. `None` once the stream has
    /// ended for good.
    ///
    /// Must be cancel safe: dropping the future before it completes loses no
    /// messages.
    async fn next_message(&mut self) -> Option<Result<InboundMessage, ChatError>>;
}

/// The sending half of a [ChatTransport], shared between command handlers.
pub trait ChatSender: Send + Sync {
    fn say(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}
