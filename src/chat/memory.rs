//! An in-process [ChatTransport] for tests.
use super::data::{ChatIdentity, InboundMessage};
use super::error::ChatError;
use super::interface::{ChatSender, ChatTransport};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub struct MemoryTransport {
    inbox: mpsc::UnboundedReceiver<InboundMessage>,
    log: Arc<ChatLog>,
    refuse_connect: bool,
}

/// Everything that happened on a [MemoryTransport].
#[derive(Debug, Default)]
pub struct ChatLog {
    connects: Mutex<Vec<ChatIdentity>>,
    said: Mutex<Vec<(String, String)>>,
}

#[derive(Clone)]
pub struct MemorySender(Arc<ChatLog>);

/// Returns the transport, a handle that delivers messages into it, and its log.
/// Dropping the handle ends the transport's message stream.
pub fn memory_transport() -> (
    mpsc::UnboundedSender<InboundMessage>,
    MemoryTransport,
    Arc<ChatLog>,
) {
    let (sender, inbox) = mpsc::unbounded_channel();
    let log = Arc::new(ChatLog::default());
    let transport = MemoryTransport {
        inbox,
        log: log.clone(),
        refuse_connect: false,
    };
    (sender, transport, log)
}

impl MemoryTransport {
    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connect = true;
        self
    }
}

impl ChatLog {
    pub fn connects(&self) -> Vec<ChatIdentity> {
        self.connects.lock().unwrap().clone()
    }

    pub fn said(&self) -> Vec<(String, String)> {
        self.said.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    type Sender = MemorySender;

    async fn connect(&mut self, identity: &ChatIdentity) -> Result<MemorySender, ChatError> {
        self.log.connects.lock().unwrap().push(identity.clone());
        if self.refuse_connect {
            return Err(ChatError::Irc(irc::error::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))));
        }
        Ok(MemorySender(self.log.clone()))
    }

    async fn next_message(&mut self) -> Option<Result<InboundMessage, ChatError>> {
        self.inbox.recv().await.map(Ok)
    }
}

impl ChatSender for MemorySender {
    fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.0
            .said
            .lock()
            .unwrap()
            .push((String::from(channel), String::from(text)));
        Ok(())
    }
}
