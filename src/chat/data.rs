use std::collections::HashMap;

/// Who the bot logs into chat as, and where.
#[derive(Clone)]
pub struct ChatIdentity {
    pub username: String,
    pub access_token: String,
    pub channel: String,
}

/// A chat message as delivered by a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: String,
    pub sender_tags: HashMap<String, String>,
    pub text: String,
    /// Set for messages sent from the bot's own account.
    pub is_self: bool,
}

impl InboundMessage {
    /// The sender's display name, falling back to their login.
    #[must_use]
    pub fn sender_name(&self) -> Option<&str> {
        ["display-name", "username"]
            .into_iter()
            .filter_map(|tag| self.sender_tags.get(tag))
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
    }
}

impl std::fmt::Debug for ChatIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatIdentity")
            .field("username", &self.username)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
