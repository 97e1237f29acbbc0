#[derive(Debug)]
pub enum ChatError {
    /// An error from the IRC connection.
    Irc(irc::error::Error),
    /// A message was sent or read before `connect`.
    NotConnected,
    /// The connection dropped and could not be opened again.
    Disconnected { attempts: u32 },
    /// The message stream ended although nobody asked to shut down.
    Closed,
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Irc(err) => f.write_fmt(format_args!("Chat error from Twitch IRC: {err}")),
            ChatError::NotConnected => f.write_str("Chat is not connected"),
            ChatError::Disconnected { attempts } => f.write_fmt(format_args!(
                "Lost the chat connection and gave up after {attempts} reconnect attempts"
            )),
            ChatError::Closed => f.write_str("The chat connection closed unexpectedly"),
        }
    }
}
impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Irc(err) => Some(err),
            _ => None,
        }
    }
}
impl From<irc::error::Error> for ChatError {
    fn from(value: irc::error::Error) -> Self {
        ChatError::Irc(value)
    }
}
