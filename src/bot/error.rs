use crate::chat::error::ChatError;
use crate::twitch::UpstreamError;

/// Why a session could not start, or stopped.
#[derive(Debug)]
pub enum LaunchError {
    /// The authorization code could not be exchanged for an Access Token.
    Exchange(UpstreamError),
    /// The broadcaster id could not be resolved.
    Identity(UpstreamError),
    /// The chat transport failed to connect or to deliver messages.
    Chat(ChatError),
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::Exchange(err) => f.write_fmt(format_args!(
                "Could not get an Access Token from Twitch: {err}"
            )),
            LaunchError::Identity(err) => {
                f.write_fmt(format_args!("Could not get the broadcaster id: {err}"))
            }
            LaunchError::Chat(err) => f.write_fmt(format_args!("{err}")),
        }
    }
}
impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Exchange(err) | LaunchError::Identity(err) => Some(err),
            LaunchError::Chat(err) => Some(err),
        }
    }
}

impl From<ChatError> for LaunchError {
    fn from(value: ChatError) -> Self {
        LaunchError::Chat(value)
    }
}
