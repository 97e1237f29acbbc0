use super::clip::generate_clip;
use super::command::{CommandMatch, CommandRegistry};
use super::data::Session;
use crate::chat::data::InboundMessage;
use crate::chat::interface::ChatSender;
use crate::twitch::ApiClient;
use std::sync::Arc;

pub const CLIP_FAILED_MESSAGE: &str = "Sorry, I couldn't generate a clip for you. Try again later.";

/// Runs the command a chat message asks for, if any. Holds no state between
/// messages, so one dispatcher can serve any number of messages at once.
pub struct Dispatcher {
    registry: CommandRegistry,
    session: Arc<Session>,
    api: ApiClient,
    chat: Arc<dyn ChatSender>,
}

impl Dispatcher {
    pub fn new(
        registry: CommandRegistry,
        session: Arc<Session>,
        api: ApiClient,
        chat: Arc<dyn ChatSender>,
    ) -> Self {
        Self {
            registry,
            session,
            api,
            chat,
        }
    }

    /// Handles one message and returns the command that ran.
    ///
    /// Failures are reported in chat or logged; none of them end the session.
    pub async fn handle(&self, message: InboundMessage) -> CommandMatch {
        let matched = self.registry.match_message(&message);
        log::debug!("{}: {:?} -> {matched:?}", message.channel, message.text);

        match &matched {
            CommandMatch::NoMatch => (),
            CommandMatch::Greeting { username } => {
                self.say(&message.channel, &format!("Hello, {username}!"));
            }
            CommandMatch::ClipRequest { channel } => {
                let reply = match generate_clip(&self.api, &self.session).await {
                    Ok(edit_url) => {
                        log::info!("Created clip {edit_url}");
                        format!("Here's your clip: {edit_url}")
                    }
                    Err(err) => {
                        log::warn!("Failed to create a clip: {err}");
                        String::from(CLIP_FAILED_MESSAGE)
                    }
                };
                self.say(channel, &reply);
            }
        }
        matched
    }

    fn say(&self, channel: &str, text: &str) {
        if let Err(err) = self.chat.say(channel, text) {
            log::error!("Failed to post to {channel}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::creds::Credentials;
    use crate::chat::error::ChatError;
    use httpmock::prelude::*;
    use std::time::Duration;

    struct Recorder(std::sync::Mutex<Vec<(String, String)>>);

    impl ChatSender for Recorder {
        fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
            self.0
                .lock()
                .unwrap()
                .push((String::from(channel), String::from(text)));
            Ok(())
        }
    }

    struct Broken;

    impl ChatSender for Broken {
        fn say(&self, _channel: &str, _text: &str) -> Result<(), ChatError> {
            Err(ChatError::Irc(irc::error::Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "socket closed",
            ))))
        }
    }

    fn dispatcher(server: &MockServer, chat: Arc<dyn ChatSender>) -> Dispatcher {
        let session = Session::authenticated(
            "eye_motif",
            "eye___bot",
            "client",
            Credentials {
                access_token: String::from("token"),
                token_type: String::from("bearer"),
                ..Default::default()
            },
            "12345",
        );
        Dispatcher::new(
            CommandRegistry::builtin(),
            Arc::new(session),
            ApiClient::new(&server.url("/helix"), Duration::from_secs(5)).unwrap(),
            chat,
        )
    }

    fn message(text: &str, is_self: bool) -> InboundMessage {
        InboundMessage {
            channel: String::from("#eye_motif"),
            sender_tags: [(String::from("display-name"), String::from("Viewer"))]
                .into_iter()
                .collect(),
            text: String::from(text),
            is_self,
        }
    }

    #[tokio::test]
    async fn greets_in_the_originating_channel() {
        let server = MockServer::start_async().await;
        let recorder = Arc::new(Recorder(Default::default()));
        let dispatcher = dispatcher(&server, recorder.clone());

        dispatcher.handle(message("Hello", false)).await;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            [(String::from("#eye_motif"), String::from("Hello, Viewer!"))]
        );
    }

    #[tokio::test]
    async fn posts_the_clip_edit_url() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/helix/clips")
                    .query_param("broadcaster_id", "12345");
                then.status(202)
                    .body(r#"{"data":[{"edit_url":"https://clips.example/abc"}]}"#);
            })
            .await;
        let recorder = Arc::new(Recorder(Default::default()));
        let dispatcher = dispatcher(&server, recorder.clone());

        let matched = dispatcher.handle(message("!CLIP ", false)).await;

        mock.assert_async().await;
        assert!(matches!(matched, CommandMatch::ClipRequest { .. }));
        assert_eq!(
            *recorder.0.lock().unwrap(),
            [(
                String::from("#eye_motif"),
                String::from("Here's your clip: https://clips.example/abc")
            )]
        );
    }

    #[tokio::test]
    async fn apologizes_when_the_clip_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/helix/clips");
                then.status(401).body(r#"{"error":"invalid_token"}"#);
            })
            .await;
        let recorder = Arc::new(Recorder(Default::default()));
        let dispatcher = dispatcher(&server, recorder.clone());

        dispatcher.handle(message("!clip", false)).await;
        dispatcher.handle(message("hi", false)).await;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            [
                (String::from("#eye_motif"), String::from(CLIP_FAILED_MESSAGE)),
                (String::from("#eye_motif"), String::from("Hello, Viewer!")),
            ]
        );
    }

    #[tokio::test]
    async fn ignores_its_own_messages() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/helix/clips");
                then.status(202)
                    .body(r#"{"data":[{"edit_url":"https://clips.example/abc"}]}"#);
            })
            .await;
        let recorder = Arc::new(Recorder(Default::default()));
        let dispatcher = dispatcher(&server, recorder.clone());

        for text in ["hi", "!clip", "Here's your clip: https://clips.example/abc"] {
            let matched = dispatcher.handle(message(text, true)).await;
            assert_eq!(matched, CommandMatch::NoMatch);
        }

        mock.assert_hits_async(0).await;
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_failures_are_not_fatal() {
        let server = MockServer::start_async().await;
        let dispatcher = dispatcher(&server, Arc::new(Broken));

        let matched = dispatcher.handle(message("hey", false)).await;

        assert!(matches!(matched, CommandMatch::Greeting { .. }));
    }
}
