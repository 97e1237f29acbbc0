use super::data::{ChatIdentity, InboundMessage};
use super::error::ChatError;
use super::interface::{ChatSender, ChatTransport};
use async_trait::async_trait;
use futures_util::StreamExt;
use irc::client::{Client, ClientStream, Sender};
use irc::proto::message::Tag;
use irc::proto::{CapSubCommand, Command, Message};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

const TWITCH_IRC_SERVER: &str = "irc.chat.twitch.tv";
const TWITCH_IRC_TLS_PORT: u16 = 6697;
const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Twitch chat over IRC. Reconnects on its own when Twitch asks it to or
/// drops the connection.
#[derive(Default)]
pub struct IrcTransport {
    // owns the connection the stream reads from
    client: Option<Client>,
    stream: Option<ClientStream>,
    identity: Option<ChatIdentity>,
    username: String,
    sender: Option<IrcSender>,
    failed_attempts: u32,
}

/// Posts to chat through whichever connection is current.
#[derive(Clone)]
pub struct IrcSender(Arc<RwLock<Sender>>);

impl IrcTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn open(&mut self, identity: &ChatIdentity) -> Result<(), ChatError> {
        let mut client = Client::from_config(irc::client::prelude::Config {
            nickname: Some(identity.username.clone()),
            username: Some(identity.username.clone()),
            server: Some(String::from(TWITCH_IRC_SERVER)),
            port: Some(TWITCH_IRC_TLS_PORT),
            use_tls: Some(true),
            // joined once Twitch sends its end-of-MOTD
            channels: vec![channel_name(&identity.channel)],
            ..Default::default()
        })
        .await?;
        client.send(Command::CAP(
            None,
            CapSubCommand::REQ,
            None,
            Some(String::from("twitch.tv/tags twitch.tv/commands")),
        ))?;
        client.send(Command::PASS(format!("oauth:{}", identity.access_token)))?;
        client.send(Command::NICK(identity.username.clone()))?;

        let sender = client.sender();
        self.stream = Some(client.stream()?);
        self.client = Some(client);
        match &self.sender {
            Some(shared) => shared.replace(sender),
            None => self.sender = Some(IrcSender(Arc::new(RwLock::new(sender)))),
        }

        log::info!(
            "Connected to Twitch chat as {}, joining {}",
            identity.username,
            channel_name(&identity.channel)
        );
        Ok(())
    }

    fn disconnect(&mut self) {
        self.stream = None;
        if let Some(client) = self.client.take() {
            // the socket may already be gone
            let _ = client.send_quit("");
        }
    }

    /// Opens a new connection with the identity given to `connect`, backing
    /// off between failed attempts. A cancelled call loses no progress that
    /// matters: the next call starts over with the same attempt count.
    async fn reconnect(&mut self) -> Result<(), ChatError> {
        let Some(identity) = self.identity.clone() else {
            return Err(ChatError::NotConnected);
        };

        loop {
            if self.failed_attempts >= MAX_RECONNECT_ATTEMPTS {
                return Err(ChatError::Disconnected {
                    attempts: self.failed_attempts,
                });
            }
            let delay = reconnect_delay(self.failed_attempts);
            if !delay.is_zero() {
                log::info!("Reconnecting to chat in {}s", delay.as_secs());
                tokio::time::sleep(delay).await;
            }

            match self.open(&identity).await {
                Ok(()) => {
                    self.failed_attempts = 0;
                    return Ok(());
                }
                Err(err) => {
                    self.failed_attempts += 1;
                    log::warn!(
                        "Reconnect attempt {}/{MAX_RECONNECT_ATTEMPTS} failed: {err}",
                        self.failed_attempts
                    );
                }
            }
        }
    }
}

#[async_trait]
impl ChatTransport for IrcTransport {
    type Sender = IrcSender;

    async fn connect(&mut self, identity: &ChatIdentity) -> Result<IrcSender, ChatError> {
        self.disconnect();
        self.identity = Some(identity.clone());
        self.username = identity.username.to_lowercase();
        self.failed_attempts = 0;
        self.open(identity).await?;
        self.sender.clone().ok_or(ChatError::NotConnected)
    }

    async fn next_message(&mut self) -> Option<Result<InboundMessage, ChatError>> {
        loop {
            let Some(stream) = self.stream.as_mut() else {
                if let Err(err) = self.reconnect().await {
                    return Some(Err(err));
                }
                continue;
            };

            let next = stream.next().await;
            match next {
                Some(Ok(message)) if is_reconnect_request(&message) => {
                    log::info!("Twitch asked for a reconnect");
                    self.disconnect();
                }
                Some(Ok(message)) => {
                    if let Some(inbound) = inbound_message(message, &self.username) {
                        return Some(Ok(inbound));
                    }
                }
                Some(Err(err)) => {
                    log::warn!("Lost the chat connection: {err}");
                    self.disconnect();
                }
                None => {
                    log::warn!("Twitch closed the chat connection");
                    self.disconnect();
                }
            }
        }
    }
}

impl IrcSender {
    fn replace(&self, sender: Sender) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = sender;
    }
}

impl ChatSender for IrcSender {
    fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .send_privmsg(channel_name(channel), text)?;
        Ok(())
    }
}

/// Twitch sends `RECONNECT` shortly before it restarts a chat server.
fn is_reconnect_request(message: &Message) -> bool {
    matches!(&message.command, Command::Raw(command, _) if command.eq_ignore_ascii_case("RECONNECT"))
}

/// No wait before the first attempt, then 1s, 2s, 4s, ...
fn reconnect_delay(failed_attempts: u32) -> Duration {
    match failed_attempts {
        0 => Duration::ZERO,
        n => Duration::from_secs(1 << (n - 1).min(6)),
    }
}

/// Converts a `PRIVMSG` into an [InboundMessage]. Every other command is
/// ignored.
fn inbound_message(message: Message, bot_username: &str) -> Option<InboundMessage> {
    let login = message.source_nickname().map(str::to_lowercase);
    let Command::PRIVMSG(channel, text) = message.command else {
        return None;
    };

    let mut sender_tags: HashMap<String, String> = message
        .tags
        .unwrap_or_default()
        .into_iter()
        .map(|Tag(k, v)| (k, v.unwrap_or_default()))
        .collect();
    if let Some(login) = &login {
        sender_tags.insert(String::from("username"), login.clone());
    }

    Some(InboundMessage {
        channel,
        sender_tags,
        text,
        is_self: login.as_deref() == Some(bot_username),
    })
}

fn channel_name(channel: &str) -> String {
    let channel = channel.trim().to_lowercase();
    if channel.starts_with('#') {
        channel
    } else {
        format!("#{channel}")
    }
}
