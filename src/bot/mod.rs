use crate::chat::error::ChatError;
use crate::chat::interface::{ChatSender, ChatTransport};
use crate::twitch::ApiClient;
use command::CommandRegistry;
use data::{PendingSession, Session};
use dispatch::Dispatcher;
use error::LaunchError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

pub mod clip;
pub mod command;
pub mod data;
pub mod dispatch;
pub mod error;

/// Starts a chat session and keeps it running.
pub struct SessionController<T: ChatTransport> {
    api: ApiClient,
    transport: T,
    registry: CommandRegistry,
}

impl<T: ChatTransport> SessionController<T> {
    pub fn new(api: ApiClient, transport: T, registry: CommandRegistry) -> Self {
        Self {
            api,
            transport,
            registry,
        }
    }

    /// Authenticates, connects to chat, and handles messages until
    /// `shutdown` resolves.
    ///
    /// Nothing is sent to chat until both the Access Token and the
    /// broadcaster id are known. Each message is handled on its own task,
    /// and handlers still running at shutdown are awaited.
    ///
    /// # Errors
    /// * `LaunchError::Exchange` or `LaunchError::Identity` if authentication
    ///   failed. No chat connection is attempted.
    /// * `LaunchError::Chat` if the transport failed to connect or to read, or
    ///   its message stream ended before `shutdown`.
    pub async fn launch<F>(self, pending: PendingSession, shutdown: F) -> Result<(), LaunchError>
    where
        F: Future<Output = ()> + Send,
    {
        let SessionController {
            api,
            mut transport,
            registry,
        } = self;
        tokio::pin!(shutdown);

        let (session, chat) = tokio::select! {
            started = start(&api, &mut transport, pending) => started?,
            () = &mut shutdown => {
                log::info!("Shut down before joining chat");
                return Ok(());
            }
        };
        let chat: Arc<dyn ChatSender> = Arc::new(chat);
        let dispatcher = Arc::new(Dispatcher::new(registry, session, api, chat));

        run(transport, dispatcher, shutdown).await
    }
}

async fn start<T: ChatTransport>(
    api: &ApiClient,
    transport: &mut T,
    pending: PendingSession,
) -> Result<(Arc<Session>, T::Sender), LaunchError> {
    let session = Arc::new(pending.authenticate(api).await?);
    log::info!(
        "Authenticated as {} (broadcaster id {}), connecting to #{}",
        session.username(),
        session.broadcaster_id(),
        session.channel()
    );

    let chat = transport.connect(&session.chat_identity()).await?;
    Ok((session, chat))
}

async fn run<T: ChatTransport, F: Future<Output = ()>>(
    mut transport: T,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: Pin<&mut F>,
) -> Result<(), LaunchError> {
    log::info!("Ready to receive messages!");
    let mut handlers = JoinSet::new();

    let result = loop {
        tokio::select! {
            message = transport.next_message() => match message {
                Some(Ok(message)) => {
                    let dispatcher = dispatcher.clone();
                    handlers.spawn(async move {
                        dispatcher.handle(message).await;
                    });
                }
                Some(Err(err)) => break Err(LaunchError::Chat(err)),
                None => break Err(LaunchError::Chat(ChatError::Closed)),
            },
            Some(joined) = handlers.join_next() => {
                if let Err(err) = joined {
                    log::error!("A command handler panicked: {err}");
                }
            }
            () = shutdown.as_mut() => break Ok(()),
        }
    };

    while let Some(joined) = handlers.join_next().await {
        if let Err(err) = joined {
            log::error!("A command handler panicked: {err}");
        }
    }
    match &result {
        Ok(()) => log::info!("Left chat"),
        Err(err) => log::error!("Chat session ended: {err}"),
    }
    result
}
