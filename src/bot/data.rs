use super::error::LaunchError;
use crate::auth::access::{exchange_code, ExchangeRequest};
use crate::auth::creds::{CredentialSlot, Credentials};
use crate::chat::data::ChatIdentity;
use crate::config::TwitchConfig;
use crate::twitch::{resolve_broadcaster_id, ApiClient};

/// A session that has not talked to Twitch yet. The only thing it can do is
/// [authenticate](PendingSession::authenticate).
#[derive(Debug)]
pub struct PendingSession {
    config: TwitchConfig,
}

/// An authenticated session: credentials and broadcaster id are both known.
/// Read-only once built, apart from swapping in new credentials.
#[derive(Debug)]
pub struct Session {
    channel: String,
    username: String,
    client_id: String,
    credentials: CredentialSlot,
    broadcaster_id: String,
}

impl PendingSession {
    pub fn new(config: TwitchConfig) -> Self {
        Self { config }
    }

    /// Exchanges the authorization code, then resolves the broadcaster id
    /// with the new token. Stops at the first failure.
    ///
    /// # Errors
    /// * `LaunchError::Exchange` if the code could not be exchanged. The
    ///   broadcaster id is never requested in that case.
    /// * `LaunchError::Identity` if the broadcaster id could not be resolved.
    pub async fn authenticate(self, api: &ApiClient) -> Result<Session, LaunchError> {
        let TwitchConfig {
            channel,
            username,
            client_id,
            client_secret,
            authorization_code,
            token_endpoint,
        } = self.config;

        let credentials = exchange_code(
            api,
            &ExchangeRequest {
                endpoint: token_endpoint,
                client_id: client_id.clone(),
                client_secret,
                authorization_code,
            },
        )
        .await
        .map_err(LaunchError::Exchange)?;

        let broadcaster_id = resolve_broadcaster_id(api, &credentials, &client_id)
            .await
            .map_err(LaunchError::Identity)?;

        Ok(Session {
            channel,
            username,
            client_id,
            credentials: CredentialSlot::new(credentials),
            broadcaster_id,
        })
    }
}

impl Session {
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
    #[must_use]
    pub fn broadcaster_id(&self) -> &str {
        &self.broadcaster_id
    }
    /// A copy of the current credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.credentials.get()
    }
    /// Installs refreshed credentials. In-flight handlers keep the copy they
    /// already took.
    #[allow(dead_code)] // no refresh policy exists yet
    pub fn replace_credentials(&self, credentials: Credentials) -> Credentials {
        self.credentials.replace(credentials)
    }

    #[must_use]
    pub fn chat_identity(&self) -> ChatIdentity {
        ChatIdentity {
            username: self.username.clone(),
            access_token: self.credentials().access_token,
            channel: self.channel.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn authenticated(
        channel: &str,
        username: &str,
        client_id: &str,
        credentials: Credentials,
        broadcaster_id: &str,
    ) -> Self {
        Self {
            channel: String::from(channel),
            username: String::from(username),
            client_id: String::from(client_id),
            credentials: CredentialSlot::new(credentials),
            broadcaster_id: String::from(broadcaster_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(token: &str) -> Credentials {
        Credentials {
            access_token: String::from(token),
            token_type: String::from("bearer"),
            ..Default::default()
        }
    }

    #[test]
    fn chat_identity_uses_current_token() {
        let session = Session::authenticated("eye_motif", "eye___bot", "client", credentials("old"), "1");
        session.replace_credentials(credentials("new"));

        let identity = session.chat_identity();

        assert_eq!(identity.access_token, "new");
        assert_eq!(identity.username, "eye___bot");
        assert_eq!(identity.channel, "eye_motif");
    }
}
