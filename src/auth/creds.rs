use std::sync::{Arc, PoisonError, RwLock};

/// The tokens handed out by Twitch for an authorization code.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires, as reported by Twitch.
    pub expires_in: Option<u64>,
    pub scope: Vec<String>,
}

/// Shared storage for the session's [Credentials].
///
/// Readers always get a complete copy. [replace](CredentialSlot::replace)
/// swaps the whole value at once, so a handler never sees half of an old
/// token and half of a new one.
#[derive(Debug, Clone)]
pub struct CredentialSlot(Arc<RwLock<Credentials>>);

impl CredentialSlot {
    pub fn new(credentials: Credentials) -> Self {
        Self(Arc::new(RwLock::new(credentials)))
    }

    #[must_use]
    pub fn get(&self) -> Credentials {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stores `credentials` and returns the previous ones.
    pub fn replace(&self, credentials: Credentials) -> Credentials {
        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, credentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access_token: &str) -> Credentials {
        Credentials {
            access_token: String::from(access_token),
            token_type: String::from("bearer"),
            ..Default::default()
        }
    }

    #[test]
    fn replace_is_seen_by_every_clone() {
        let slot = CredentialSlot::new(token("first"));
        let reader = slot.clone();

        let old = slot.replace(token("second"));

        assert_eq!(old.access_token, "first");
        assert_eq!(reader.get().access_token, "second");
    }

    #[test]
    fn debug_hides_tokens() {
        let mut creds = token("secret-access");
        creds.refresh_token = Some(String::from("secret-refresh"));

        let printed = format!("{creds:?}");

        assert!(!printed.contains("secret-access"));
        assert!(!printed.contains("secret-refresh"));
        assert!(printed.contains("bearer"));
    }
}
