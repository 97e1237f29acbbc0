//! Exchanging an authorization code for an Access Token.
use super::creds::Credentials;
use crate::twitch::{ApiClient, ApiRequest, UpstreamError, Validated};
use reqwest::Method;
use serde::Deserialize;

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://id.twitch.tv/oauth2/token";
/// Must match the redirect URI registered for the application on Twitch.
pub const REDIRECT_URI: &str = "http://localhost";

/// Everything needed to redeem an authorization code.
#[derive(Clone)]
pub struct ExchangeRequest {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorization_code: String,
}

#[derive(Debug, Deserialize)]
struct TokenRequestResponse {
    access_token: String,
    token_type: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<Vec<String>>,
}

impl Validated for TokenRequestResponse {
    type Output = Credentials;

    fn validate(self) -> Option<Credentials> {
        if self.access_token.trim().is_empty() || self.token_type.trim().is_empty() {
            return None;
        }
        Some(Credentials {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            scope: self.scope.unwrap_or_default(),
        })
    }
}

/// Redeems `request.authorization_code` for a new set of [Credentials].
/// Makes exactly one request and never retries.
///
/// # Errors
/// Returns `Err(UpstreamError...)`:
/// * `::RequestSetup` if any field of `request` is empty or the endpoint is
///   not an http(s) URL. Nothing is sent in that case.
/// * `::NoResponse` if a response was not received from Twitch.
/// * `::Response` if Twitch denied the request, or answered without an
///   `access_token` and `token_type`.
pub async fn exchange_code(
    api: &ApiClient,
    request: &ExchangeRequest,
) -> Result<Credentials, UpstreamError> {
    request.check()?;
    log::info!("Fetching Twitch OAuth token");

    let result = api
        .call::<TokenRequestResponse>(
            ApiRequest::new(Method::POST, request.endpoint.as_str())
                .query("client_id", request.client_id.as_str())
                .query("client_secret", request.client_secret.as_str())
                .query("code", request.authorization_code.as_str())
                .query("grant_type", "authorization_code")
                .query("redirect_uri", REDIRECT_URI),
        )
        .await;
    if let Err(err) = &result {
        log::error!("Failed to get Twitch OAuth token: {err}");
    }
    result
}

impl ExchangeRequest {
    fn check(&self) -> Result<(), UpstreamError> {
        for (name, value) in [
            ("token endpoint", &self.endpoint),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("authorization code", &self.authorization_code),
        ] {
            if value.trim().is_empty() {
                return Err(UpstreamError::RequestSetup(format!(
                    "The {name} must not be empty"
                )));
            }
        }
        crate::twitch::parse_url(&self.endpoint)?;
        Ok(())
    }
}

impl std::fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
