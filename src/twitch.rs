//! Calls to Twitch's HTTP APIs, and the way their failures are classified.
use crate::auth::creds::Credentials;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_HELIX_URL: &str = "https://api.twitch.tv/helix";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The ways a call to Twitch can fail.
///
/// Callers branch on the variant to decide what to tell the user, so the
/// split between the three must stay exact.
#[derive(Debug)]
pub enum UpstreamError {
    /// Twitch answered, either with a non-2xx status or with a body that did
    /// not have the expected shape.
    Response { status: u16, body: String },
    /// The request went out but no complete response came back, including
    /// timeouts.
    NoResponse(reqwest::Error),
    /// The request could not be built at all.
    RequestSetup(String),
}

/// A response body with a known schema. `validate` returns `None` if the body
/// parsed but is missing what the caller needs.
pub trait Validated: DeserializeOwned {
    type Output;

    fn validate(self) -> Option<Self::Output>;
}

/// The `{"data": [...]}` envelope Helix wraps its results in.
#[derive(Debug, Deserialize)]
pub struct HelixList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct HelixUser {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
}

/// A shared HTTP client for Twitch. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    helix_url: String,
    timeout: Duration,
}

impl<T> HelixList<T> {
    pub fn into_first(self) -> Option<T> {
        self.data.into_iter().next()
    }
}

impl Validated for HelixList<HelixUser> {
    type Output = String;

    fn validate(self) -> Option<String> {
        self.into_first()
            .map(|user| user.id)
            .filter(|id| !id.trim().is_empty())
    }
}

impl ApiRequest {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn header<V: Into<String>>(mut self, name: &'static str, value: V) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn query<V: Into<String>>(mut self, name: &'static str, value: V) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Adds the `Authorization` and `Client-Id` headers every Helix call needs.
    pub fn helix_auth(self, credentials: &Credentials, client_id: &str) -> Self {
        self.header(
            "Authorization",
            format!("Bearer {}", credentials.access_token),
        )
        .header("Client-Id", client_id)
    }
}

impl ApiClient {
    /// # Errors
    /// Returns `UpstreamError::RequestSetup` if `helix_url` is not an http(s)
    /// URL or the HTTP client could not be created.
    pub fn new(helix_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        parse_url(helix_url)?;
        let http = Client::builder()
            .build()
            .map_err(|err| UpstreamError::RequestSetup(err.to_string()))?;

        Ok(Self {
            http,
            helix_url: String::from(helix_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// The full URL of a Helix endpoint, e.g. `helix("users")`.
    #[must_use]
    pub fn helix(&self, endpoint: &str) -> String {
        format!("{}/{}", self.helix_url, endpoint.trim_start_matches('/'))
    }

    /// Sends `request` and decodes the body as `T`.
    ///
    /// # Errors
    /// * `::Response` if Twitch answered with a non-2xx status, or with a 2xx
    ///   body that did not parse or validate as `T`.
    /// * `::NoResponse` if the request was sent but no complete response
    ///   arrived before the timeout.
    /// * `::RequestSetup` if the URL, a header or a query parameter was
    ///   invalid.
    pub async fn call<T: Validated>(&self, request: ApiRequest) -> Result<T::Output, UpstreamError> {
        let url = parse_url(&request.url)?;

        let mut builder = self
            .http
            .request(request.method, url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let built = builder.build().map_err(UpstreamError::from_send)?;

        // the query can carry secrets
        log::debug!("{} {}", built.method(), built.url().path());

        let response = self
            .http
            .execute(built)
            .await
            .map_err(UpstreamError::from_send)?;
        let status = response.status();
        let body = response.text().await.map_err(UpstreamError::NoResponse)?;

        if !status.is_success() {
            return Err(UpstreamError::Response {
                status: status.as_u16(),
                body,
            });
        }

        let output = serde_json::from_str::<T>(&body).ok().and_then(T::validate);
        match output {
            Some(output) => Ok(output),
            None => Err(UpstreamError::Response {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

/// Parses `url`, accepting only http and https.
///
/// # Errors
/// Returns `UpstreamError::RequestSetup` if the URL is invalid.
pub fn parse_url(url: &str) -> Result<Url, UpstreamError> {
    let parsed = Url::parse(url)
        .map_err(|err| UpstreamError::RequestSetup(format!("Invalid URL {url:?}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UpstreamError::RequestSetup(format!(
            "Unsupported URL scheme {scheme:?} in {url:?}"
        ))),
    }
}

/// Looks up the user the access token belongs to and returns their id.
///
/// # Errors
/// See [`ApiClient::call`]. An empty user list is `::Response`.
pub async fn resolve_broadcaster_id(
    api: &ApiClient,
    credentials: &Credentials,
    client_id: &str,
) -> Result<String, UpstreamError> {
    log::info!("Fetching broadcaster id");

    let result = api
        .call::<HelixList<HelixUser>>(
            ApiRequest::new(Method::GET, api.helix("users")).helix_auth(credentials, client_id),
        )
        .await;
    match &result {
        Ok(id) => log::info!("Resolved broadcaster id {id}"),
        Err(err) => log::error!("Failed to get broadcaster id: {err}"),
    }
    result
}

impl UpstreamError {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            UpstreamError::RequestSetup(err.to_string())
        } else {
            UpstreamError::NoResponse(err)
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Response { status, body } => {
                f.write_fmt(format_args!("Twitch responded with {status}: {body}"))
            }
            UpstreamError::NoResponse(err) => {
                f.write_fmt(format_args!("No response received from Twitch: {err}"))
            }
            UpstreamError::RequestSetup(reason) => f.write_fmt(format_args!(
                "Could not build a request to Twitch: {reason}"
            )),
        }
    }
}
impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::NoResponse(err) => Some(err),
            _ => None,
        }
    }
}
