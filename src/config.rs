use crate::auth::access::DEFAULT_TOKEN_ENDPOINT;
use crate::twitch::{DEFAULT_HELIX_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub exec: Exec,
}

#[derive(Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TwitchConfig {
    pub channel: String,
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    /// Can also be given on the command line.
    #[serde(default)]
    pub authorization_code: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct Api {
    pub helix_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct Exec {
    pub debug: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    IO(std::io::Error),
    Parse(toml::de::Error),
    Empty(&'static str),
    InvalidUrl { field: &'static str, value: String },
    ZeroTimeout,
}

impl Config {
    /// Reads and parses the TOML file at `path`. The result is not validated.
    ///
    /// # Errors
    /// Returns `Err(ConfigError...)`:
    /// * `::IO` if the file could not be read.
    /// * `::Parse` if the file is not a valid config.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    /// # Errors
    /// Returns `ConfigError::Parse` if `text` is not a valid config.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Checks that every required value is present and well-formed.
    ///
    /// # Errors
    /// * `::Empty` if a `[twitch]` value is empty.
    /// * `::InvalidUrl` if the token endpoint or Helix URL is not an http(s) URL.
    /// * `::ZeroTimeout` if `api.timeout_secs` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let twitch = &self.twitch;
        for (field, value) in [
            ("twitch.channel", &twitch.channel),
            ("twitch.username", &twitch.username),
            ("twitch.client_id", &twitch.client_id),
            ("twitch.client_secret", &twitch.client_secret),
            ("twitch.authorization_code", &twitch.authorization_code),
            ("twitch.token_endpoint", &twitch.token_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }

        for (field, value) in [
            ("twitch.token_endpoint", &twitch.token_endpoint),
            ("api.helix_url", &self.api.helix_url),
        ] {
            if crate::twitch::parse_url(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            helix_url: String::from(DEFAULT_HELIX_URL),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

fn default_token_endpoint() -> String {
    String::from(DEFAULT_TOKEN_ENDPOINT)
}

impl std::fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("channel", &self.channel)
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .field("token_endpoint", &self.token_endpoint)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IO(err) => {
                f.write_fmt(format_args!("Error reading the config file: {err}"))
            }
            ConfigError::Parse(err) => {
                f.write_fmt(format_args!("Error parsing the config file: {err}"))
            }
            ConfigError::Empty(field) => {
                f.write_fmt(format_args!("Config value {field} must not be empty"))
            }
            ConfigError::InvalidUrl { field, value } => f.write_fmt(format_args!(
                "Config value {field} is not an http(s) URL: {value:?}"
            )),
            ConfigError::ZeroTimeout => f.write_str("Config value api.timeout_secs must be above 0"),
        }
    }
}
impl std::error::Error for ConfigError {}
impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::IO(value)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parse(value)
    }
}
