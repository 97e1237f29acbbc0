use super::data::Session;
use crate::twitch::{ApiClient, ApiRequest, HelixList, UpstreamError, Validated};
use reqwest::Method;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HelixClip {
    pub edit_url: String,
}

impl Validated for HelixList<HelixClip> {
    type Output = String;

    fn validate(self) -> Option<String> {
        self.into_first()
            .map(|clip| clip.edit_url)
            .filter(|edit_url| !edit_url.trim().is_empty())
    }
}

/// Creates a clip of the session's broadcaster and returns its edit URL.
///
/// # Errors
/// See [`ApiClient::call`]. An empty clip list is `::Response`.
pub async fn generate_clip(api: &ApiClient, session: &Session) -> Result<String, UpstreamError> {
    api.call::<HelixList<HelixClip>>(
        ApiRequest::new(Method::POST, api.helix("clips"))
            .query("broadcaster_id", session.broadcaster_id())
            .helix_auth(&session.credentials(), session.client_id()),
    )
    .await
}
