use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::VerifyError;

/// OpenID Connect discovery document as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(default)]
    pub subject_types_supported: Vec<String>,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

/// GET `{issuer_url}/.well-known/openid-configuration`.
pub async fn fetch_discovery(
    client: &Client,
    issuer_url: &str,
) -> Result<DiscoveryDocument, VerifyError> {
    let url = format!(
        "{}/.well-known/openid-configuration",
        issuer_url.trim_end_matches('/')
    );
    fetch_json(client, &url).await
}

pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, VerifyError> {
    let fetch_error = |source| VerifyError::Fetch {
        url: url.to_string(),
        source,
    };

    debug!(%url, "Fetching issuer document");
    client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?
        .json()
        .await
        .map_err(fetch_error)
}
