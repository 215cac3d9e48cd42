use issuer_endpoint::{IssuerConfig, IssuerEndpoint, RunningIssuer};
use reqwest::Client;

use crate::client::http_client_trusting;
use crate::discovery::{fetch_discovery, DiscoveryDocument};
use crate::error::{TestIssuerError, VerifyError};
use crate::verifier::JwksVerifier;

/// An in-process issuer paired with a client that can reach both of its
/// listeners.
pub struct TestIssuer {
    issuer: RunningIssuer,
    client: Client,
}

impl TestIssuer {
    /// Start an issuer announcing its own URL.
    pub async fn start(config: IssuerConfig) -> Result<Self, TestIssuerError> {
        let issuer = config.start().await?;
        let client = http_client_trusting(issuer.ca_file())?;
        Ok(Self { issuer, client })
    }

    pub fn running(&self) -> &RunningIssuer {
        &self.issuer
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn discovery(&self) -> Result<DiscoveryDocument, VerifyError> {
        fetch_discovery(&self.client, &self.issuer.url()).await
    }

    /// A verifier loaded from this issuer's JWKS.
    pub async fn verifier(&self) -> Result<JwksVerifier, VerifyError> {
        JwksVerifier::fetch(&self.client, &self.issuer.url()).await
    }

    pub async fn stop(self) {
        self.issuer.stop().await;
    }
}

impl IssuerEndpoint for TestIssuer {
    fn name(&self) -> &str {
        self.issuer.name()
    }

    fn url(&self) -> String {
        self.issuer.url()
    }
}
