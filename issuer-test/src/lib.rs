//! Helpers for tests that consume the disposable OIDC issuer.
//!
//! - [`http_client`]: a `reqwest` client that trusts the issuer's bundled CA
//! - [`fetch_discovery`]: read the discovery document
//! - [`JwksVerifier`]: validate forged tokens against the published JWKS
//! - [`TestIssuer`]: an in-process issuer plus a client that can reach it
//!
//! # Example
//!
//! ```ignore
//! use issuer_endpoint::{IssuerConfig, IssuerEndpoint};
//! use issuer_test::TestIssuer;
//!
//! let issuer = TestIssuer::start(IssuerConfig::secured_defaults()).await?;
//! let token = issuer.forgery().with_subject("subject").forge()?;
//! let verified = issuer.verifier().await?.verify(&token)?;
//! assert_eq!(verified.claims["sub"], "subject");
//! ```

pub mod client;
pub mod discovery;
pub mod error;
pub mod issuer;
pub mod verifier;

pub use client::{http_client, http_client_trusting};
pub use discovery::{fetch_discovery, DiscoveryDocument};
pub use error::{TestIssuerError, VerifyError};
pub use issuer::TestIssuer;
pub use verifier::{JwksVerifier, VerifiedToken};
