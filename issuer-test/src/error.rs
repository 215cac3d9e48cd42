use std::path::PathBuf;

use issuer_endpoint::EndpointError;

/// Errors raised while fetching issuer documents or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The CA certificate to trust could not be read.
    #[error("failed to read CA certificate '{}'", path.display())]
    CaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// A well-known document could not be fetched or parsed.
    #[error("failed to fetch '{url}'")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A published key could not be turned into a decoding key.
    #[error("invalid key '{kid}' in JWKS")]
    InvalidKey {
        kid: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// The token header has no `kid`.
    #[error("token header has no 'kid'")]
    MissingKeyId,

    /// No published key matches the token's `kid`.
    #[error("unknown key id '{0}'")]
    UnknownKeyId(String),

    /// Header, signature or claim validation failed.
    #[error("invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Errors raised while starting a [`TestIssuer`](crate::TestIssuer).
#[derive(Debug, thiserror::Error)]
pub enum TestIssuerError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Client(#[from] VerifyError),
}
