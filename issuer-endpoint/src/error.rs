use std::net::SocketAddr;
use std::path::PathBuf;

use issuer_forge::ForgeError;

use crate::tls::TlsError;

/// Issuer endpoint error type.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The issuer name is not a single, non-empty URL path segment.
    #[error("invalid issuer name '{0}': expected a single non-empty path segment")]
    InvalidName(String),

    /// The base URL of an external issuer is unusable.
    #[error("invalid issuer url '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: &'static str,
        #[source]
        source: Option<url::ParseError>,
    },

    /// A listener could not be bound.
    #[error("failed to bind {listener} listener on {addr}")]
    Bind {
        listener: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The TLS certificate or key could not be loaded.
    #[error(transparent)]
    Tls(#[from] TlsError),

    /// The public key published in the JWKS could not be loaded.
    #[error("failed to load the published key")]
    Keys(#[from] ForgeError),

    /// The settings file could not be read.
    #[error("failed to read settings file '{}'", path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid YAML for the expected shape.
    #[error("failed to parse settings file '{}'", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A setting from the environment has an invalid value.
    #[error("invalid value for {key}: {message}")]
    Setting { key: String, message: String },
}
