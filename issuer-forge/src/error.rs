use std::path::{Path, PathBuf};

/// Errors raised while configuring or forging a token.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// A registered claim was passed to a generic claim setter.
    ///
    /// Registered claims (`iss`, `aud`, `sub`, `jti`, `exp`, `iat`, `nbf`)
    /// are only settable through their dedicated methods.
    #[error("invalid claim name '{name}': registered claims have a dedicated setter")]
    InvalidClaimName { name: String },

    /// A key asset is missing, unreadable, or not the expected DER encoding.
    #[error("failed to load key asset '{}'", path.display())]
    KeyLoad {
        path: PathBuf,
        #[source]
        source: KeyLoadCause,
    },

    /// The key pair parsed but the RS256 signature could not be produced.
    #[error("failed to sign token")]
    Signing {
        #[source]
        source: SigningCause,
    },
}

impl ForgeError {
    pub(crate) fn key_load(path: &Path, source: impl Into<KeyLoadCause>) -> Self {
        ForgeError::KeyLoad {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn signing(source: impl Into<SigningCause>) -> Self {
        ForgeError::Signing {
            source: source.into(),
        }
    }
}

/// Underlying cause of a [`ForgeError::KeyLoad`].
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadCause {
    #[error("cannot read file")]
    Io(#[from] std::io::Error),

    #[error("not a PKCS#8 RSA private key")]
    PrivateKey(#[from] rsa::pkcs8::Error),

    #[error("not an X.509 RSA public key")]
    PublicKey(#[from] rsa::pkcs8::spki::Error),
}

/// Underlying cause of a [`ForgeError::Signing`].
#[derive(Debug, thiserror::Error)]
pub enum SigningCause {
    /// The public key asset does not belong to the private key asset.
    #[error("public key does not match the private key")]
    KeyMismatch,

    #[error("cannot re-encode the private key")]
    Encoding(#[source] rsa::pkcs8::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
