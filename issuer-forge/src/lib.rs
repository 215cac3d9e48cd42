//! Token forge for the disposable OIDC issuer.
//!
//! Mints RS256 JWTs carrying arbitrary claims, signed with the same RSA key
//! pair the issuer endpoint publishes through its JWKS. A verifier that
//! fetches `{issuer}/.well-known/jwks.json` accepts the forged tokens.
//!
//! The key pair is a static test fixture shipped in `keys/`:
//! `key.der` (PKCS#8 private key) and `key-pub.der` (X.509 public key).
//! It is read on every [`TokenForgery::forge`] call.
//!
//! # Example
//!
//! ```ignore
//! use issuer_forge::TokenForgery;
//!
//! let now = chrono::Utc::now();
//! let token = TokenForgery::new("http://localhost:32768/default")
//!     .with_audience(["audience"])
//!     .with_subject("subject")
//!     .with_claim("cid", "client_id")?
//!     .expires_at(now + chrono::Duration::minutes(5))
//!     .issued_at(now)
//!     .forge()?;
//! ```

pub mod claims;
pub mod error;
pub mod forgery;
pub mod keys;
pub mod token;

pub use claims::{ClaimSet, ClaimValue, NumericDate, REGISTERED_CLAIMS};
pub use error::{ForgeError, KeyLoadCause, SigningCause};
pub use forgery::TokenForgery;
pub use keys::{JwkComponents, KeyMaterial, KeyPaths, KEY_ID};

pub mod prelude {
    //! Re-exports of the most commonly used forge types.
    pub use crate::{ForgeError, KeyPaths, TokenForgery};
}
