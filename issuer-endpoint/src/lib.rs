//! Disposable OpenID Connect issuer for integration tests.
//!
//! Serves, under `/{name}`:
//!
//! - `/.well-known/openid-configuration`, announcing the issuer URL and its `jwks_uri`
//! - `/.well-known/jwks.json`, publishing the RSA key [`issuer_forge`] signs with
//! - any static file from the public assets directory
//!
//! The same content is served on a plain HTTP listener and on a
//! TLS-terminated HTTPS listener. The `secured` flag only decides which one
//! the issuer URL points at.
//!
//! # Example
//!
//! ```ignore
//! use issuer_endpoint::{IssuerConfig, IssuerEndpoint};
//!
//! let issuer = IssuerConfig::with_defaults().start().await?;
//! let token = issuer
//!     .forgery()
//!     .with_audience(["audience"])
//!     .with_subject("subject")
//!     .forge()?;
//! // validate `token` against issuer.jwks_url()
//! issuer.stop().await;
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod handoff;
pub mod identity;
pub mod jwks;
pub mod server;
pub mod settings;
pub mod tls;

mod handlers;
mod state;

use std::path::Path;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::IssuerConfig;
pub use endpoint::{ExternalIssuer, IssuerEndpoint};
pub use error::EndpointError;
pub use handoff::{Handoff, HANDOFF_VAR};
pub use identity::{issuer_url, Scheme, DEFAULT_NAME};
pub use jwks::JwksResponse;
pub use server::{BoundIssuer, RunningIssuer};
pub use settings::IssuerSettings;
pub use tls::{TlsAssets, TlsError};

/// Build the issuer router: well-known documents plus static content, all
/// nested under `/{name}`.
pub fn issuer_routes(
    name: &str,
    handoff: Handoff,
    jwks: JwksResponse,
    public_dir: &Path,
) -> Router {
    let state = Arc::new(state::IssuerState { handoff, jwks });

    let router = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(handlers::discovery_handler),
        )
        .route("/.well-known/jwks.json", get(handlers::jwks_handler))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state);

    Router::new()
        .nest(&format!("/{name}"), router)
        .layer(TraceLayer::new_for_http())
}

pub mod prelude {
    //! Re-exports of the most commonly used endpoint types.
    pub use crate::{ExternalIssuer, Handoff, IssuerConfig, IssuerEndpoint, RunningIssuer};
}
