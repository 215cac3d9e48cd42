use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::jwks::JwksResponse;
use crate::state::IssuerState;

/// OpenID Connect discovery document.
#[derive(Serialize)]
pub(crate) struct DiscoveryDocument {
    issuer: String,
    jwks_uri: String,
    response_types_supported: Vec<&'static str>,
    subject_types_supported: Vec<&'static str>,
    id_token_signing_alg_values_supported: Vec<&'static str>,
}

/// GET /{name}/.well-known/openid-configuration
pub(crate) async fn discovery_handler(
    State(state): State<Arc<IssuerState>>,
) -> Json<DiscoveryDocument> {
    Json(DiscoveryDocument {
        issuer: state.handoff.issuer().to_string(),
        jwks_uri: state.handoff.jwks_uri(),
        response_types_supported: vec!["code", "id_token", "token id_token"],
        subject_types_supported: vec!["public"],
        id_token_signing_alg_values_supported: vec!["RS256"],
    })
}

/// GET /{name}/.well-known/jwks.json
pub(crate) async fn jwks_handler(State(state): State<Arc<IssuerState>>) -> Json<JwksResponse> {
    Json(state.jwks.clone())
}
