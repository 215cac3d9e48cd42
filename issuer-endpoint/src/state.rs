use crate::handoff::Handoff;
use crate::jwks::JwksResponse;

/// Shared state for the issuer handlers.
pub(crate) struct IssuerState {
    pub handoff: Handoff,
    pub jwks: JwksResponse,
}
