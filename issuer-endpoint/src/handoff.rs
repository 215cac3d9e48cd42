/// Environment variable carrying the externally visible issuer URL into the
/// endpoint's startup.
pub const HANDOFF_VAR: &str = "jwks_uri";

/// Externally visible base URL, injected once the network layer has assigned
/// host and ports.
///
/// The discovery document announces this URL as `issuer` and derives
/// `jwks_uri` from it, whatever address the request actually reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    base_url: String,
}

impl Handoff {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Read the handoff from [`HANDOFF_VAR`]. `None` when unset or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the handoff through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        lookup(HANDOFF_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| Self::new(value.trim()))
    }

    /// The issuer identifier.
    pub fn issuer(&self) -> &str {
        &self.base_url
    }

    pub fn jwks_uri(&self) -> String {
        format!("{}/.well-known/jwks.json", self.base_url)
    }

    pub fn discovery_uri(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.base_url)
    }
}
