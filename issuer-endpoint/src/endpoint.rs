use issuer_forge::TokenForgery;
use url::Url;

use crate::error::EndpointError;
use crate::identity::validate_name;
use crate::server::RunningIssuer;

/// Anything that exposes the issuer contract at a reachable base URL.
///
/// Token forges and verifiers only need the URL; how the endpoint was
/// started (in process, in a container, elsewhere) stays behind this trait.
pub trait IssuerEndpoint {
    /// The issuer path segment.
    fn name(&self) -> &str;

    /// `scheme://host:port/name`, without a trailing slash.
    fn url(&self) -> String;

    fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.url())
    }

    fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.url())
    }

    /// A token forge whose `iss` is this issuer's URL.
    fn forgery(&self) -> TokenForgery {
        TokenForgery::new(self.url())
    }
}

impl IssuerEndpoint for RunningIssuer {
    fn name(&self) -> &str {
        RunningIssuer::name(self)
    }

    fn url(&self) -> String {
        RunningIssuer::url(self)
    }
}

/// An issuer started by something else, known only by its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIssuer {
    name: String,
    url: String,
}

impl ExternalIssuer {
    /// Wrap an issuer base URL such as `http://localhost:32768/default`.
    /// The last path segment is the issuer name.
    ///
    /// Well-known paths are appended to the URL, so it may not carry a query
    /// or a fragment.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EndpointError> {
        let raw = base_url.into();
        let url = raw.trim_end_matches('/').to_string();
        let invalid = |reason, source| EndpointError::InvalidUrl {
            url: raw.clone(),
            reason,
            source,
        };

        let parsed = Url::parse(&url).map_err(|e| invalid("not an absolute url", Some(e)))?;
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed", None));
        }

        let name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        validate_name(&name)?;

        Ok(Self { name, url })
    }
}

impl IssuerEndpoint for ExternalIssuer {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}
