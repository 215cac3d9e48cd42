use std::fmt;

use crate::error::EndpointError;

/// Issuer name used when none is given.
pub const DEFAULT_NAME: &str = "default";

/// URL scheme of an issuer, selected by its `secured` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn for_secured(secured: bool) -> Self {
        if secured {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `scheme://host:port/name`, without a trailing slash.
///
/// Verifiers compare this string byte-for-byte against `iss`.
pub fn issuer_url(scheme: Scheme, host: &str, port: u16, name: &str) -> String {
    format!("{scheme}://{host}:{port}/{name}")
}

/// Check that `name` can be used as the issuer path segment.
pub fn validate_name(name: &str) -> Result<(), EndpointError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '?', '#', '%', '\\'])
        && !name.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(EndpointError::InvalidName(name.to_string()))
    }
}
