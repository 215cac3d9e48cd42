use std::path::Path;

use issuer_endpoint::TlsAssets;
use reqwest::{Certificate, Client};

use crate::error::VerifyError;

/// HTTP client for talking to a test issuer.
///
/// With `trust_bundled_ca`, the throwaway CA that signed the endpoint's
/// bundled certificate is added to the trust roots so HTTPS issuers on
/// `localhost` are reachable.
pub fn http_client(trust_bundled_ca: bool) -> Result<Client, VerifyError> {
    if trust_bundled_ca {
        http_client_trusting(&TlsAssets::bundled().ca_file)
    } else {
        Client::builder().build().map_err(VerifyError::Client)
    }
}

/// HTTP client trusting the PEM CA certificate at `ca_file`.
pub fn http_client_trusting(ca_file: &Path) -> Result<Client, VerifyError> {
    let pem = std::fs::read(ca_file).map_err(|source| VerifyError::CaRead {
        path: ca_file.to_path_buf(),
        source,
    })?;
    let ca = Certificate::from_pem(&pem).map_err(VerifyError::Client)?;

    Client::builder()
        .add_root_certificate(ca)
        .build()
        .map_err(VerifyError::Client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_ca_client_builds() {
        assert!(http_client(true).is_ok());
        assert!(http_client(false).is_ok());
    }

    #[test]
    fn missing_ca_names_the_path() {
        let err = http_client_trusting(Path::new("/nonexistent/ca.pem")).unwrap_err();
        match err {
            VerifyError::CaRead { path, .. } => assert_eq!(path, Path::new("/nonexistent/ca.pem")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
