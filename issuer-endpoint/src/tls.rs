//! TLS termination for the secured listener.
//!
//! Certificates are PEM files. The bundled set in `assets/tls/` is a
//! `localhost` / `127.0.0.1` leaf signed by a throwaway CA (`ca.pem`) that
//! clients must trust explicitly.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;

/// TLS configuration error.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read certificate file '{}'", path.display())]
    CertificateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read private key file '{}'", path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid certificates found in '{}'", path.display())]
    NoCertificates { path: PathBuf },

    #[error("no valid private key found in '{}'", path.display())]
    NoPrivateKey { path: PathBuf },

    #[error("TLS configuration error")]
    Rustls(#[from] rustls::Error),
}

/// PEM files for the HTTPS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsAssets {
    /// Certificate chain presented by the server.
    pub cert_file: PathBuf,
    /// Private key matching the leaf certificate.
    pub key_file: PathBuf,
    /// CA that signed the leaf; clients add it to their trust roots.
    pub ca_file: PathBuf,
}

impl TlsAssets {
    pub fn new(
        cert_file: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
        ca_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cert_file: cert_file.into(),
            key_file: key_file.into(),
            ca_file: ca_file.into(),
        }
    }

    /// `cert.pem`, `key.pem` and `ca.pem` inside `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("cert.pem"),
            dir.join("key.pem"),
            dir.join("ca.pem"),
        )
    }

    /// The certificate set shipped in this crate's `assets/tls/` directory.
    pub fn bundled() -> Self {
        Self::from_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/tls"))
    }

    /// Build a rustls server configuration from the certificate and key.
    ///
    /// Uses the `ring` provider explicitly so no process-wide default has to
    /// be installed.
    pub fn load_server_config(&self) -> Result<Arc<ServerConfig>, TlsError> {
        let certs = self.load_certificates()?;
        let key = self.load_private_key()?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(certs, key)?;
        config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        Ok(Arc::new(config))
    }

    fn load_certificates(&self) -> Result<Vec<CertificateDer<'static>>, TlsError> {
        let file = File::open(&self.cert_file).map_err(|source| TlsError::CertificateRead {
            path: self.cert_file.clone(),
            source,
        })?;

        let certs = rustls_pemfile::certs(&mut BufReader::new(file))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TlsError::CertificateRead {
                path: self.cert_file.clone(),
                source,
            })?;

        if certs.is_empty() {
            return Err(TlsError::NoCertificates {
                path: self.cert_file.clone(),
            });
        }
        Ok(certs)
    }

    fn load_private_key(&self) -> Result<PrivateKeyDer<'static>, TlsError> {
        let file = File::open(&self.key_file).map_err(|source| TlsError::KeyRead {
            path: self.key_file.clone(),
            source,
        })?;

        rustls_pemfile::private_key(&mut BufReader::new(file))
            .map_err(|source| TlsError::KeyRead {
                path: self.key_file.clone(),
                source,
            })?
            .ok_or_else(|| TlsError::NoPrivateKey {
                path: self.key_file.clone(),
            })
    }
}

impl Default for TlsAssets {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn bundled_assets_load() {
        let config = TlsAssets::bundled().load_server_config().unwrap();
        assert_eq!(config.alpn_protocols[1], b"http/1.1".to_vec());
    }

    #[test]
    fn missing_certificate_file() {
        let bundled = TlsAssets::bundled();
        let assets = TlsAssets::new("/nonexistent/cert.pem", bundled.key_file, bundled.ca_file);
        let result = assets.load_server_config();
        assert!(matches!(result, Err(TlsError::CertificateRead { .. })));
    }

    #[test]
    fn missing_key_file() {
        let bundled = TlsAssets::bundled();
        let assets = TlsAssets::new(bundled.cert_file, "/nonexistent/key.pem", bundled.ca_file);
        let result = assets.load_server_config();
        assert!(matches!(result, Err(TlsError::KeyRead { .. })));
    }

    #[test]
    fn pem_without_certificates() {
        let mut empty = NamedTempFile::new().unwrap();
        empty.write_all(b"nothing to see here\n").unwrap();

        let bundled = TlsAssets::bundled();
        let assets = TlsAssets::new(empty.path(), bundled.key_file, bundled.ca_file);
        let result = assets.load_server_config();
        assert!(matches!(result, Err(TlsError::NoCertificates { .. })));
    }

    #[test]
    fn pem_without_private_key() {
        let bundled = TlsAssets::bundled();
        // A certificate file holds no private key.
        let assets = TlsAssets::new(
            bundled.cert_file.clone(),
            bundled.cert_file,
            bundled.ca_file,
        );
        let result = assets.load_server_config();
        assert!(matches!(result, Err(TlsError::NoPrivateKey { .. })));
    }
}
