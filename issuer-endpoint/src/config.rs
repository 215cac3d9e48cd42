use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use issuer_forge::KeyPaths;

use crate::identity::DEFAULT_NAME;
use crate::tls::TlsAssets;

/// Configuration for an in-process issuer endpoint.
#[derive(Clone, Debug)]
pub struct IssuerConfig {
    /// Path segment the issuer is served under (`/{name}`).
    pub name: String,
    /// Whether the issuer URL uses the HTTPS listener.
    pub secured: bool,
    /// Host clients use to reach the endpoint, as it appears in the issuer URL.
    pub host: String,
    /// Local address both listeners bind to.
    pub bind_address: IpAddr,
    /// Port of the plain HTTP listener (`0` picks a free port).
    pub http_port: u16,
    /// Port of the HTTPS listener (`0` picks a free port).
    pub https_port: u16,
    /// Key pair whose public half is published in the JWKS.
    pub keys: KeyPaths,
    /// Certificate and key for the HTTPS listener.
    pub tls: TlsAssets,
    /// Static content served under the issuer path.
    pub public_dir: PathBuf,
}

impl IssuerConfig {
    /// An issuer named `name`, on ephemeral ports, with the bundled assets.
    pub fn new(name: impl Into<String>, secured: bool) -> Self {
        Self {
            name: name.into(),
            secured,
            host: "localhost".into(),
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: 0,
            https_port: 0,
            keys: KeyPaths::bundled(),
            tls: TlsAssets::bundled(),
            public_dir: bundled_public_dir(),
        }
    }

    /// Issuer `default`, announced over plain HTTP.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_NAME, false)
    }

    /// Issuer `default`, announced over HTTPS.
    pub fn secured_defaults() -> Self {
        Self::new(DEFAULT_NAME, true)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn https_port(mut self, port: u16) -> Self {
        self.https_port = port;
        self
    }

    pub fn keys(mut self, keys: KeyPaths) -> Self {
        self.keys = keys;
        self
    }

    pub fn tls(mut self, tls: TlsAssets) -> Self {
        self.tls = tls;
        self
    }

    pub fn public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The static content shipped in this crate's `assets/public/` directory.
pub fn bundled_public_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/public")
}
