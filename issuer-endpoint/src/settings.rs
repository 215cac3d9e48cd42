//! Settings for the `issuer-endpoint` binary.
//!
//! Resolution order (lowest to highest priority):
//! 1. built-in defaults (`default` issuer, plain HTTP, ephemeral ports)
//! 2. a YAML file, when one is given
//! 3. `.env` (loaded into the process environment, never overwriting)
//! 4. `ISSUER_*` environment variables
//!
//! Command-line flags are applied on top by the binary.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use issuer_forge::KeyPaths;
use serde::Deserialize;

use crate::config::{bundled_public_dir, IssuerConfig};
use crate::error::EndpointError;
use crate::identity::DEFAULT_NAME;
use crate::tls::TlsAssets;

/// Endpoint settings as read from YAML and the environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssuerSettings {
    pub name: String,
    pub secured: bool,
    pub host: String,
    pub bind_address: IpAddr,
    pub http_port: u16,
    pub https_port: u16,
    /// Directory holding `key.der` and `key-pub.der`.
    pub keys_dir: Option<PathBuf>,
    /// Directory holding `cert.pem`, `key.pem` and `ca.pem`.
    pub tls_dir: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
}

impl Default for IssuerSettings {
    fn default() -> Self {
        let config = IssuerConfig::with_defaults();
        Self {
            name: DEFAULT_NAME.into(),
            secured: false,
            host: config.host,
            bind_address: config.bind_address,
            http_port: 0,
            https_port: 0,
            keys_dir: None,
            tls_dir: None,
            public_dir: None,
        }
    }
}

impl IssuerSettings {
    /// Load defaults, the optional YAML file, `.env`, then `ISSUER_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, EndpointError> {
        let mut settings = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        // `.env` is optional; existing variables win.
        let _ = dotenvy::dotenv();

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, EndpointError> {
        let content = std::fs::read_to_string(path).map_err(|source| EndpointError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| EndpointError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Overlay `ISSUER_*` variables read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), EndpointError> {
        if let Some(name) = lookup("ISSUER_NAME") {
            self.name = name;
        }
        if let Some(host) = lookup("ISSUER_HOST") {
            self.host = host;
        }
        if let Some(value) = lookup("ISSUER_SECURED") {
            self.secured = parse("ISSUER_SECURED", &value)?;
        }
        if let Some(value) = lookup("ISSUER_BIND_ADDRESS") {
            self.bind_address = parse("ISSUER_BIND_ADDRESS", &value)?;
        }
        if let Some(value) = lookup("ISSUER_HTTP_PORT") {
            self.http_port = parse("ISSUER_HTTP_PORT", &value)?;
        }
        if let Some(value) = lookup("ISSUER_HTTPS_PORT") {
            self.https_port = parse("ISSUER_HTTPS_PORT", &value)?;
        }
        if let Some(dir) = lookup("ISSUER_KEYS_DIR") {
            self.keys_dir = Some(dir.into());
        }
        if let Some(dir) = lookup("ISSUER_TLS_DIR") {
            self.tls_dir = Some(dir.into());
        }
        if let Some(dir) = lookup("ISSUER_PUBLIC_DIR") {
            self.public_dir = Some(dir.into());
        }
        Ok(())
    }

    pub fn into_config(self) -> IssuerConfig {
        let keys = self
            .keys_dir
            .map(|dir| KeyPaths::new(dir.join("key.der"), dir.join("key-pub.der")))
            .unwrap_or_else(KeyPaths::bundled);
        let tls = self
            .tls_dir
            .map(|dir| TlsAssets::from_dir(&dir))
            .unwrap_or_else(TlsAssets::bundled);

        IssuerConfig::new(self.name, self.secured)
            .host(self.host)
            .bind_address(self.bind_address)
            .http_port(self.http_port)
            .https_port(self.https_port)
            .keys(keys)
            .tls(tls)
            .public_dir(self.public_dir.unwrap_or_else(bundled_public_dir))
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, EndpointError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| EndpointError::Setting {
            key: key.to_string(),
            message: format!("'{value}': {e}"),
        })
}
