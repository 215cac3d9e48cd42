use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::EncodingKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{ForgeError, SigningCause};

/// Key ID placed in every forged token header and in the published JWKS.
pub const KEY_ID: &str = "test";

/// Locations of the DER-encoded key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPaths {
    /// PKCS#8 private key.
    pub private_key: PathBuf,
    /// X.509 SubjectPublicKeyInfo public key.
    pub public_key: PathBuf,
}

impl KeyPaths {
    pub fn new(private_key: impl Into<PathBuf>, public_key: impl Into<PathBuf>) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: public_key.into(),
        }
    }

    /// The fixture pair shipped in this crate's `keys/` directory. The issuer
    /// endpoint publishes the public half of this pair.
    pub fn bundled() -> Self {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("keys");
        Self::new(dir.join("key.der"), dir.join("key-pub.der"))
    }
}

impl Default for KeyPaths {
    fn default() -> Self {
        Self::bundled()
    }
}

/// RSA key pair read from disk.
pub struct KeyMaterial {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyMaterial {
    /// Read and parse both halves of the pair. No caching: every call hits the
    /// file system.
    pub fn load(paths: &KeyPaths) -> Result<Self, ForgeError> {
        let private_der = read(&paths.private_key)?;
        let private_key = RsaPrivateKey::from_pkcs8_der(&private_der)
            .map_err(|e| ForgeError::key_load(&paths.private_key, e))?;

        let public_der = read(&paths.public_key)?;
        let public_key = RsaPublicKey::from_public_key_der(&public_der)
            .map_err(|e| ForgeError::key_load(&paths.public_key, e))?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Load only the public half, as the issuer endpoint does for its JWKS.
    pub fn load_public(paths: &KeyPaths) -> Result<RsaPublicKey, ForgeError> {
        let public_der = read(&paths.public_key)?;
        RsaPublicKey::from_public_key_der(&public_der)
            .map_err(|e| ForgeError::key_load(&paths.public_key, e))
    }

    /// Encoding key for RS256 signing.
    ///
    /// Fails if the public key does not belong to the private key, so a token
    /// that the published JWKS could not verify is never produced.
    pub fn encoding_key(&self) -> Result<EncodingKey, ForgeError> {
        if RsaPublicKey::from(&self.private_key) != self.public_key {
            return Err(ForgeError::signing(SigningCause::KeyMismatch));
        }

        let pkcs8_pem = self
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| ForgeError::signing(SigningCause::Encoding(e)))?;
        EncodingKey::from_rsa_pem(pkcs8_pem.as_bytes()).map_err(ForgeError::signing)
    }
}

/// Base64url-encoded RSA public components, as published in a JWK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwkComponents {
    /// Modulus.
    pub n: String,
    /// Public exponent.
    pub e: String,
}

impl JwkComponents {
    pub fn from_public_key(key: &RsaPublicKey) -> Self {
        Self {
            n: URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ForgeError> {
    std::fs::read(path).map_err(|e| ForgeError::key_load(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyLoadCause;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn bundled_pair_loads() {
        let keys = KeyMaterial::load(&KeyPaths::bundled()).unwrap();
        assert!(keys.encoding_key().is_ok());
    }

    #[test]
    fn bundled_exponent_is_65537() {
        let public = KeyMaterial::load_public(&KeyPaths::bundled()).unwrap();
        let components = JwkComponents::from_public_key(&public);
        assert_eq!(components.e, "AQAB");
        // 2048-bit modulus, base64url without padding.
        assert_eq!(components.n.len(), 342);
    }

    #[test]
    fn missing_private_key_is_a_load_error() {
        let paths = KeyPaths::new("/nonexistent/key.der", KeyPaths::bundled().public_key);
        let err = KeyMaterial::load(&paths).err().unwrap();
        match err {
            ForgeError::KeyLoad { path, source } => {
                assert_eq!(path, PathBuf::from("/nonexistent/key.der"));
                assert!(matches!(source, KeyLoadCause::Io(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_private_key_is_a_load_error() {
        let paths = KeyPaths::new(fixture("garbage.der"), KeyPaths::bundled().public_key);
        let err = KeyMaterial::load(&paths).err().unwrap();
        assert!(matches!(
            err,
            ForgeError::KeyLoad {
                source: KeyLoadCause::PrivateKey(_),
                ..
            }
        ));
    }

    #[test]
    fn garbage_public_key_is_a_load_error() {
        let paths = KeyPaths::new(KeyPaths::bundled().private_key, fixture("garbage.der"));
        let err = KeyMaterial::load(&paths).err().unwrap();
        assert!(matches!(
            err,
            ForgeError::KeyLoad {
                source: KeyLoadCause::PublicKey(_),
                ..
            }
        ));
    }

    #[test]
    fn mismatched_pair_cannot_sign() {
        let paths = KeyPaths::new(KeyPaths::bundled().private_key, fixture("other-pub.der"));
        let keys = KeyMaterial::load(&paths).unwrap();
        let err = keys.encoding_key().err().unwrap();
        assert!(matches!(
            err,
            ForgeError::Signing {
                source: SigningCause::KeyMismatch
            }
        ));
    }
}
