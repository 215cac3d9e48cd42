use issuer_forge::{JwkComponents, KeyMaterial, KeyPaths, KEY_ID};
use serde::Serialize;

use crate::error::EndpointError;

/// JWKS response body.
#[derive(Debug, Clone, Serialize)]
pub struct JwksResponse {
    pub keys: Vec<JwkEntry>,
}

/// A single JWK entry in a JWKS response.
#[derive(Debug, Clone, Serialize)]
pub struct JwkEntry {
    pub kty: &'static str,
    pub alg: &'static str,
    #[serde(rename = "use")]
    pub r#use: &'static str,
    pub kid: &'static str,
    pub n: String,
    pub e: String,
}

impl JwksResponse {
    /// Publish the public half of the key pair the forge signs with.
    pub fn load(paths: &KeyPaths) -> Result<Self, EndpointError> {
        let public_key = KeyMaterial::load_public(paths)?;
        let JwkComponents { n, e } = JwkComponents::from_public_key(&public_key);
        Ok(Self {
            keys: vec![JwkEntry {
                kty: "RSA",
                alg: "RS256",
                r#use: "sig",
                kid: KEY_ID,
                n,
                e,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_key_is_published_once() {
        let jwks = JwksResponse::load(&KeyPaths::bundled()).unwrap();
        let json = serde_json::to_value(&jwks).unwrap();

        let keys = json["keys"].as_array().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0]["kty"], "RSA");
        assert_eq!(keys[0]["e"], "AQAB");
        assert_eq!(keys[0]["alg"], "RS256");
        assert_eq!(keys[0]["kid"], "test");
        assert_eq!(keys[0]["use"], "sig");
        assert!(!keys[0]["n"].as_str().unwrap().is_empty());
    }

    #[test]
    fn missing_public_key_fails() {
        let paths = KeyPaths::new("/nonexistent/key.der", "/nonexistent/key-pub.der");
        assert!(matches!(
            JwksResponse::load(&paths),
            Err(EndpointError::Keys(_))
        ));
    }
}
