use std::collections::HashMap;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::discovery::fetch_json;
use crate::error::VerifyError;

/// Raw JWK as published by the issuer. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

/// A token that passed verification.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub header: Header,
    pub claims: serde_json::Value,
}

/// Verifies RS256 tokens against the keys an issuer publishes.
///
/// Keys are fetched once, indexed by `kid`. The issuer is always checked;
/// audience is checked only when configured, and `exp` when present.
///
/// ```ignore
/// let verifier = JwksVerifier::fetch(&client, &issuer.url()).await?;
/// let token = verifier.verify(&forged)?;
/// assert_eq!(token.claims["sub"], "subject");
/// ```
pub struct JwksVerifier {
    issuer: String,
    keys: HashMap<String, DecodingKey>,
    audience: Option<Vec<String>>,
    validate_exp: bool,
}

impl JwksVerifier {
    /// Download `{issuer_url}/.well-known/jwks.json` and keep its RSA keys.
    pub async fn fetch(client: &Client, issuer_url: &str) -> Result<Self, VerifyError> {
        let issuer = issuer_url.trim_end_matches('/').to_string();
        let jwks_url = format!("{issuer}/.well-known/jwks.json");
        let jwks: JwksDocument = fetch_json(client, &jwks_url).await?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let Some(kid) = jwk.kid else {
                debug!(kty = %jwk.kty, "Skipping JWK without kid");
                continue;
            };
            if jwk.kty != "RSA" {
                debug!(%kid, kty = %jwk.kty, "Skipping non-RSA JWK");
                continue;
            }
            let n = jwk.n.unwrap_or_default();
            let e = jwk.e.unwrap_or_default();
            let key = DecodingKey::from_rsa_components(&n, &e)
                .map_err(|source| VerifyError::InvalidKey {
                    kid: kid.clone(),
                    source,
                })?;
            keys.insert(kid, key);
        }

        debug!(%jwks_url, keys = keys.len(), "JWKS loaded");
        Ok(Self {
            issuer,
            keys,
            audience: None,
            validate_exp: true,
        })
    }

    /// Require `aud` to contain one of `audience`.
    pub fn with_audience<I, S>(mut self, audience: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audience = Some(audience.into_iter().map(Into::into).collect());
        self
    }

    /// Whether an `exp` in the past fails verification (default `true`).
    pub fn validate_exp(mut self, validate: bool) -> Self {
        self.validate_exp = validate;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Key ids the issuer published.
    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Check the signature and `iss` of `token`, returning its header and claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        let header = decode_header(token).map_err(VerifyError::InvalidToken)?;
        let kid = header.kid.as_deref().ok_or(VerifyError::MissingKeyId)?;
        let key = self
            .keys
            .get(kid)
            .ok_or_else(|| VerifyError::UnknownKeyId(kid.to_string()))?;

        let data = decode::<serde_json::Value>(token, key, &self.validation()).map_err(|e| {
            warn!(error = %e, "Token verification failed");
            VerifyError::InvalidToken(e)
        })?;

        Ok(VerifiedToken {
            header,
            claims: data.claims,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("iss".into());
        validation.validate_exp = self.validate_exp;
        match &self.audience {
            Some(audience) => validation.set_audience(audience),
            None => validation.validate_aud = false,
        }
        validation
    }
}
