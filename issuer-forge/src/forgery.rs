use chrono::{DateTime, TimeZone};
use tracing::debug;

use crate::claims::{ClaimSet, ClaimValue, NumericDate};
use crate::error::ForgeError;
use crate::keys::{KeyMaterial, KeyPaths, KEY_ID};
use crate::token;

/// Builder that accumulates claims and forges RS256 tokens signed with the
/// issuer's key pair.
///
/// `forge` does not consume the builder: it can be mutated and forged again,
/// and each token reflects the state at the time of the call.
///
/// ```ignore
/// let mut forgery = TokenForgery::new(issuer.url());
/// let token = forgery
///     .with_audience(["audience"])
///     .with_subject("subject")
///     .with_array_claim("scp", ["scope::1", "scope::2"])?
///     .with_claim("cid", "client_id")?
///     .forge()?;
/// ```
#[derive(Debug, Clone)]
pub struct TokenForgery {
    claims: ClaimSet,
    key_paths: KeyPaths,
}

impl TokenForgery {
    /// Start a token for `issuer`. Nothing is read from disk until `forge`.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            claims: ClaimSet::new(issuer),
            key_paths: KeyPaths::bundled(),
        }
    }

    /// Read the key pair from somewhere other than the bundled fixture.
    pub fn with_key_paths(&mut self, key_paths: KeyPaths) -> &mut Self {
        self.key_paths = key_paths;
        self
    }

    /// Replace the audience list. An empty list removes `aud`.
    pub fn with_audience<I, S>(&mut self, audience: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claims.set_audience(audience.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.claims.set_subject(subject.into());
        self
    }

    pub fn with_jwt_id(&mut self, jwt_id: impl Into<String>) -> &mut Self {
        self.claims.set_jwt_id(jwt_id.into());
        self
    }

    /// Set or overwrite a single-valued custom claim.
    ///
    /// # Errors
    ///
    /// [`ForgeError::InvalidClaimName`] if `name` is a registered claim; the
    /// builder is left unchanged.
    pub fn with_claim(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ForgeError> {
        self.claims.set_custom(name.into(), ClaimValue::Single(value.into()))?;
        Ok(self)
    }

    /// Set or overwrite a multi-valued custom claim. Values from earlier calls
    /// with the same name are discarded, not merged.
    ///
    /// # Errors
    ///
    /// [`ForgeError::InvalidClaimName`] if `name` is a registered claim.
    pub fn with_array_claim<I, S>(
        &mut self,
        name: impl Into<String>,
        values: I,
    ) -> Result<&mut Self, ForgeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.claims.set_custom(name.into(), ClaimValue::Array(values))?;
        Ok(self)
    }

    /// Set `exp`, truncated to the second.
    pub fn expires_at<Tz: TimeZone>(&mut self, instant: DateTime<Tz>) -> &mut Self {
        self.claims.set_expires_at(NumericDate::from_datetime(&instant));
        self
    }

    /// Set `iat`, truncated to the second.
    pub fn issued_at<Tz: TimeZone>(&mut self, instant: DateTime<Tz>) -> &mut Self {
        self.claims.set_issued_at(NumericDate::from_datetime(&instant));
        self
    }

    /// Set `nbf`, truncated to the second.
    pub fn not_before<Tz: TimeZone>(&mut self, instant: DateTime<Tz>) -> &mut Self {
        self.claims.set_not_before(NumericDate::from_datetime(&instant));
        self
    }

    pub fn issuer(&self) -> &str {
        self.claims.issuer()
    }

    pub fn audience(&self) -> &[String] {
        self.claims.audience()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.claims.jwt_id()
    }

    /// Returns a single-valued custom claim.
    pub fn claim(&self, name: &str) -> Option<&str> {
        match self.claims.custom(name)? {
            ClaimValue::Single(value) => Some(value),
            ClaimValue::Array(_) => None,
        }
    }

    /// Returns a multi-valued custom claim.
    pub fn array_claim(&self, name: &str) -> Option<&[String]> {
        match self.claims.custom(name)? {
            ClaimValue::Array(values) => Some(values),
            ClaimValue::Single(_) => None,
        }
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn key_paths(&self) -> &KeyPaths {
        &self.key_paths
    }

    /// Load the key pair and sign the current claims into a compact JWT.
    ///
    /// # Errors
    ///
    /// [`ForgeError::KeyLoad`] if a key asset is missing or malformed,
    /// [`ForgeError::Signing`] if the RS256 signature cannot be produced.
    pub fn forge(&self) -> Result<String, ForgeError> {
        let keys = KeyMaterial::load(&self.key_paths)?;
        let token = token::sign(&self.claims, &keys)?;
        debug!(
            issuer = %self.claims.issuer(),
            kid = KEY_ID,
            claims = self.claims.len(),
            "Forged token"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const ISSUER: &str = "http://localhost:8080/default";

    #[test]
    fn new_forgery_only_sets_issuer() {
        let forgery = TokenForgery::new(ISSUER);
        assert_eq!(forgery.issuer(), ISSUER);
        assert!(forgery.audience().is_empty());
        assert_eq!(forgery.subject(), None);
        assert_eq!(forgery.claims().len(), 1);
        assert_eq!(forgery.key_paths(), &KeyPaths::bundled());
    }

    #[test]
    fn audience_is_replaced_not_appended() {
        let mut forgery = TokenForgery::new(ISSUER);
        forgery.with_audience(["a", "b"]).with_audience(["c"]);
        assert_eq!(forgery.audience(), ["c".to_string()]);

        forgery.with_audience(Vec::<String>::new());
        assert!(forgery.audience().is_empty());
    }

    #[test]
    fn reserved_claim_leaves_issuer_untouched() {
        let mut forgery = TokenForgery::new(ISSUER);
        let err = forgery.with_claim("iss", "x").err().unwrap();
        assert!(matches!(err, ForgeError::InvalidClaimName { ref name } if name == "iss"));
        assert_eq!(forgery.issuer(), ISSUER);

        assert!(forgery.with_array_claim("aud", ["x"]).is_err());
        assert!(forgery.audience().is_empty());
    }

    #[test]
    fn array_claim_last_write_wins() {
        let mut forgery = TokenForgery::new(ISSUER);
        forgery
            .with_array_claim("scp", ["a", "b"])
            .unwrap()
            .with_array_claim("scp", ["c"])
            .unwrap();
        assert_eq!(forgery.array_claim("scp"), Some(&["c".to_string()][..]));
    }

    #[test]
    fn switching_claim_kind_replaces_value() {
        let mut forgery = TokenForgery::new(ISSUER);
        forgery
            .with_array_claim("cid", ["a"])
            .unwrap()
            .with_claim("cid", "client_id")
            .unwrap();
        assert_eq!(forgery.claim("cid"), Some("client_id"));
        assert_eq!(forgery.array_claim("cid"), None);
        assert_eq!(forgery.claims().len(), 2);
    }

    #[test]
    fn timestamps_are_whole_seconds() {
        let now = Utc::now();
        let mut forgery = TokenForgery::new(ISSUER);
        forgery
            .expires_at(now + Duration::minutes(5))
            .issued_at(now)
            .not_before(now);

        let claims = forgery.claims();
        assert_eq!(claims.issued_at().unwrap().as_secs(), now.timestamp());
        assert_eq!(claims.not_before().unwrap().as_secs(), now.timestamp());
        assert_eq!(
            claims.expires_at().unwrap().as_secs(),
            now.timestamp() + 300
        );
    }

    #[test]
    fn forge_reflects_later_mutation() {
        let mut forgery = TokenForgery::new(ISSUER);
        let first = forgery.forge().unwrap();
        forgery.with_subject("subject");
        let second = forgery.forge().unwrap();
        assert_ne!(first, second);
        assert_eq!(forgery.forge().unwrap(), second);
    }

    #[test]
    fn forge_fails_on_missing_keys() {
        let mut forgery = TokenForgery::new(ISSUER);
        let paths = KeyPaths::new("/nonexistent/key.der", "/nonexistent/key-pub.der");
        forgery.with_key_paths(paths);
        assert!(matches!(forgery.forge(), Err(ForgeError::KeyLoad { .. })));
    }
}
