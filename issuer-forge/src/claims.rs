use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::error::ForgeError;

/// Registered claim names. These are only settable through their dedicated
/// setters, never through the generic claim setters.
pub const REGISTERED_CLAIMS: [&str; 7] = ["iss", "aud", "sub", "jti", "exp", "iat", "nbf"];

/// Returns `true` if `name` is a registered claim name.
pub fn is_registered(name: &str) -> bool {
    REGISTERED_CLAIMS.contains(&name)
}

/// A JWT numeric date: whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NumericDate(i64);

impl NumericDate {
    /// Convert an instant, dropping any sub-second component.
    pub fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.timestamp())
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

/// Value of a custom (non-registered) claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Single(String),
    Array(Vec<String>),
}

/// The accumulated claims of a token, before signing.
///
/// Every optional registered claim is absent until set. Custom claims share
/// one map keyed by name, so a name can never be emitted twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    issuer: String,
    audience: Vec<String>,
    subject: Option<String>,
    jwt_id: Option<String>,
    expires_at: Option<NumericDate>,
    issued_at: Option<NumericDate>,
    not_before: Option<NumericDate>,
    custom: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: Vec::new(),
            subject: None,
            jwt_id: None,
            expires_at: None,
            issued_at: None,
            not_before: None,
            custom: BTreeMap::new(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.jwt_id.as_deref()
    }

    pub fn expires_at(&self) -> Option<NumericDate> {
        self.expires_at
    }

    pub fn issued_at(&self) -> Option<NumericDate> {
        self.issued_at
    }

    pub fn not_before(&self) -> Option<NumericDate> {
        self.not_before
    }

    /// Returns a custom claim by name.
    pub fn custom(&self, name: &str) -> Option<&ClaimValue> {
        self.custom.get(name)
    }

    /// Number of claims the signed payload will carry.
    pub fn len(&self) -> usize {
        let optional = [
            !self.audience.is_empty(),
            self.subject.is_some(),
            self.jwt_id.is_some(),
            self.expires_at.is_some(),
            self.issued_at.is_some(),
            self.not_before.is_some(),
        ];
        1 + optional.iter().filter(|set| **set).count() + self.custom.len()
    }

    /// Always `false`: `iss` is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub(crate) fn set_audience(&mut self, audience: Vec<String>) {
        self.audience = audience;
    }

    pub(crate) fn set_subject(&mut self, subject: String) {
        self.subject = Some(subject);
    }

    pub(crate) fn set_jwt_id(&mut self, jwt_id: String) {
        self.jwt_id = Some(jwt_id);
    }

    pub(crate) fn set_expires_at(&mut self, at: NumericDate) {
        self.expires_at = Some(at);
    }

    pub(crate) fn set_issued_at(&mut self, at: NumericDate) {
        self.issued_at = Some(at);
    }

    pub(crate) fn set_not_before(&mut self, at: NumericDate) {
        self.not_before = Some(at);
    }

    /// Insert or overwrite a custom claim. Rejects registered names without
    /// touching the set.
    pub(crate) fn set_custom(&mut self, name: String, value: ClaimValue) -> Result<(), ForgeError> {
        if is_registered(&name) {
            return Err(ForgeError::InvalidClaimName { name });
        }
        self.custom.insert(name, value);
        Ok(())
    }

    /// Borrowed view serialized as the JWT payload.
    pub fn payload(&self) -> Payload<'_> {
        Payload {
            iss: &self.issuer,
            aud: Audience(&self.audience),
            sub: self.subject.as_deref(),
            jti: self.jwt_id.as_deref(),
            exp: self.expires_at,
            iat: self.issued_at,
            nbf: self.not_before,
            custom: &self.custom,
        }
    }
}

/// JWT payload as it goes on the wire.
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    iss: &'a str,
    #[serde(skip_serializing_if = "Audience::is_empty")]
    aud: Audience<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<NumericDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<NumericDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<NumericDate>,
    #[serde(flatten)]
    custom: &'a BTreeMap<String, ClaimValue>,
}

/// `aud` is a plain string for a single audience and an array otherwise.
#[derive(Debug)]
struct Audience<'a>(&'a [String]);

impl Audience<'_> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Audience<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            [single] => serializer.serialize_str(single),
            many => {
                let mut seq = serializer.serialize_seq(Some(many.len()))?;
                for aud in many {
                    seq.serialize_element(aud)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn to_json(claims: &ClaimSet) -> serde_json::Value {
        serde_json::to_value(claims.payload()).unwrap()
    }

    #[test]
    fn fresh_set_only_carries_issuer() {
        let claims = ClaimSet::new("http://localhost:8080/default");
        assert_eq!(
            to_json(&claims),
            json!({ "iss": "http://localhost:8080/default" })
        );
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn single_audience_is_a_string() {
        let mut claims = ClaimSet::new("iss");
        claims.set_audience(vec!["api".into()]);
        assert_eq!(to_json(&claims)["aud"], json!("api"));
    }

    #[test]
    fn several_audiences_are_an_array() {
        let mut claims = ClaimSet::new("iss");
        claims.set_audience(vec!["api".into(), "api".into(), "web".into()]);
        assert_eq!(to_json(&claims)["aud"], json!(["api", "api", "web"]));
    }

    #[test]
    fn cleared_audience_is_omitted() {
        let mut claims = ClaimSet::new("iss");
        claims.set_audience(vec!["api".into()]);
        claims.set_audience(Vec::new());
        assert!(to_json(&claims).get("aud").is_none());
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn registered_names_are_rejected() {
        let mut claims = ClaimSet::new("iss");
        for name in REGISTERED_CLAIMS {
            let err = claims
                .set_custom(name.to_string(), ClaimValue::Single("x".into()))
                .unwrap_err();
            assert!(matches!(err, ForgeError::InvalidClaimName { name: n } if n == name));
        }
        assert_eq!(claims, ClaimSet::new("iss"));
    }

    #[test]
    fn custom_claim_overwrites_across_kinds() {
        let mut claims = ClaimSet::new("iss");
        claims
            .set_custom("scp".into(), ClaimValue::Array(vec!["a".into(), "b".into()]))
            .unwrap();
        claims
            .set_custom("scp".into(), ClaimValue::Single("c".into()))
            .unwrap();
        assert_eq!(to_json(&claims)["scp"], json!("c"));
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn numeric_dates_drop_sub_seconds() {
        let instant = Utc.timestamp_opt(1_700_000_000, 999_999_999).unwrap();
        assert_eq!(
            NumericDate::from_datetime(&instant).as_secs(),
            1_700_000_000
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = instant.with_timezone(&offset);
        assert_eq!(NumericDate::from_datetime(&local).as_secs(), 1_700_000_000);
    }

    #[test]
    fn count_follows_set_fields() {
        let mut claims = ClaimSet::new("iss");
        claims.set_subject("subject".into());
        claims.set_jwt_id("jti".into());
        claims.set_expires_at(NumericDate::from_secs(10));
        claims.set_issued_at(NumericDate::from_secs(5));
        claims.set_not_before(NumericDate::from_secs(5));
        claims
            .set_custom("cid".into(), ClaimValue::Single("client".into()))
            .unwrap();

        let json = to_json(&claims);
        assert_eq!(json.as_object().unwrap().len(), claims.len());
        assert_eq!(claims.len(), 7);
        assert_eq!(json["exp"], json!(10));
    }
}
