use jsonwebtoken::{encode, Algorithm, Header};

use crate::claims::ClaimSet;
use crate::error::ForgeError;
use crate::keys::{KeyMaterial, KEY_ID};

/// RS256 header bound to the published key.
pub fn header() -> Header {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.to_string());
    header
}

/// Sign a claim set into a compact JWT.
///
/// RS256 (PKCS#1 v1.5) has no random salt, so the same claims and keys
/// always give the same token.
pub fn sign(claims: &ClaimSet, keys: &KeyMaterial) -> Result<String, ForgeError> {
    let encoding_key = keys.encoding_key()?;
    encode(&header(), &claims.payload(), &encoding_key).map_err(ForgeError::signing)
}
