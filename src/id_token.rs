//! Decoding of the ID token returned by the token endpoint.
//!
//! An ID token is a three-segment `header.claims.signature` compact token.
//! Only the middle segment is of interest here: it is Base64URL-decoded and
//! parsed as a JSON object of claims. No fixed claims schema is enforced;
//! callers interpret `sub`, `email` and friends themselves.
//!
//! # Caution
//! The signature segment is **not verified**. The decoded claims are only as
//! trustworthy as the TLS channel the token arrived on, and must not be
//! forwarded to other components as proven.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// Claims decoded from an ID token payload, or returned by the userinfo
/// endpoint. An arbitrary JSON object.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// An encoded ID token, as handed out by the token endpoint.
/// Must be decoded before its claims can be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdToken(pub(crate) String);

impl IdToken {
    /// Returns the raw compact token as a string reference.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Decodes the claims segment of the token.
    ///
    /// Splits the token on `.`, requires exactly three segments, and parses
    /// the Base64URL-decoded middle segment as a JSON object. Both a wrong
    /// segment count and an undecodable payload fail with
    /// [`Error::MalformedToken`].
    pub fn decode(&self) -> Result<Claims, Error> {
        let segments: Vec<_> = self.0.split('.').collect();
        if segments.len() != 3 {
            return Err(Error::MalformedToken);
        }
        // Providers emit unpadded Base64URL; tolerate padded input anyway.
        let payload = segments[1].trim_end_matches('=');
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
            error!("Failed to decode id_token payload: {}", e);
            Error::MalformedToken
        })?;

        serde_json::from_slice::<Claims>(&bytes).map_err(|e| {
            error!("Failed to deserialize id_token payload: {}", e);
            Error::MalformedToken
        })
    }
}

impl From<String> for IdToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}
