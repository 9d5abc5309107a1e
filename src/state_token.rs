//! Provides structures for the anti-CSRF `state` parameter of the flow.
use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::{TryRngCore, rngs::OsRng};
use tracing::error;

use crate::error::Error;

/// A randomly generated state token created using `OsRng` and Base64URL-encoded.
///
/// The token is sent as the `state` query parameter of the authorization
/// request and echoed back by the provider on the callback. Comparing the two
/// ties the callback to the browser session that started the flow.
///
/// The host is responsible for storing the generated value (cookie-keyed
/// store, session, ...) until the callback arrives.
///
/// # Example
/// ```rust,no_run
/// use openid_connect_client::state_token::StateToken;
///
/// let state = StateToken::new().expect("Failed to generate state token");
/// println!("state: {}", state.value());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateToken(pub(crate) String);

impl StateToken {
    /// Generates a new state token using a secure random generator.
    /// - Uses `OsRng` for cryptographic security.
    /// - Encodes the random bytes in Base64URL format.
    /// - Returns an `Error::GenState` if the random generation fails.
    pub fn new() -> Result<Self, Error> {
        let mut key = [0u8; 32];
        OsRng.try_fill_bytes(&mut key).map_err(|e| {
            error!("Failed to generate state token: {:?}", e);
            Error::GenState
        })?;
        Ok(Self(URL_SAFE.encode(key)))
    }

    /// Returns the state token as a string reference.
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// A state value received back from the provider's callback.
///
/// This value **has not been verified yet** and must be checked against the
/// stored [`StateToken`] before the accompanying code is used.
#[derive(Debug, Clone)]
pub struct UnverifiedState(pub(crate) String);

impl From<String> for UnverifiedState {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use super::StateToken;

    #[test]
    fn test_state_token_new() {
        let state = StateToken::new();
        assert!(!state.clone().unwrap().0.is_empty());
    }

    #[test]
    fn test_state_token_unique() {
        let a = StateToken::new().unwrap();
        let b = StateToken::new().unwrap();
        assert_ne!(a, b);
    }
}
