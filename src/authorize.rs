//! Building the authorization request and handling the provider callback.
//!
//! It provides the following key functionalities:
//! - Generating the authorization request URL (`AuthorizeRequest`).
//! - Parsing and verifying the code returned on the provider's callback
//!   (`CallbackParams`).
//!
//! # Flow
//! 1. Generate a state token ([`StateToken`](crate::state_token::StateToken))
//!    and store it host-side.
//! 2. Redirect the user to the URL built by `AuthorizeRequest`.
//! 3. After login, the provider redirects back with `code` and `state`
//!    query parameters (`CallbackParams`).
//! 4. Verify the echoed state with [`CallbackParams::verify`]; on success a
//!    [`Code`] is obtained, ready for the token exchange.
//!
//! # Notes
//! - Always verify the state before using the code.
//! - Hosts that run their own state verification can build a `Code` directly
//!   via `From<String>`.

use serde_json::{Map, Value};
use tracing::error;
use url::Url;

use crate::{
    config::ClientSettings,
    error::Error,
    query::http_build_query,
    state_token::{StateToken, UnverifiedState},
};
use std::collections::HashMap;

/// Represents the value of the `code` query parameter sent by the provider
/// on its callback.
///
/// A `Code` is normally obtained by verifying a [`CallbackParams`] against
/// the stored state token; it is the input to
/// [`OidcClient::retrieve_tokens`](crate::client::OidcClient::retrieve_tokens).
#[derive(Debug, Clone, PartialEq)]
pub struct Code(pub(crate) String);

impl Code {
    /// Checks that the state echoed by the provider matches the stored state
    /// token. If valid, returns the callback's `Code`; otherwise, returns
    /// `Error::StateMismatch`.
    pub fn new_with_verify_state(params: CallbackParams, state_val: &str) -> Result<Self, Error> {
        if params.state.0 == state_val {
            Ok(params.code)
        } else {
            Err(Error::StateMismatch)
        }
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generates the URL the user agent is redirected to for login.
///
/// The query string carries `client_id`, `response_type=code`, `scope`,
/// `redirect_uri` and `state`, encoded with
/// [`http_build_query`](crate::query::http_build_query).
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    auth_endpoint: String,
    client_id: String,
    response_type: String,
    scope: String,
    redirect_uri: String,
    state: StateToken,
}

impl AuthorizeRequest {
    /// # **Parameters**
    ///
    /// - `auth_endpoint`: The provider's authorization endpoint URL.
    ///
    /// - `settings` (`&ClientSettings`):
    ///   - Supplies the `client_id` sent with the request.
    ///
    /// - `scope` (`&str`):
    ///   - Space-separated scope values; must include `openid`.
    ///
    /// - `redirect_uri` (`&str`):
    ///   - The absolute callback URL registered with the provider. Must be
    ///     byte-identical to the one later sent in the token exchange.
    ///
    /// - `state` (`&StateToken`):
    ///   - The anti-CSRF token tied to this authorization attempt.
    pub fn new(
        auth_endpoint: &str,
        settings: &ClientSettings,
        scope: &str,
        redirect_uri: &str,
        state: &StateToken,
    ) -> Self {
        Self {
            auth_endpoint: auth_endpoint.to_string(),
            client_id: settings.client_id().to_string(),
            response_type: "code".to_string(),
            scope: scope.to_string(),
            redirect_uri: redirect_uri.to_string(),
            state: state.to_owned(),
        }
    }

    /// Constructs the redirect URL with the required query parameters.
    pub fn into_url(&self) -> Result<Url, Error> {
        let mut query = Map::new();
        query.insert("client_id".to_string(), Value::String(self.client_id.clone()));
        query.insert(
            "response_type".to_string(),
            Value::String(self.response_type.clone()),
        );
        query.insert("scope".to_string(), Value::String(self.scope.clone()));
        query.insert(
            "redirect_uri".to_string(),
            Value::String(self.redirect_uri.clone()),
        );
        query.insert("state".to_string(), Value::String(self.state.0.clone()));

        let url = format!("{}?{}", self.auth_endpoint, http_build_query(&query));
        Url::parse(&url).map_err(|e| {
            error!("Failed to parse authorization url: {}", e);
            Error::Url
        })
    }
}

/// The unverified `code` and `state` pair from the provider's callback.
/// Must be verified against the stored state token before use.
///
/// # Example
/// ```rust,no_run
/// use openid_connect_client::authorize::CallbackParams;
///
/// let params = CallbackParams::from_url("https://rp.example.com/openid-connect/google?code=...&state=...").unwrap();
/// let code = params.verify("stored_state_value").expect("state mismatch");
/// ```
#[derive(Debug, Clone)]
pub struct CallbackParams {
    state: UnverifiedState,
    code: Code,
}

impl CallbackParams {
    /// Extracts `code` and `state` from the full callback URL.
    pub fn from_url(callback_url: &str) -> Result<Self, Error> {
        let url = Url::try_from(callback_url).map_err(|e| {
            error!("Failed to parse callback url: {}", e);
            Error::Url
        })?;
        let params: HashMap<_, _> = url.query_pairs().map(|v| (v.0, v.1)).collect();
        Ok(Self {
            state: params.get("state").ok_or(Error::Url)?.to_string().into(),
            code: params.get("code").ok_or(Error::Url)?.to_string().into(),
        })
    }

    /// Must be verified against the stored state token before use.
    pub fn verify(self, state_val: &str) -> Result<Code, Error> {
        if self.state.0 == state_val {
            Ok(self.code)
        } else {
            Err(Error::StateMismatch)
        }
    }
}
