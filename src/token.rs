//! Exchanging an authorization code for tokens.
//!
//! This module:
//! - TokenRequest: A data structure for the POST to the token endpoint.
//! - TokenResponse: A data structure for parsing the endpoint's reply.
//! - TokenSet: The tokens handed back to the caller, with an absolute
//!   expiry timestamp.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    authorize::Code,
    config::ClientSettings,
    id_token::IdToken,
    query::http_build_query,
};

/// Represents an OAuth 2.0 access token.
/// This token is used to call the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    /// Retrieves the access token as a string.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A structure used to send the code exchange request to the token endpoint.
///
/// The body carries `code`, `client_id`, `client_secret`, `redirect_uri` and
/// `grant_type=authorization_code`, form-encoded. The `redirect_uri` must be
/// byte-identical to the one used in the authorization request.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    token_endpoint: String,
    code: Code,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    grant_type: String,
}

impl TokenRequest {
    /// Creates a new request from the client's settings and the verified code.
    pub fn new(
        token_endpoint: &str,
        settings: &ClientSettings,
        redirect_uri: &str,
        code: Code,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.to_string(),
            code,
            client_id: settings.client_id().to_string(),
            client_secret: settings.client_secret().to_string(),
            redirect_uri: redirect_uri.to_string(),
            grant_type: "authorization_code".to_string(),
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Form-encodes the POST body.
    pub fn form_body(&self) -> String {
        let mut body = Map::new();
        body.insert("code".to_string(), Value::String(self.code.0.clone()));
        body.insert("client_id".to_string(), Value::String(self.client_id.clone()));
        body.insert(
            "client_secret".to_string(),
            Value::String(self.client_secret.clone()),
        );
        body.insert(
            "redirect_uri".to_string(),
            Value::String(self.redirect_uri.clone()),
        );
        body.insert("grant_type".to_string(), Value::String(self.grant_type.clone()));
        http_build_query(&body)
    }
}

/// The token endpoint's JSON reply, prior to validation.
///
/// All fields are optional at the wire level; `retrieve_tokens` requires
/// each of them and treats absence like any other failed exchange.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) id_token: Option<IdToken>,
    pub(crate) access_token: Option<AccessToken>,
    pub(crate) expires_in: Option<u64>,
}

/// The outcome of a successful code exchange.
///
/// `expire` is an absolute unix timestamp: the time the exchange completed
/// plus the provider-reported `expires_in` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    id_token: IdToken,
    access_token: AccessToken,
    expire: u64,
}

impl TokenSet {
    pub(crate) fn new(id_token: IdToken, access_token: AccessToken, expire: u64) -> Self {
        Self {
            id_token,
            access_token,
            expire,
        }
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn expire(&self) -> u64 {
        self.expire
    }
}
