//! Per-provider endpoint capability.
//!
//! Every concrete provider must be able to name its three endpoints:
//! - `authorization`: where the user agent is redirected to log in.
//! - `token`: where an authorization code is exchanged for tokens.
//! - `userinfo`: where profile claims are fetched with an access token.
//!
//! The capability is a trait bound on [`OidcClient`](crate::client::OidcClient),
//! so a client without endpoints cannot be constructed. Endpoints are kept as
//! strings and parsed at the point of use, which reports a bad URL as an error
//! on the operation that needed it.
//!
//! # Example
//! ```rust,no_run
//! use openid_connect_client::endpoints::{CustomEndpoints, Google};
//!
//! let google = Google;
//! let keycloak = CustomEndpoints::new(
//!     "https://id.example.com/realms/main/protocol/openid-connect/auth",
//!     "https://id.example.com/realms/main/protocol/openid-connect/token",
//!     "https://id.example.com/realms/main/protocol/openid-connect/userinfo",
//! );
//! ```

/// Supplies the endpoint URLs of one identity provider.
pub trait EndpointProvider {
    /// URL of the authorization endpoint.
    fn authorization(&self) -> &str;
    /// URL of the token exchange endpoint.
    fn token(&self) -> &str;
    /// URL of the userinfo endpoint.
    fn userinfo(&self) -> &str;
}

/// Google's well-known OpenID Connect endpoint set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Google;

impl EndpointProvider for Google {
    fn authorization(&self) -> &str {
        "https://accounts.google.com/o/oauth2/auth"
    }

    fn token(&self) -> &str {
        "https://oauth2.googleapis.com/token"
    }

    fn userinfo(&self) -> &str {
        "https://openidconnect.googleapis.com/v1/userinfo"
    }
}

/// Endpoint set for a generic OpenID Connect provider, supplied explicitly.
#[derive(Debug, Clone, Default)]
pub struct CustomEndpoints {
    authorization: String,
    token: String,
    userinfo: String,
}

impl CustomEndpoints {
    /// Creates an endpoint set from the three provider URLs.
    pub fn new(authorization: &str, token: &str, userinfo: &str) -> Self {
        Self {
            authorization: authorization.to_string(),
            token: token.to_string(),
            userinfo: userinfo.to_string(),
        }
    }
}

impl EndpointProvider for CustomEndpoints {
    fn authorization(&self) -> &str {
        &self.authorization
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn userinfo(&self) -> &str {
        &self.userinfo
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use super::{CustomEndpoints, EndpointProvider, Google};

    #[test]
    fn test_google_endpoints_parse() {
        let google = Google;
        assert!(url::Url::parse(google.authorization()).is_ok());
        assert!(url::Url::parse(google.token()).is_ok());
        assert!(url::Url::parse(google.userinfo()).is_ok());
    }

    #[test]
    fn test_custom_endpoints() {
        let endpoints = CustomEndpoints::new(
            "https://auth.example.com/auth",
            "https://auth.example.com/token",
            "https://auth.example.com/userinfo",
        );
        assert_eq!(endpoints.authorization(), "https://auth.example.com/auth");
        assert_eq!(endpoints.token(), "https://auth.example.com/token");
        assert_eq!(endpoints.userinfo(), "https://auth.example.com/userinfo");
    }
}
