//! Fetching profile claims from the userinfo endpoint.

use serde_json::{Map, Value};

use crate::token::AccessToken;

/// Profile claims returned verbatim by the userinfo endpoint.
pub type UserInfo = Map<String, Value>;

/// A structure used to send a bearer-authenticated GET to the userinfo
/// endpoint.
#[derive(Debug, Clone)]
pub struct UserInfoRequest {
    userinfo_endpoint: String,
    access_token: AccessToken,
}

impl UserInfoRequest {
    /// Creates a new request from the endpoint URL and the access token
    /// obtained in the code exchange.
    pub fn new(userinfo_endpoint: &str, access_token: &AccessToken) -> Self {
        Self {
            userinfo_endpoint: userinfo_endpoint.to_string(),
            access_token: access_token.to_owned(),
        }
    }

    pub fn userinfo_endpoint(&self) -> &str {
        &self.userinfo_endpoint
    }

    pub fn access_token(&self) -> &str {
        &self.access_token.0
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::token::AccessToken;

    use super::UserInfoRequest;

    #[test]
    fn test_user_info_request_new() {
        let access_token = AccessToken("my_access_token".to_string());
        let request = UserInfoRequest::new("https://userinfo.example.com", &access_token);

        assert_eq!(request.userinfo_endpoint(), "https://userinfo.example.com");
        assert_eq!(request.access_token(), "my_access_token");
    }
}
