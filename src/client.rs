//! The per-provider client and its four flow operations.
//!
//! [`OidcClient`] owns one registered client's identity (`name`, `label`),
//! its [`ClientSettings`] and an [`EndpointProvider`], and exposes the flow
//! as four independent entry points invoked in order by the host:
//!
//! 1. [`OidcClient::authorize`]: build the login redirect URL.
//! 2. [`OidcClient::retrieve_tokens`]: exchange the callback code for tokens.
//! 3. [`OidcClient::decode_id_token`]: read the claims out of the ID token.
//! 4. [`OidcClient::retrieve_user_info`]: fetch profile claims.
//!
//! Remote failures never panic and never escape as transport errors: each is
//! logged once with the operation name, the client name and the provider's
//! raw reply, then surfaced as [`Error::RemoteRequest`] or
//! [`Error::MissingResponseField`] for the host to turn into a generic
//! "authentication failed" outcome.

use std::time::{SystemTime, UNIX_EPOCH};

use http::StatusCode;
use tracing::error;
use url::Url;

use crate::{
    authorize::{AuthorizeRequest, Code},
    config::ClientSettings,
    endpoints::EndpointProvider,
    error::Error,
    executer::{ExecuteError, Executer, HttpResponse},
    id_token::{Claims, IdToken},
    state_token::StateToken,
    token::{AccessToken, TokenRequest, TokenResponse, TokenSet},
    userinfo::{UserInfo, UserInfoRequest},
};

/// Base of the callback path. The host router must route
/// `<base>/<client name>` back into the code exchange.
pub const REDIRECT_PATH_BASE: &str = "/openid-connect";

/// Scope requested when the caller does not supply one.
pub const DEFAULT_SCOPE: &str = "openid email";

/// Host-request facilities the operations need.
///
/// Implemented by the host per incoming request, so nothing here is read
/// from ambient globals.
pub trait RequestContext {
    /// Produces an absolute URL for a relative path, honoring the host's
    /// scheme/domain configuration.
    fn absolute_url(&self, path: &str) -> String;

    /// Clears the current request's post-login "destination" hint. Left in
    /// place it would override the redirect issued after authentication.
    fn clear_destination(&mut self);
}

/// One configured OpenID Connect client, specialized by its endpoint
/// provider.
///
/// # Example
/// ```rust,no_run
/// use openid_connect_client::{client::OidcClient, config::ClientSettings, endpoints::Google};
///
/// let settings = ClientSettings::builder()
///     .client_id("your-client-id")
///     .client_secret("your-client-secret")
///     .build()
///     .unwrap();
/// let client = OidcClient::new("google", "Google", settings, Google).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct OidcClient<P> {
    name: String,
    label: String,
    settings: ClientSettings,
    provider: P,
}

impl<P> OidcClient<P>
where
    P: EndpointProvider,
{
    /// Creates a client from its machine name, display label, settings and
    /// endpoint provider.
    ///
    /// The name doubles as the callback path segment, so it must be non-empty
    /// and must not contain `/`.
    pub fn new(name: &str, label: &str, settings: ClientSettings, provider: P) -> Result<Self, Error> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::Config("client name must be a non-empty path segment"));
        }
        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            settings,
            provider,
        })
    }

    /// The machine name of the client.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable name of the client.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The callback path the host router must register for this client.
    pub fn redirect_path(&self) -> String {
        format!("{REDIRECT_PATH_BASE}/{}", self.name)
    }

    /// Builds the authorization redirect URL for this client.
    ///
    /// `scope` falls back to [`DEFAULT_SCOPE`]; `state` is the fresh
    /// anti-CSRF token the host stored for this attempt. The request's
    /// destination hint is cleared through `ctx` so it cannot hijack the
    /// post-login redirect. The host terminates its request by redirecting
    /// (3xx) to the returned URL.
    pub fn authorize<C>(
        &self,
        scope: Option<&str>,
        state: &StateToken,
        ctx: &mut C,
    ) -> Result<Url, Error>
    where
        C: RequestContext,
    {
        let redirect_uri = ctx.absolute_url(&self.redirect_path());
        let request = AuthorizeRequest::new(
            self.provider.authorization(),
            &self.settings,
            scope.unwrap_or(DEFAULT_SCOPE),
            &redirect_uri,
            state,
        );
        ctx.clear_destination();
        request.into_url()
    }

    /// Exchanges the verified authorization code for tokens.
    ///
    /// POSTs to the token endpoint through `exe` and, on HTTP 200 with a
    /// complete JSON body, returns the [`TokenSet`] with
    /// `expire = now + expires_in`. Everything else (transport error,
    /// non-200 status, unparseable body, missing field) is logged with the
    /// provider's raw reply and returned as an error.
    pub async fn retrieve_tokens<C, E>(&self, ctx: &C, exe: &E, code: Code) -> Result<TokenSet, Error>
    where
        C: RequestContext,
        for<'a> E: Executer<'a, TokenRequest, Response = HttpResponse, Error = ExecuteError>,
    {
        const OPERATION: &str = "retrieve_tokens";

        let redirect_uri = ctx.absolute_url(&self.redirect_path());
        let request = TokenRequest::new(self.provider.token(), &self.settings, &redirect_uri, code);

        let response = self.run_remote(OPERATION, exe, &request).await?;
        let parsed = match serde_json::from_str::<TokenResponse>(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(
                    operation = OPERATION,
                    client = %self.name,
                    response = %response.body,
                    "Failed to parse token response: {}", e
                );
                return Err(Error::RemoteRequest { operation: OPERATION });
            }
        };

        let id_token = parsed
            .id_token
            .ok_or_else(|| self.missing_field(OPERATION, "id_token", &response))?;
        let access_token = parsed
            .access_token
            .ok_or_else(|| self.missing_field(OPERATION, "access_token", &response))?;
        let expires_in = parsed
            .expires_in
            .ok_or_else(|| self.missing_field(OPERATION, "expires_in", &response))?;

        Ok(TokenSet::new(id_token, access_token, unix_now() + expires_in))
    }

    /// Decodes the claims segment of an ID token. See [`IdToken::decode`]
    /// for the caveats: the signature is **not** verified.
    pub fn decode_id_token(&self, id_token: &IdToken) -> Result<Claims, Error> {
        id_token.decode()
    }

    /// Fetches profile claims from the userinfo endpoint with the access
    /// token obtained in the code exchange. Failure policy matches
    /// [`OidcClient::retrieve_tokens`].
    pub async fn retrieve_user_info<E>(
        &self,
        exe: &E,
        access_token: &AccessToken,
    ) -> Result<UserInfo, Error>
    where
        for<'a> E: Executer<'a, UserInfoRequest, Response = HttpResponse, Error = ExecuteError>,
    {
        const OPERATION: &str = "retrieve_user_info";

        let request = UserInfoRequest::new(self.provider.userinfo(), access_token);
        let response = self.run_remote(OPERATION, exe, &request).await?;

        serde_json::from_str::<UserInfo>(&response.body).map_err(|e| {
            error!(
                operation = OPERATION,
                client = %self.name,
                response = %response.body,
                "Failed to parse userinfo response: {}", e
            );
            Error::RemoteRequest { operation: OPERATION }
        })
    }

    /// Executes one outbound call and applies the shared success condition:
    /// HTTP 200 and no transport error. Failures are logged here, once.
    async fn run_remote<Req, E>(
        &self,
        operation: &'static str,
        exe: &E,
        request: &Req,
    ) -> Result<HttpResponse, Error>
    where
        Req: Send,
        for<'a> E: Executer<'a, Req, Response = HttpResponse, Error = ExecuteError>,
    {
        let response = match exe.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    operation = operation,
                    client = %self.name,
                    "Transport error: {}", e
                );
                return Err(Error::RemoteRequest { operation });
            }
        };
        if response.status != StatusCode::OK {
            error!(
                operation = operation,
                client = %self.name,
                status = %response.status,
                response = %response.body,
                "Provider returned an error status"
            );
            return Err(Error::RemoteRequest { operation });
        }
        Ok(response)
    }

    fn missing_field(
        &self,
        operation: &'static str,
        field: &'static str,
        response: &HttpResponse,
    ) -> Error {
        error!(
            operation = operation,
            client = %self.name,
            response = %response.body,
            "Token response is missing `{}`", field
        );
        Error::MissingResponseField(field)
    }
}

/// Equivalent to the display name of the client.
impl<P> std::fmt::Display for OidcClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use http::StatusCode;

    use crate::{
        authorize::Code,
        config::ClientSettings,
        endpoints::CustomEndpoints,
        error::Error,
        executer::{ExecuteError, Executer, HttpResponse},
        state_token::StateToken,
        token::AccessToken,
    };

    use super::{DEFAULT_SCOPE, OidcClient, RequestContext, unix_now};

    struct TestContext {
        base: String,
        destination: Option<String>,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                base: "https://rp.example.com".to_string(),
                destination: Some("/next".to_string()),
            }
        }
    }

    impl RequestContext for TestContext {
        fn absolute_url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        fn clear_destination(&mut self) {
            self.destination = None;
        }
    }

    /// Serves one canned reply for every request, counting calls.
    struct StubExe {
        status: StatusCode,
        body: String,
        calls: AtomicUsize,
    }

    impl StubExe {
        fn new(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl<'a, Req> Executer<'a, Req> for StubExe
    where
        Req: Send + Sync,
    {
        type Response = HttpResponse;
        type Error = ExecuteError;
        type Future =
            Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

        fn execute(&'a self, _req: &'a Req) -> Self::Future {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = HttpResponse {
                status: self.status,
                body: self.body.clone(),
            };
            Box::pin(async move { Ok(response) })
        }
    }

    /// Fails every request at the transport level.
    struct FailingExe;

    impl<'a, Req> Executer<'a, Req> for FailingExe
    where
        Req: Send + Sync,
    {
        type Response = HttpResponse;
        type Error = ExecuteError;
        type Future =
            Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

        fn execute(&'a self, _req: &'a Req) -> Self::Future {
            Box::pin(async move { Err(ExecuteError::Send) })
        }
    }

    fn client() -> OidcClient<CustomEndpoints> {
        let settings = ClientSettings::builder()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .build()
            .unwrap();
        let endpoints = CustomEndpoints::new(
            "https://auth.example.com/auth",
            "https://auth.example.com/token",
            "https://auth.example.com/userinfo",
        );
        OidcClient::new("test", "Test Provider", settings, endpoints).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_names() {
        let settings = ClientSettings::builder()
            .client_id("id")
            .client_secret("secret")
            .build()
            .unwrap();
        let endpoints = CustomEndpoints::new("a", "b", "c");

        assert!(matches!(
            OidcClient::new("", "Empty", settings.clone(), endpoints.clone()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            OidcClient::new("a/b", "Slash", settings, endpoints),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_display_is_label() {
        assert_eq!(client().to_string(), "Test Provider");
    }

    #[test]
    fn test_redirect_path() {
        assert_eq!(client().redirect_path(), "/openid-connect/test");
    }

    #[test]
    fn test_authorize_url_and_destination() {
        let client = client();
        let state = StateToken::new().unwrap();
        let mut ctx = TestContext::new();

        let url = client.authorize(None, &state, &mut ctx).unwrap();

        assert!(ctx.destination.is_none());
        assert_eq!(url.host_str(), Some("auth.example.com"));

        let pair = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        assert_eq!(pair("client_id").as_deref(), Some("my_client_id"));
        assert_eq!(pair("response_type").as_deref(), Some("code"));
        assert_eq!(pair("scope").as_deref(), Some(DEFAULT_SCOPE));
        assert_eq!(
            pair("redirect_uri").as_deref(),
            Some("https://rp.example.com/openid-connect/test")
        );
        assert_eq!(pair("state").as_deref(), Some(state.value()));
    }

    #[test]
    fn test_authorize_custom_scope() {
        let client = client();
        let state = StateToken::new().unwrap();
        let mut ctx = TestContext::new();

        let url = client
            .authorize(Some("openid profile"), &state, &mut ctx)
            .unwrap();
        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned());
        assert_eq!(scope.as_deref(), Some("openid profile"));
    }

    #[tokio::test]
    async fn test_retrieve_tokens_success() {
        let client = client();
        let ctx = TestContext::new();
        let exe = StubExe::new(
            StatusCode::OK,
            r#"{"id_token":"A","access_token":"B","expires_in":3600}"#,
        );

        let before = unix_now();
        let tokens = client
            .retrieve_tokens(&ctx, &exe, Code("auth_code".to_string()))
            .await
            .unwrap();
        let after = unix_now();

        assert_eq!(tokens.id_token().value(), "A");
        assert_eq!(tokens.access_token().value(), "B");
        assert!(tokens.expire() >= before + 3600);
        assert!(tokens.expire() <= after + 3600);
        assert_eq!(exe.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retrieve_tokens_unauthorized() {
        let client = client();
        let ctx = TestContext::new();
        let exe = StubExe::new(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_client"}"#);

        let retrieved = client
            .retrieve_tokens(&ctx, &exe, Code("auth_code".to_string()))
            .await;
        assert!(matches!(
            retrieved,
            Err(Error::RemoteRequest { operation: "retrieve_tokens" })
        ));
    }

    #[tokio::test]
    async fn test_retrieve_tokens_transport_error() {
        let client = client();
        let ctx = TestContext::new();

        let retrieved = client
            .retrieve_tokens(&ctx, &FailingExe, Code("auth_code".to_string()))
            .await;
        assert!(matches!(retrieved, Err(Error::RemoteRequest { .. })));
    }

    #[tokio::test]
    async fn test_retrieve_tokens_missing_field() {
        let client = client();
        let ctx = TestContext::new();
        let exe = StubExe::new(StatusCode::OK, r#"{"access_token":"B","expires_in":3600}"#);

        let retrieved = client
            .retrieve_tokens(&ctx, &exe, Code("auth_code".to_string()))
            .await;
        assert!(matches!(
            retrieved,
            Err(Error::MissingResponseField("id_token"))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_tokens_malformed_json() {
        let client = client();
        let ctx = TestContext::new();
        let exe = StubExe::new(StatusCode::OK, "<html>not json</html>");

        let retrieved = client
            .retrieve_tokens(&ctx, &exe, Code("auth_code".to_string()))
            .await;
        assert!(matches!(retrieved, Err(Error::RemoteRequest { .. })));
    }

    #[test]
    fn test_decode_id_token() {
        let client = client();
        let token = crate::id_token::IdToken("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjMifQ.sig".to_string());

        let claims = client.decode_id_token(&token).unwrap();
        assert_eq!(claims.get("sub").and_then(|v| v.as_str()), Some("123"));
    }

    #[tokio::test]
    async fn test_retrieve_user_info_success() {
        let client = client();
        let exe = StubExe::new(StatusCode::OK, r#"{"email":"x@y.com"}"#);

        let info = client
            .retrieve_user_info(&exe, &AccessToken("token".to_string()))
            .await
            .unwrap();
        assert_eq!(info.get("email").and_then(|v| v.as_str()), Some("x@y.com"));
    }

    #[tokio::test]
    async fn test_retrieve_user_info_server_error() {
        let client = client();
        let exe = StubExe::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");

        let info = client
            .retrieve_user_info(&exe, &AccessToken("token".to_string()))
            .await;
        assert!(matches!(
            info,
            Err(Error::RemoteRequest { operation: "retrieve_user_info" })
        ));
    }
}
