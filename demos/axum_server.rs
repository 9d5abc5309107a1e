// In your provider's console
// Set
// - Redirect_uri: http://localhost/openid-connect/demo
// And then you will get a client id and client secret.
// Set .env file
// ```.env
// auth_endpoint="your_auth_endpoint"
// token_endpoint="your_token_endpoint"
// userinfo_endpoint="your_userinfo_endpoint"
// client_id="your_client_id"
// client_secret="your_client_secret"
// base_url="http://localhost"
// ```
// finally ```cargo run --example axum_server```
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Request, State},
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use http::{StatusCode, header::HOST};
use openid_connect_client::{
    authorize::CallbackParams,
    client::{OidcClient, RequestContext},
    config::ClientSettings,
    endpoints::CustomEndpoints,
    executer::{TokenExe, UserInfoExe},
    state_token::StateToken,
};
use serde_json::json;
use tracing::error;

extern crate openid_connect_client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log settings
    tracing_subscriber::fmt::init();

    // Read environment
    let auth_endpoint = read_env("auth_endpoint")?;
    let token_endpoint = read_env("token_endpoint")?;
    let userinfo_endpoint = read_env("userinfo_endpoint")?;
    let client_id = read_env("client_id")?;
    let client_secret = read_env("client_secret")?;
    let base_url = read_env("base_url")?;

    // Build the client for this provider
    let settings = ClientSettings::builder()
        .client_id(&client_id)
        .client_secret(&client_secret)
        .build()?;
    let endpoints = CustomEndpoints::new(&auth_endpoint, &token_endpoint, &userinfo_endpoint);
    let client = OidcClient::new("demo", "Demo Provider", settings, endpoints)?;

    // application state that holds the client
    let app_state = AppState::new(client, base_url);
    // The callback path is fixed per client name; register exactly that path.
    let callback_path = app_state.client.redirect_path();
    // Binding listener
    let listener = tokio::net::TcpListener::bind("0.0.0.0:80").await.unwrap();
    // Settings Router
    // '/openid-connect/demo': The redirect path registered with the provider
    // '/': A path to start auth (shows the provider's login window)
    let app = Router::new()
        .route(&callback_path, get(call_back))
        .route("/", get(start_auth))
        .with_state(Arc::new(app_state));

    axum::serve(listener, app).await.unwrap();
    anyhow::Ok(())
}

static COOKIE_KEY: &str = "state_token";

// Request-scoped host facilities handed to the client operations.
struct HostContext {
    base: String,
    destination: Option<String>,
}

impl HostContext {
    fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            destination: None,
        }
    }
}

impl RequestContext for HostContext {
    fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn clear_destination(&mut self) {
        self.destination = None;
    }
}

async fn start_auth(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    // Generate a state token for each request
    let state = StateToken::new().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Create a cookie that keys the stored state token
    let state_key = state.value().to_string();
    let cookie = Cookie::new(COOKIE_KEY, state_key.clone());
    // Insert the state token into memory (use Redis or similar in production)
    {
        app_state
            .states
            .lock()
            .unwrap()
            .insert(state_key, state.clone());
    }

    let mut ctx = HostContext::new(&app_state.base_url);
    // Build the redirect URL; default scope is "openid email"
    let url = app_state
        .client
        .authorize(None, &state, &mut ctx)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((jar.add(cookie), Redirect::to(url.as_str())))
}

async fn call_back(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    req: Request,
) -> Result<impl IntoResponse, StatusCode> {
    // CallbackParams::from_url needs the full url
    // So, get HOST from header and path
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let scheme = "http";
    let full_url = format!("{}://{}{}", scheme, host, path);

    // Parse code and state out of the callback
    let params = CallbackParams::from_url(&full_url).map_err(|e| {
        error!("Failed to parse callback url: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Get the state token stored previously
    let stored_state: StateToken;
    let cookie = jar.get(COOKIE_KEY).ok_or(StatusCode::BAD_REQUEST)?;
    let state_key = cookie.value();
    {
        // This block for early unlock
        let lock = app_state.states.lock().unwrap();
        stored_state = lock
            .get(state_key)
            .ok_or(StatusCode::BAD_REQUEST)?
            .to_owned();
    }
    // Get the code after verifying the state token
    let code = params
        .verify(stored_state.value())
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Exchange the code for tokens
    let ctx = HostContext::new(&app_state.base_url);
    let tokens = app_state
        .client
        .retrieve_tokens(&ctx, &TokenExe, code)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Decode the id_token payload (signature is NOT verified)
    let claims = app_state
        .client
        .decode_id_token(tokens.id_token())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Fetch userinfo with the access token
    let user_info = app_state
        .client
        .retrieve_user_info(&UserInfoExe, tokens.access_token())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "claims": claims,
            "userinfo": user_info,
            "expire": tokens.expire(),
        })),
    ))
}

// Get env from .env file
fn read_env(key: &str) -> anyhow::Result<String> {
    dotenvy::var(key).context("Failed to read env")
}

#[derive(Debug)]
struct AppState {
    client: OidcClient<CustomEndpoints>,
    base_url: String,
    states: Arc<Mutex<HashMap<String, StateToken>>>,
}

impl AppState {
    fn new(client: OidcClient<CustomEndpoints>, base_url: String) -> Self {
        Self {
            client,
            base_url,
            states: Arc::default(),
        }
    }
}
