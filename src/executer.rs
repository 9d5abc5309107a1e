//! Provides an asynchronous execution framework for the outbound HTTP calls.
//!
//! This module:
//! - Defines the Executer trait, which provides a unified interface for making HTTP requests.
//! - Implements executers for the token exchange and the userinfo fetch.
//!
//! Executers return the raw [`HttpResponse`] (status plus body) rather than a
//! parsed value, so the operation layer can log the provider's exact reply on
//! failure. Tests substitute stub executers for the reqwest-backed ones.

use std::{error::Error, pin::Pin, time::Duration};

use crate::{token::TokenRequest, userinfo::UserInfoRequest};
use http::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::error;

/// Outbound connect timeout, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 3;
/// Outbound total request timeout, in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// generic asynchronous execution interface for sending HTTP requests.
/// Key Components:
/// - R: The request type that the executer will handle.
/// - Response: The expected response type.
/// - Error: The error type that will be returned on failure.
/// - Future: The asynchronous execution result, returning either Response or Error
pub trait Executer<'a, Req>
where
    Req: Send,
{
    type Response;
    type Error: Error;
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send + 'a;

    fn execute(&'a self, req: &'a Req) -> Self::Future;
}

/// Defines possible errors that can occur during request execution.
#[derive(Debug, Clone, Error)]
pub enum ExecuteError {
    #[error("Failed to send request")]
    Send,
    #[error("Failed to read response body")]
    Body,
    #[error("Failed to parse url")]
    URL,
}

/// The raw reply of an outbound call, as reported by the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

fn timed_client() -> Result<Client, ExecuteError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| {
            error!("Failed to build http client: {:?}", e);
            ExecuteError::Send
        })
}

/// Handles the POST to the token endpoint.
pub struct TokenExe;

/// Request Workflow
/// 1. Parse the token endpoint URL.
/// 2. Form-encode the request body.
/// 3. Send an HTTP POST request.
/// 4. Return the raw status and body.
impl<'a> Executer<'a, TokenRequest> for TokenExe {
    type Response = HttpResponse;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a TokenRequest) -> Self::Future {
        Box::pin(async move {
            let url = Url::parse(req.token_endpoint()).map_err(|e| {
                error!("Failed to parse url: {:?}", e);
                ExecuteError::URL
            })?;

            let client = timed_client()?;
            let res = client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(req.form_body())
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            let status = res.status();
            let body = res.text().await.map_err(|e| {
                error!("Failed to read response body: {:?}", e);
                ExecuteError::Body
            })?;
            Ok(HttpResponse { status, body })
        })
    }
}

/// Handles the bearer-authenticated GET to the userinfo endpoint.
pub struct UserInfoExe;

/// Request Workflow
/// 1. Parse the userinfo endpoint URL.
/// 2. Send an HTTP GET request with the bearer token.
/// 3. Return the raw status and body.
impl<'a> Executer<'a, UserInfoRequest> for UserInfoExe {
    type Response = HttpResponse;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a UserInfoRequest) -> Self::Future {
        Box::pin(async move {
            let url = Url::parse(req.userinfo_endpoint()).map_err(|e| {
                error!("Failed to parse url: {:?}", e);
                ExecuteError::URL
            })?;

            let client = timed_client()?;
            let res = client
                .get(url)
                .header(AUTHORIZATION, format!("Bearer {}", req.access_token()))
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            let status = res.status();
            let body = res.text().await.map_err(|e| {
                error!("Failed to read response body: {:?}", e);
                ExecuteError::Body
            })?;
            Ok(HttpResponse { status, body })
        })
    }
}
