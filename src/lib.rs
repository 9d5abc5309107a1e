//! Client side of the OpenID Connect Authorization Code flow.
//!
//! This library implements the four protocol steps a relying party performs
//! against an identity provider: building the authorization redirect,
//! exchanging the callback code for tokens, decoding the ID token payload,
//! and fetching userinfo with a bearer token. It is specialized per provider
//! (Google, any generic OIDC provider, ...) by supplying the provider's
//! endpoint URLs through the [`endpoints::EndpointProvider`] trait.
//! # Feature
//! - Generate an anti-CSRF state token
//! - Generate the authorization request URL for the provider
//! - Parse the provider callback and verify the echoed state
//! - Exchange the code for id_token/access_token (using reqwest)
//! - Decode the id_token payload (Base64URLDecode) into a claims map
//! - Fetch userinfo with the access token (using reqwest)
//! # Caution
//! - This library is designed for direct communication with the provider over HTTPS.
//! - It does **not** verify the `id_token` signature when decoding it. The
//!   decoded claims should not be passed to other components of your
//!   application as proven.
//! - There is no token refresh flow, no dynamic client registration and no
//!   discovery-document fetching.
//! # Examples
//! For example usage, see `demos/axum_server.rs` (`cargo run --example axum_server`).
pub mod authorize;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod executer;
pub mod id_token;
pub mod query;
pub mod state_token;
pub mod token;
pub mod userinfo;
