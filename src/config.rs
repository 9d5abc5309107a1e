//! Defines structures and builders for per-client credentials.
//!
//! Provides a structured way to handle the settings an identity provider
//! hands out when a client is registered: the required `client_id` and
//! `client_secret`, plus any provider-specific extras.
//!
//! ## Structures
//! - `ClientSettings`: Stores the credentials and extra settings of one client.
//! - `SettingsBuilder`: A builder for constructing a `ClientSettings` instance.
//!
//! # Example
//! ```rust,no_run
//! use openid_connect_client::config::ClientSettings;
//!
//! let settings = ClientSettings::builder()
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .set("hosted_domain", "example.com")
//!     .build()
//!     .unwrap();
//! ```
//!
//! `build()` rejects empty credentials, so a constructed `ClientSettings`
//! is always usable.

use std::collections::HashMap;

use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientId(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientSecret(pub String);

/// Holds the admin-provided settings of one registered client.
///
/// It is designed to be immutable once constructed. The two credentials every
/// provider requires are typed fields; anything provider-specific lives in an
/// open string map reachable through [`ClientSettings::get`].
///
/// # Fields
/// - `client_id`: The client ID issued by the provider.
/// - `client_secret`: The client secret linked to the client ID.
/// - `extra`: Provider-specific settings (e.g. a tenant or hosted domain).
///
/// This struct is primarily built using the `SettingsBuilder`.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub(crate) client_id: ClientId,
    pub(crate) client_secret: ClientSecret,
    extra: HashMap<String, String>,
}

// ==========impl ClientSettings==========
impl ClientSettings {
    /// Returns a new `SettingsBuilder` instance to create a `ClientSettings` object.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Returns the client ID as a string reference.
    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    /// Returns the client secret as a string reference.
    pub fn client_secret(&self) -> &str {
        &self.client_secret.0
    }

    /// Looks up a provider-specific setting by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(|v| v.as_str())
    }
}

/// Provides a convenient way to create a `ClientSettings` instance step by step.
///
/// `build()` validates that both required credentials are present and
/// non-empty before the `ClientSettings` object is constructed.
///
/// # Example
/// ```rust,no_run
/// use openid_connect_client::config::SettingsBuilder;
///
/// let builder = SettingsBuilder::new()
///     .client_id("your-client-id")
///     .client_secret("your-client-secret");
///
/// let settings = builder.build().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    client_id: ClientId,
    client_secret: ClientSecret,
    extra: HashMap<String, String>,
}

// ==========impl SettingsBuilder==========
impl SettingsBuilder {
    /// Creates a new `SettingsBuilder` instance with default values.
    pub fn new() -> Self {
        SettingsBuilder::default()
    }

    /// Sets the client ID issued by the provider.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientId(client_id.to_string());
        self
    }

    /// Sets the client secret associated with the client ID.
    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = ClientSecret(client_secret.to_string());
        self
    }

    /// Adds a provider-specific setting under the given key.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key.to_string(), value.to_string());
        self
    }

    /// Constructs a `ClientSettings` instance with the provided values.
    /// Fails if `client_id` or `client_secret` was left empty.
    pub fn build(self) -> Result<ClientSettings, Error> {
        if self.client_id.0.is_empty() {
            return Err(Error::Config("client_id must not be empty"));
        }
        if self.client_secret.0.is_empty() {
            return Err(Error::Config("client_secret must not be empty"));
        }
        Ok(ClientSettings {
            client_id: self.client_id,
            client_secret: self.client_secret,
            extra: self.extra,
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::{config::ClientSettings, error::Error};

    use super::SettingsBuilder;

    #[test]
    fn test_settings_builder() {
        let client_id = "my_client_id";
        let client_secret = "my_secret";

        let settings = SettingsBuilder::new()
            .client_id(client_id)
            .client_secret(client_secret)
            .build()
            .unwrap();

        assert_eq!(settings.client_id(), client_id);
        assert_eq!(settings.client_secret(), client_secret);
        assert!(settings.get("anything").is_none());
    }

    #[test]
    fn test_settings_builder_extra() {
        let settings = ClientSettings::builder()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .set("hosted_domain", "example.com")
            .set("prompt", "consent")
            .build()
            .unwrap();

        assert_eq!(settings.get("hosted_domain"), Some("example.com"));
        assert_eq!(settings.get("prompt"), Some("consent"));
        assert_eq!(settings.get("missing"), None);
    }

    #[test]
    fn test_settings_builder_missing_client_id() {
        let built = SettingsBuilder::new().client_secret("my_secret").build();
        assert!(matches!(built, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_builder_missing_client_secret() {
        let built = SettingsBuilder::new().client_id("my_client_id").build();
        assert!(matches!(built, Err(Error::Config(_))));
    }
}
