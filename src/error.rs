use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Request to the provider's {operation} endpoint failed")]
    RemoteRequest { operation: &'static str },
    #[error("Provider response is missing `{0}`")]
    MissingResponseField(&'static str),
    #[error("Malformed id_token")]
    MalformedToken,
    #[error("State token not matched")]
    StateMismatch,
    #[error("Failed to generate state token")]
    GenState,
    #[error("Failed to parse url")]
    Url,
    #[error("Invalid client configuration: {0}")]
    Config(&'static str),
}
