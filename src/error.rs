use thiserror::Error;
pub use url::ParseError as UrlParseError;

/// Error types for the LDS Tools client.
#[derive(Error, Debug)]
pub enum LdsError {
    /// The bootstrap configuration document could not be retrieved or read.
    #[error("Endpoint discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The service rejected the supplied credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The endpoint name is not advertised by the service.
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// A URL template placeholder had no value to substitute.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// A URL template is malformed.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The operation needs a signed-in session.
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error parsing URL.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] UrlParseError),

    /// Error serializing or deserializing JSON.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

/// Result type for LDS Tools operations.
pub type LdsResult<T> = Result<T, LdsError>;
