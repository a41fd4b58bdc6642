//! Error types for the API clients.

/// Errors that can occur when talking to a quote or symbol-directory provider.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The provider returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The provider throttled us, either with HTTP 429 or an in-payload note.
    #[error("{provider} rate limit for {symbol}: {message}")]
    RateLimited {
        provider: String,
        symbol: String,
        message: String,
    },
    /// The provider answered with an informational payload instead of data.
    #[error("{provider} info for {symbol}: {message}")]
    ProviderInfo {
        provider: String,
        symbol: String,
        message: String,
    },
    /// The provider answered with an error payload or an unexpected shape.
    #[error("{provider} request failed for {symbol}: {message}")]
    ProviderMessage {
        provider: String,
        symbol: String,
        message: String,
    },
    /// The provider does not know the symbol at all.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
    /// No API key was passed and the environment variable is unset.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),
    /// The body could not be decoded into the expected structure.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
}

impl Error {
    /// True for failures worth retrying later: network errors, throttling and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed | Self::RateLimited { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
