use thiserror::Error;

/// Error taxonomy for the search proxy path.
///
/// Decode failures never appear here: an unparseable upstream payload
/// degrades to fallback wrapping in the proxy and the normalizer
/// instead of surfacing as an error.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl SearchError {
    /// HTTP status the proxy responds with for this error. Upstream
    /// failures pass the upstream's own status through verbatim.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Config(_) => 500,
            Self::Upstream { status, .. } => *status,
            Self::Network(_) => 500,
        }
    }
}
