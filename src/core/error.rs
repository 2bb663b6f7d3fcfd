//! Errors raised by exchange-rate sources.

/// Failures a source can report. [`SourceError::kind`] is the short label
/// shown to the user as status or conversion label.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing configuration option: {0}")]
    MissingOption(String),

    #[error("No exchange rate data loaded")]
    NotLoaded,

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

impl SourceError {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Api(_) => "ApiException",
            SourceError::Timeout => "Timeout",
            SourceError::Connection(_) => "ConnectionError",
            SourceError::Request(_) => "RequestException",
            SourceError::Io(_) => "IoError",
            SourceError::Parse(_) => "ParseError",
            SourceError::MissingOption(_) => "MissingOption",
            SourceError::NotLoaded => "NotLoaded",
            SourceError::UnknownCurrency(_) => "UnknownCurrency",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_connect() {
            SourceError::Connection(e.to_string())
        } else {
            SourceError::Request(e.to_string())
        }
    }
}
