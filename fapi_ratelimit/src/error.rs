use std::fmt;

/// Result type for ledger parsing operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors raised while interpreting rate-limit data from the exchange
///
/// None of these abort a ledger update. They describe the single entry that
/// was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// Header value for a recognised prefix is not a non-negative integer
    InvalidUsage { header: String, value: String },

    /// Header matched a prefix but carried no window suffix
    MissingWindow(String),

    /// Interval unit outside the exchange vocabulary
    UnknownInterval(String),

    /// Window key not of the form `<count><unit letter>`
    InvalidWindowKey(String),
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::InvalidUsage { header, value } => write!(f, "Invalid usage value {value:?} in header {header}"),
            RateLimitError::MissingWindow(header) => write!(f, "Header {header} has no window suffix"),
            RateLimitError::UnknownInterval(unit) => write!(f, "Unknown rate limit interval: {unit}"),
            RateLimitError::InvalidWindowKey(key) => write!(f, "Invalid window key: {key}"),
        }
    }
}

impl std::error::Error for RateLimitError {}
