use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limited by exchange (HTTP {status}), retry after {retry_after:?}s")]
    RateLimited { status: u16, retry_after: Option<u64> },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: i64, message: String },
}

pub type Result<T> = std::result::Result<T, HttpError>;
