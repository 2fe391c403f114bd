use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("All feed sources failed")]
    AllSourcesFailed,

    // Mail errors
    #[error("Mail authentication failed: {0}")]
    Auth(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("All {0} digest dispatches failed")]
    AllDispatchesFailed(usize),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<gmail::GmailError> for DigestError {
    fn from(err: gmail::GmailError) -> Self {
        match err {
            gmail::GmailError::Auth(msg) => DigestError::Auth(msg),
            gmail::GmailError::InvalidHeader => {
                DigestError::Auth("access token is not a valid header value".to_string())
            }
            gmail::GmailError::InvalidUrl(msg) => DigestError::InvalidUrl(msg),
            other => DigestError::Dispatch(other.to_string()),
        }
    }
}

pub type DigestResult<T> = Result<T, DigestError>;
