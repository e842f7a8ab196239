/// Errors that can occur while fetching pages or talking to Kamaitachi.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] cg_import_core::ParseError),

    #[error("Invalid API key: {0}")]
    InvalidCredentials(String),

    #[error("Kamaitachi rejected the request: {0}")]
    Rejected(String),

    #[error("Import still ongoing after {attempts} status checks")]
    PollBudgetExhausted { attempts: u32 },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Unexpected API response: {0}")]
    Api(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
