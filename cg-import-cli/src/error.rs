use thiserror::Error;

use cg_import_scraper::ScrapeError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Profile URL did not parse
    #[error("Invalid profile URL: {0}")]
    Url(#[from] url::ParseError),

    /// Error from the scraping/import pipeline
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
