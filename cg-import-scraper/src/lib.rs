//! Network layer for the CG score importer: the rate-limited HTTP client,
//! API key storage, the page fetch loop, batch submission and the import
//! status poller. All pure parsing and payload logic lives in
//! `cg-import-core`.

pub mod client;
pub mod credentials;
pub mod error;
pub mod poll;
pub mod scrape;
pub mod types;

pub use client::TachiClient;
pub use credentials::{
    CLIENT_FILE_FLOW, CredentialSource, Credentials, config_path, credential_source, save_to_file,
};
pub use error::ScrapeError;
pub use poll::{PollPolicy, PollStep, poll_until_terminal};
pub use scrape::{
    BatchOutcome, FetchOptions, ImportEvent, ImportReport, run_export, run_import,
};
pub use types::{ImportErrorDetail, ImportSummary, PollBody, PollResponse, SubmitResponse};
