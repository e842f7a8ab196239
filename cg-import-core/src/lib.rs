//! Core logic for moving IIDX scores from Cardinal Gate profiles to
//! Kamaitachi.
//!
//! Everything in this crate is pure: parsing a page of profile markup into
//! score records, normalizing CG timestamps, computing the page queue,
//! grouping records by game version, and building BATCH-MANUAL payloads.
//! Network and filesystem concerns live in `cg-import-scraper` and the CLI.

pub mod batch;
pub mod dates;
pub mod error;
pub mod group;
pub mod paginate;
pub mod parse;
pub mod site;
pub mod types;

pub use batch::{BatchMeta, BatchPayload, build_batches, export_filename};
pub use dates::parse_timestamp;
pub use error::ParseError;
pub use group::{VersionScores, group_by_version};
pub use paginate::{PAGE_LIMIT, PageInfo, page_queue};
pub use parse::{PageScores, parse_page, parse_page_info};
pub use site::Site;
pub use types::{
    Difficulty, Judgements, MatchType, OptionalMetrics, ParsedScore, Playtype, ScoreRecord,
};
