//! Import/export orchestration.
//!
//! One logical task drives the whole pipeline: discover the page queue,
//! fetch and parse each page, group across pages, then emit batches one at
//! a time. Submit mode drives each batch's poll chain to a terminal state
//! before touching the next batch; export mode writes BATCH-MANUAL files
//! instead. Nothing here runs concurrently on purpose: the CG servers and
//! the import API both get exactly one request in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scraper::Html;
use tokio::sync::mpsc;
use url::Url;

use cg_import_core::{
    BatchPayload, PAGE_LIMIT, PageScores, Playtype, Site, build_batches, export_filename,
    group_by_version, page_queue, parse_page, parse_page_info,
};

use crate::client::TachiClient;
use crate::error::ScrapeError;
use crate::poll::{PollPolicy, PollStep, poll_until_terminal};
use crate::types::ImportErrorDetail;

/// What to fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Profile URL; its query string is replaced to reach each page.
    pub profile_url: Url,
    /// Hard cap on pages fetched this run.
    pub page_limit: usize,
}

impl FetchOptions {
    pub fn new(profile_url: Url) -> Self {
        Self {
            profile_url,
            page_limit: PAGE_LIMIT,
        }
    }
}

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// Page queue computed; fetching is about to start.
    FetchPlanned { start: u32, end: u32 },
    PageFetched { page: u32, sp: usize, dp: usize },
    /// Scores grouped; emission is about to start.
    BatchesPlanned { batches: usize },
    Submitting {
        version: String,
        playtype: Playtype,
        scores: usize,
    },
    Polling {
        version: String,
        playtype: Playtype,
        attempt: u32,
    },
    BatchFinished {
        version: String,
        playtype: Playtype,
        outcome: BatchOutcome,
    },
    Exported { path: PathBuf, scores: usize },
}

/// Terminal state of one submitted batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// The import completed. A non-empty error list still counts; those
    /// scores simply did not go in.
    Imported {
        imported: usize,
        errors: Vec<ImportErrorDetail>,
        description: String,
    },
    /// The remote refused the submission or reported a failed envelope.
    Rejected { description: String },
    /// The job ended in a status this tool does not model.
    Unrecognized { description: String },
}

/// Summary of a submit-mode run.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub batches: Vec<(String, Playtype, BatchOutcome)>,
}

fn page_url(profile_url: &Url, page: u32) -> Url {
    let mut url = profile_url.clone();
    url.set_query(Some(&format!("page={page}")));
    url
}

/// Fetch every queued page and accumulate its scores.
///
/// The first request reads the pagination bounds; the queue is then fetched
/// uniformly, current page included, so one code path serves both emission
/// modes.
async fn fetch_all_pages(
    client: &TachiClient,
    fetch: &FetchOptions,
    cancel: &AtomicBool,
    events: &mpsc::UnboundedSender<ImportEvent>,
) -> Result<PageScores, ScrapeError> {
    let first = client.fetch_page(&fetch.profile_url).await?;
    let info = parse_page_info(&Html::parse_document(&first))?;
    let queue = page_queue(info, fetch.page_limit);

    let (Some(&start), Some(&end)) = (queue.first(), queue.last()) else {
        return Ok(PageScores::default());
    };
    let _ = events.send(ImportEvent::FetchPlanned { start, end });

    let mut all = PageScores::default();
    for page in queue {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScrapeError::Cancelled);
        }

        let text = client.fetch_page(&page_url(&fetch.profile_url, page)).await?;
        let scores = parse_page(&Html::parse_document(&text))?;
        let _ = events.send(ImportEvent::PageFetched {
            page,
            sp: scores.sp.len(),
            dp: scores.dp.len(),
        });
        all.extend(scores);
    }

    Ok(all)
}

/// Fetch, group and submit every batch, polling each import to a terminal
/// state before starting the next.
pub async fn run_import(
    client: &TachiClient,
    fetch: &FetchOptions,
    policy: &PollPolicy,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<ImportEvent>,
) -> Result<ImportReport, ScrapeError> {
    let site = Site::from_url(&fetch.profile_url)?;
    let scores = fetch_all_pages(client, fetch, &cancel, &events).await?;
    let batches = build_batches(
        group_by_version(scores.sp, scores.dp),
        &site.service_name(),
    );
    let _ = events.send(ImportEvent::BatchesPlanned {
        batches: batches.len(),
    });

    let mut report = ImportReport::default();
    for batch in batches {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScrapeError::Cancelled);
        }

        let version = batch.meta.version.clone();
        let playtype = batch.meta.playtype;
        let _ = events.send(ImportEvent::Submitting {
            version: version.clone(),
            playtype,
            scores: batch.scores.len(),
        });

        let outcome = submit_and_poll(client, &batch, policy, &cancel, &events).await?;
        let _ = events.send(ImportEvent::BatchFinished {
            version: version.clone(),
            playtype,
            outcome: outcome.clone(),
        });
        report.batches.push((version, playtype, outcome));
    }

    Ok(report)
}

async fn submit_and_poll(
    client: &TachiClient,
    batch: &BatchPayload,
    policy: &PollPolicy,
    cancel: &AtomicBool,
    events: &mpsc::UnboundedSender<ImportEvent>,
) -> Result<BatchOutcome, ScrapeError> {
    let status_url = match client.submit_batch(batch).await {
        Ok(url) => url,
        // A refused submission is reported, not fatal; later batches may
        // still go through.
        Err(ScrapeError::Rejected(description)) => {
            return Ok(BatchOutcome::Rejected { description });
        }
        Err(e) => return Err(e),
    };

    let step = poll_until_terminal(
        || client.poll_import(&status_url),
        policy,
        cancel,
        |attempt| {
            let _ = events.send(ImportEvent::Polling {
                version: batch.meta.version.clone(),
                playtype: batch.meta.playtype,
                attempt,
            });
        },
    )
    .await?;

    match step {
        PollStep::Completed {
            imported,
            errors,
            description,
        } => Ok(BatchOutcome::Imported {
            imported,
            errors,
            description,
        }),
        PollStep::Rejected { description } => Ok(BatchOutcome::Rejected { description }),
        PollStep::Unrecognized { description } => Ok(BatchOutcome::Unrecognized { description }),
        PollStep::Ongoing => Err(ScrapeError::Api(
            "poller returned a non-terminal state".to_string(),
        )),
    }
}

/// Fetch, group and write every batch as a BATCH-MANUAL file in `out_dir`.
pub async fn run_export(
    client: &TachiClient,
    fetch: &FetchOptions,
    out_dir: &Path,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<ImportEvent>,
) -> Result<Vec<PathBuf>, ScrapeError> {
    let site = Site::from_url(&fetch.profile_url)?;
    let scores = fetch_all_pages(client, fetch, &cancel, &events).await?;
    let batches = build_batches(
        group_by_version(scores.sp, scores.dp),
        &site.service_name(),
    );
    let _ = events.send(ImportEvent::BatchesPlanned {
        batches: batches.len(),
    });

    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for batch in batches {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScrapeError::Cancelled);
        }

        let name = export_filename(
            site,
            &batch.meta.version,
            batch.meta.playtype,
            chrono::Utc::now(),
        );
        let path = out_dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(&batch)?)?;
        let _ = events.send(ImportEvent::Exported {
            path: path.clone(),
            scores: batch.scores.len(),
        });
        written.push(path);
    }

    Ok(written)
}
