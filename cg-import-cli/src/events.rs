//! Renders pipeline progress events to the terminal.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use cg_import_scraper::{BatchOutcome, ImportEvent};

const SEPARATOR: &str = "----------------------------------------";

/// Drain the event channel until the pipeline drops its sender.
pub(crate) async fn print_events(mut rx: mpsc::UnboundedReceiver<ImportEvent>) {
    let mut pages: Option<ProgressBar> = None;

    while let Some(event) = rx.recv().await {
        match event {
            ImportEvent::FetchPlanned { start, end } => {
                println!("Fetching all scores from pages {start} to {end}...");
                let pb = ProgressBar::new(u64::from(end - start + 1));
                pb.set_style(
                    ProgressStyle::with_template("  {bar:30.cyan} {pos}/{len} pages")
                        .expect("static pattern"),
                );
                pages = Some(pb);
            }
            ImportEvent::PageFetched { page, sp, dp } => {
                log::debug!("page {page}: {sp} SP / {dp} DP scores");
                if let Some(pb) = &pages {
                    pb.inc(1);
                }
            }
            ImportEvent::BatchesPlanned { batches } => {
                if let Some(pb) = pages.take() {
                    pb.finish_and_clear();
                }
                println!("{SEPARATOR}");
                println!("{batches} batch(es) to emit, one per game version and playtype.");
            }
            ImportEvent::Submitting {
                version,
                playtype,
                scores,
            } => {
                println!("Submitting IIDX {version} {playtype} ({scores} score(s))...");
            }
            ImportEvent::Polling {
                version,
                playtype,
                attempt,
            } => {
                log::debug!("IIDX {version} {playtype}: status check #{attempt}");
            }
            ImportEvent::BatchFinished {
                version,
                playtype,
                outcome,
            } => print_outcome(&version, playtype, &outcome),
            ImportEvent::Exported { path, scores } => {
                println!(
                    "{} Wrote {} ({} score(s))",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    path.display(),
                    scores,
                );
            }
        }
    }
}

fn print_outcome(version: &str, playtype: cg_import_core::Playtype, outcome: &BatchOutcome) {
    match outcome {
        BatchOutcome::Imported {
            imported,
            errors,
            description,
        } => {
            println!(
                "{} [IIDX {version} {playtype}] {description} {imported} new score(s), {} error(s).",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                errors.len(),
            );
            for error in errors {
                println!("    {}: {}", error.kind, error.message);
            }
        }
        BatchOutcome::Rejected { description } => {
            println!(
                "{} [IIDX {version} {playtype}] {description}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            );
        }
        BatchOutcome::Unrecognized { description } => {
            println!(
                "{} [IIDX {version} {playtype}] {description}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            );
        }
    }
}
