//! cg-import CLI
//!
//! Pulls IIDX scores off a Cardinal Gate profile and either submits them
//! directly to Kamaitachi or writes BATCH-MANUAL files for manual upload.

mod error;
mod events;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;
use url::Url;

use cg_import_core::PAGE_LIMIT;
use cg_import_scraper::{
    BatchOutcome, CLIENT_FILE_FLOW, CredentialSource, Credentials, FetchOptions, PollPolicy,
    TachiClient, credential_source, save_to_file, scrape,
};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "cg-import")]
#[command(about = "Import Cardinal Gate IIDX scores into Kamaitachi", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch scores and submit them directly to Kamaitachi
    Import {
        /// Profile URL, e.g. https://cgate.dev/iidx/profile?page=3
        url: String,

        /// API key override (default: TACHI_API_KEY, then the config file)
        #[arg(long)]
        api_key: Option<String>,

        /// Maximum number of pages to fetch in one run
        #[arg(long, default_value_t = PAGE_LIMIT)]
        page_limit: usize,
    },

    /// Fetch scores and write BATCH-MANUAL JSON files instead of submitting
    Export {
        /// Profile URL, e.g. https://cgate.dev/iidx/profile?page=3
        url: String,

        /// Directory the batch files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Maximum number of pages to fetch in one run
        #[arg(long, default_value_t = PAGE_LIMIT)]
        page_limit: usize,
    },

    /// Manage the Kamaitachi API key
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Verify an API key against the API, then save it
    Set { key: String },

    /// Show where the configured key comes from and whether it still works
    Status,

    /// Print the credentials file path
    Path,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            url,
            api_key,
            page_limit,
        } => run_import(&url, api_key, page_limit),
        Commands::Export {
            url,
            out_dir,
            page_limit,
        } => run_export(&url, &out_dir, page_limit),
        Commands::Auth { action } => match action {
            AuthAction::Set { key } => run_auth_set(key),
            AuthAction::Status => run_auth_status(),
            AuthAction::Path => run_auth_path(),
        },
    };

    if let Err(e) = result {
        eprintln!(
            "{} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

/// Spawn a task that flips the cancel flag on Ctrl-C. The pipeline checks
/// the flag between requests, so cancellation lands at the next boundary.
fn watch_for_ctrl_c(cancel: &Arc<AtomicBool>) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current request...");
            cancel.store(true, Ordering::Relaxed);
        }
    });
}

fn run_import(url: &str, api_key: Option<String>, page_limit: usize) -> Result<(), CliError> {
    let profile_url = Url::parse(url)?;
    let creds = Credentials::load()?.with_override(api_key);
    let client = TachiClient::new(creds.api_key)?;
    let fetch = FetchOptions {
        profile_url,
        page_limit,
    };
    let policy = PollPolicy::default();
    let cancel = Arc::new(AtomicBool::new(false));

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let report = rt.block_on(async {
        watch_for_ctrl_c(&cancel);

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(events::print_events(rx));
        let result = scrape::run_import(&client, &fetch, &policy, cancel.clone(), tx).await;
        let _ = printer.await;
        result
    })?;

    let mut imported = 0;
    let mut errors = 0;
    let mut failed = 0;
    for (_, _, outcome) in &report.batches {
        match outcome {
            BatchOutcome::Imported {
                imported: n,
                errors: errs,
                ..
            } => {
                imported += n;
                errors += errs.len();
            }
            BatchOutcome::Rejected { .. } | BatchOutcome::Unrecognized { .. } => failed += 1,
        }
    }

    println!();
    println!(
        "{} {} score(s) imported across {} batch(es), {} import error(s), {} batch(es) not imported.",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        imported,
        report.batches.len(),
        errors,
        failed,
    );
    Ok(())
}

fn run_export(url: &str, out_dir: &Path, page_limit: usize) -> Result<(), CliError> {
    let profile_url = Url::parse(url)?;
    let client = TachiClient::anonymous()?;
    let fetch = FetchOptions {
        profile_url,
        page_limit,
    };
    let cancel = Arc::new(AtomicBool::new(false));

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let written = rt.block_on(async {
        watch_for_ctrl_c(&cancel);

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(events::print_events(rx));
        let result = scrape::run_export(&client, &fetch, out_dir, cancel.clone(), tx).await;
        let _ = printer.await;
        result
    })?;

    println!();
    println!(
        "{} Wrote {} batch file(s) to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        written.len(),
        out_dir.display(),
    );
    Ok(())
}

fn run_auth_set(key: String) -> Result<(), CliError> {
    let client = TachiClient::new(key.clone())?;
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}").expect("static pattern"),
        );
        pb.set_message("Verifying API key...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        let result = client.verify_key().await;
        pb.finish_and_clear();
        result
    })?;

    let path = save_to_file(&Credentials { api_key: key })?;
    println!(
        "{} API key verified and saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
    Ok(())
}

fn run_auth_status() -> Result<(), CliError> {
    match credential_source() {
        CredentialSource::Missing => {
            println!("No API key configured.");
            println!("Get one at {CLIENT_FILE_FLOW}");
            println!("then run 'cg-import auth set <key>'.");
            return Ok(());
        }
        source => println!("API key source: {source}"),
    }

    let creds = Credentials::load()?;
    let client = TachiClient::new(creds.api_key)?;
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    rt.block_on(client.verify_key())?;

    println!(
        "{} API key is valid.",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(())
}

fn run_auth_path() -> Result<(), CliError> {
    match cg_import_scraper::config_path() {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err(CliError::config("Could not determine config directory")),
    }
}
