//! postwatch CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use postwatch::{
    delivery,
    error::{AppError, Result},
    models::{Config, Variant},
    pipeline::{Pipeline, Poller},
    sources::GitHubDiffSource,
    storage::LocalStorage,
    utils::{self, http},
};

/// postwatch - job listing watcher
#[derive(Parser, Debug)]
#[command(
    name = "postwatch",
    version,
    about = "Posts new openings added to job-listing tables"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "postwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll every document once
    Poll,

    /// Poll forever on the configured interval
    Watch,

    /// Run the row pipeline over a local file of table rows
    Parse {
        /// File with one table row per line
        #[arg(long)]
        file: PathBuf,

        /// Table layout: summer, co-op or new-grad
        #[arg(long, default_value = "summer")]
        variant: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Exit with an error if any row is malformed
        #[arg(long)]
        strict: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show checkpoints and seen-set size
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Configuration from {}", cli.config.display());

    let storage = LocalStorage::new(&config.storage.dir);

    match cli.command {
        Command::Poll | Command::Watch => {
            config.validate()?;

            let client = http::create_async_client(&config.watcher)?;
            let source = GitHubDiffSource::new(client.clone(), &config.watcher.api_base)?;
            let sink = delivery::sink_for(&config.delivery, client);
            let poller = Poller::new(&config, &source, &storage, &storage, sink.as_ref())?;

            if matches!(cli.command, Command::Watch) {
                poller.watch().await?;
            } else {
                let summary = poller.poll_once(Utc::now().date_naive()).await;
                if summary.failed > 0 {
                    return Err(AppError::source(
                        "poll",
                        format!("{} of {} documents failed", summary.failed, summary.documents),
                    ));
                }
            }
        }

        Command::Parse {
            file,
            variant,
            date,
            strict,
        } => {
            let variant = Variant::from_name(&variant)
                .ok_or_else(|| AppError::config(format!("Unknown variant '{variant}'")))?;
            let reference = date.unwrap_or_else(|| Utc::now().date_naive());
            let content = std::fs::read_to_string(&file)?;

            let pipeline = Pipeline::new(&config.filters)?;
            let report = pipeline.process_batch_report(content.lines(), &variant, reference);

            for payload in &report.payloads {
                println!("{}", payload.text);
            }

            let stats = &report.stats;
            utils::log::summary(
                &file.display().to_string(),
                &[
                    ("Rows", stats.rows.to_string()),
                    ("Accepted", stats.accepted.to_string()),
                    ("Closed", stats.closed.to_string()),
                    ("No domestic location", stats.no_domestic_location.to_string()),
                    ("Stale", stats.stale.to_string()),
                    ("Future", stats.future.to_string()),
                    ("Duplicate", stats.duplicate.to_string()),
                    ("Malformed", stats.malformed.to_string()),
                ],
            );

            if strict {
                report.ensure_well_formed()?;
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            Pipeline::new(&config.filters)?;
            log::info!(
                "✓ Config OK ({} documents, {} destinations)",
                config.documents.len(),
                config.delivery.active_destinations().len()
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", storage.root().display());

            let checkpoints = storage.load_checkpoints().await?;
            for document in &config.documents {
                match checkpoints.get(&document.name) {
                    Some(checkpoint) => log::info!(
                        "{}: {} (saved {})",
                        document.name,
                        checkpoint.revision,
                        checkpoint.saved_at
                    ),
                    None => log::info!("{}: no checkpoint yet", document.name),
                }
            }

            let seen = storage.load_seen().await?;
            log::info!("Seen links: {}", seen.entries.len());
            if let Some(updated) = seen.updated_at {
                log::info!("Last recorded: {}", updated);
            }
        }
    }

    Ok(())
}
