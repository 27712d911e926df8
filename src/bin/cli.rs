//! Paper Bank CLI
//!
//! Local entry point: fetch the catalog, search it, or run the backend
//! service.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use paperbank::{
    catalog::{CatalogSnapshot, CatalogStore, Category, CourseSelection, DriveSource, Query,
              QueryEngine},
    error::{AppError, Result},
    events::LogObserver,
    mail::build_mailer,
    models::Config,
    server,
    storage::SnapshotStore,
    utils::url,
};
use tokio_util::sync::CancellationToken;

/// paperbank - past exam paper catalog
#[derive(Parser, Debug)]
#[command(name = "paperbank", version, about = "Past exam paper catalog and upload relay")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "paperbank.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the catalog from the listing API and cache it
    Fetch,

    /// Search the cached catalog (fetching it first when absent)
    Search {
        /// Free-text query against course code or name
        query: Option<String>,

        /// Exam category filter (all, CAT1, CAT2, FAT)
        #[arg(long, default_value = "all")]
        category: String,

        /// Pin an exact course by its "CODE - Name" label
        #[arg(long)]
        course: Option<String>,

        /// Cap the number of printed results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run the backend service
    Serve,

    /// Validate the configuration file
    Validate,

    /// Show snapshot cache info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Fetch a fresh snapshot and persist it to the cache.
async fn fetch_snapshot(config: &Config, cache: &SnapshotStore) -> Result<CatalogSnapshot> {
    let source = DriveSource::new(config.drive.clone())?;
    let store = CatalogStore::with_observer(source, Arc::new(LogObserver));

    let outcome = store.load(&CancellationToken::new()).await;
    if let Some(error) = &outcome.fetch_error {
        log::warn!("catalog fetch degraded to empty snapshot: {}", error);
    }
    for skipped in &outcome.skipped {
        log::warn!("skipped '{}': {}", skipped.name, skipped.reason);
    }
    log::info!(
        "catalog loaded: {} papers, {} skipped",
        outcome.snapshot.len(),
        outcome.skipped.len()
    );

    cache.save(&outcome.snapshot).await?;
    Ok(outcome.snapshot)
}

/// Load the cached snapshot, fetching a fresh one when no cache exists.
async fn cached_or_fetched(config: &Config, cache: &SnapshotStore) -> Result<CatalogSnapshot> {
    match cache.load().await? {
        Some(data) => {
            log::info!("using cached snapshot of {} papers", data.count);
            Ok(CatalogSnapshot::from_papers(data.papers))
        }
        None => {
            log::info!("no snapshot cache, fetching...");
            fetch_snapshot(config, cache).await
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    let cache = SnapshotStore::new(&config.server.snapshot_dir);

    match cli.command {
        Command::Fetch => {
            config.validate()?;
            fetch_snapshot(&config, &cache).await?;
        }

        Command::Search {
            query,
            category,
            course,
            limit,
        } => {
            let category = Category::parse(&category)
                .ok_or_else(|| AppError::validation(format!("unknown category '{category}'")))?;
            let selection = match course.as_deref() {
                Some(label) => Some(CourseSelection::from_label(label).ok_or_else(|| {
                    AppError::validation(format!("'{label}' is not a \"CODE - Name\" label"))
                })?),
                None => None,
            };

            let snapshot = cached_or_fetched(&config, &cache).await?;
            let engine = QueryEngine::new(&config.display);
            let query = Query {
                text: query.unwrap_or_default(),
                category,
                selection,
            };

            let mut results = engine.filter(&snapshot, &query);
            if let Some(limit) = limit {
                results.truncate(limit);
            }

            if results.is_empty() {
                log::info!("no papers matched");
            }
            for paper in results {
                println!(
                    "{}  {}  {}  Slot {}  {}",
                    paper.course_code,
                    paper.exam_type.label(),
                    paper.semester,
                    paper.slot,
                    url::download_url(&paper.id)
                );
            }
        }

        Command::Serve => {
            config.validate()?;
            let mailer = build_mailer(config.mail.as_ref())?;
            server::serve(config, mailer, Arc::new(LogObserver)).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (listing API, display, server, and mail sections)");
            log::info!(
                "  listing folder: {}  page size: {}",
                config.drive.folder_id,
                config.drive.page_size
            );
            log::info!(
                "  mail: {}",
                if config.mail.is_some() { "enabled" } else { "disabled" }
            );

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Snapshot cache: {}", cache.path().display());
            match cache.load().await? {
                Some(data) => {
                    log::info!("Cached papers: {}", data.count);
                    log::info!("Last updated: {}", data.updated_at);
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
