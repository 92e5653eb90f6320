//! CloudHub headless hub entry point.

mod catalog_refresh;
mod config;
mod readout;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use cloudhub_hub_catalog::CloudCatalog;
use cloudhub_hub_transfers::{JobId, Language, TransferEngine, TransferJob};
use cloudhub_protocol::{CloudAccount, LOCAL_ACCOUNT_ID, TransferStatus};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::catalog_refresh::{CatalogLander, CatalogRefresher};
use crate::config::HubConfig;

const DEFAULT_LOG_FILTER: &str = "info,cloudhub=debug";

#[derive(Parser)]
#[command(name = "cloudhub-hub", version, about = "Transfer files between cloud accounts")]
struct Cli {
    /// Account to transfer from ("local" for this computer).
    #[arg(long, default_value = "acc_1")]
    source: String,

    /// Account to transfer to.
    #[arg(long, default_value = "acc_2")]
    destination: String,

    /// Folder in the source account whose files are transferred.
    #[arg(long, default_value = "/")]
    path: String,

    /// Pause the first job after this many milliseconds, then resume it.
    #[arg(long)]
    pause_after_ms: Option<u64>,

    /// Language for failure messages (en, zh). Overrides the config file.
    #[arg(long)]
    language: Option<Language>,

    /// Configuration file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting CloudHub");

    let hub_config = match HubConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            HubConfig::default()
        }
    };
    let language = cli.language.unwrap_or(hub_config.language);

    let catalog = Arc::new(Mutex::new(CloudCatalog::seeded()));
    let (source, destination, files) = {
        let catalog = catalog.lock().await;
        let source = resolve_account(&catalog, &cli.source)?;
        let destination = resolve_account(&catalog, &cli.destination)?;
        let files = catalog.files(&source.id, &cli.path);
        (source, destination, files)
    };
    if files.is_empty() {
        bail!("nothing to transfer in {}:{}", source.id, cli.path);
    }

    let engine = TransferEngine::simulated(
        hub_config.simulation_config(),
        hub_config.engine_config(language),
    )?;
    let lander = Arc::new(CatalogLander::new(Arc::clone(&catalog)));
    tokio::spawn(Arc::clone(&lander).run(engine.subscribe()));
    let refresher = CatalogRefresher::new(Arc::clone(&lander), engine.subscribe());
    let engine = engine.with_refresher(Arc::new(refresher));
    engine.set_active_destination(Some(destination.id.clone()));

    let mut events = engine
        .take_events()
        .context("transfer event receiver already taken")?;
    let mut jobs = engine.subscribe();

    let ids = engine.start_transfers(files, Some(&source), Some(&destination));
    if ids.is_empty() {
        bail!(
            "no transfers started from {} to {}",
            source.id,
            destination.id
        );
    }

    if let (Some(ms), Some(first)) = (cli.pause_after_ms, ids.first()) {
        tokio::spawn(pause_then_resume(
            engine.clone(),
            first.clone(),
            Duration::from_millis(ms),
        ));
    }

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                println!("{}", readout::format_event(&event));
            }
            changed = jobs.changed() => {
                if changed.is_err() || all_finished(&jobs.borrow_and_update()) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    engine.shutdown();
    while let Ok(event) = events.try_recv() {
        println!("{}", readout::format_event(&event));
    }

    let finished = engine.jobs();
    lander.land(&finished).await;
    let summary = QueueSummary::of(&finished);
    tracing::info!(
        completed = summary.completed,
        failed = summary.failed,
        paused = summary.paused,
        unfinished = summary.unfinished,
        "transfers finished"
    );

    let listing = catalog.lock().await.files(&destination.id, "/");
    for file in listing {
        println!("{}{}", file.path, file.name);
    }
    Ok(())
}

fn resolve_account(catalog: &CloudCatalog, id: &str) -> anyhow::Result<CloudAccount> {
    if id == LOCAL_ACCOUNT_ID {
        return Ok(CloudAccount::local_computer());
    }
    catalog
        .account(id)
        .cloned()
        .with_context(|| format!("unknown account {id}"))
}

/// Every job has reached Completed or Failed.
fn all_finished(jobs: &[TransferJob]) -> bool {
    !jobs.is_empty()
        && jobs
            .iter()
            .all(|j| matches!(j.status, TransferStatus::Completed | TransferStatus::Failed))
}

/// Job counts by outcome at exit.
#[derive(Debug, Default, PartialEq, Eq)]
struct QueueSummary {
    completed: usize,
    failed: usize,
    paused: usize,
    /// Pending or still in progress (interrupted before they settled).
    unfinished: usize,
}

impl QueueSummary {
    fn of(jobs: &[TransferJob]) -> Self {
        let mut summary = Self::default();
        for job in jobs {
            match job.status {
                TransferStatus::Completed => summary.completed += 1,
                TransferStatus::Failed => summary.failed += 1,
                TransferStatus::Paused => summary.paused += 1,
                TransferStatus::Pending | TransferStatus::InProgress => summary.unfinished += 1,
            }
        }
        summary
    }
}

async fn pause_then_resume(engine: TransferEngine, id: JobId, after: Duration) {
    tokio::time::sleep(after).await;
    if !engine.pause_transfer(&id) {
        tracing::info!(job = %id, "job not in progress, skipping pause");
        return;
    }

    let mut jobs = engine.subscribe();
    let paused = jobs
        .wait_for(|jobs| {
            jobs.iter()
                .any(|j| j.id == id && j.status != TransferStatus::InProgress)
        })
        .await
        .map(|jobs| {
            jobs.iter()
                .any(|j| j.id == id && j.status == TransferStatus::Paused)
        })
        .unwrap_or(false);

    if paused && let Some(new_id) = engine.resume_transfer(&id) {
        tracing::info!(job = %id, replacement = %new_id, "job resumed");
    }
}
