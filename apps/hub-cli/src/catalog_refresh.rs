//! Keeps the in-memory catalog in step with the transfer queue.
//!
//! [`CatalogLander`] copies every completed job's file into its destination
//! account, whichever account is on screen. [`CatalogRefresher`] re-lists the
//! active destination after a transfer completes.

use std::collections::HashSet;
use std::sync::Arc;

use cloudhub_hub_catalog::CloudCatalog;
use cloudhub_hub_transfers::{JobId, ListingRefresher, RefreshFuture, TransferJob};
use cloudhub_protocol::{CloudAccount, TransferStatus};
use tokio::sync::{Mutex, watch};

/// Path whose listing is re-read after each refresh.
const ROOT: &str = "/";

/// Lands completed transfers in their destination accounts, once per job.
pub struct CatalogLander {
    catalog: Arc<Mutex<CloudCatalog>>,
    landed: Mutex<HashSet<JobId>>,
}

impl CatalogLander {
    pub fn new(catalog: Arc<Mutex<CloudCatalog>>) -> Self {
        Self {
            catalog,
            landed: Mutex::new(HashSet::new()),
        }
    }

    /// Lands every completed job in `jobs` that has not been landed yet.
    /// Returns how many files were written.
    pub async fn land(&self, jobs: &[TransferJob]) -> usize {
        let mut landed = self.landed.lock().await;
        let mut catalog = self.catalog.lock().await;
        let mut written = 0;
        for job in jobs {
            if job.status != TransferStatus::Completed || landed.contains(&job.id) {
                continue;
            }
            match catalog.receive_file(&job.destination.id, &job.file) {
                Ok(_) => written += 1,
                Err(e) => tracing::warn!(job = %job.id, error = %e, "could not land file"),
            }
            landed.insert(job.id.clone());
        }
        written
    }

    /// Lands files from every job-list snapshot until the engine goes away.
    pub async fn run(self: Arc<Self>, mut jobs: watch::Receiver<Vec<TransferJob>>) {
        loop {
            let snapshot = jobs.borrow_and_update().clone();
            let written = self.land(&snapshot).await;
            if written > 0 {
                tracing::debug!(written, "completed transfers landed");
            }
            if jobs.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Re-lists the active destination after a transfer completes.
pub struct CatalogRefresher {
    lander: Arc<CatalogLander>,
    jobs: watch::Receiver<Vec<TransferJob>>,
}

impl CatalogRefresher {
    pub fn new(lander: Arc<CatalogLander>, jobs: watch::Receiver<Vec<TransferJob>>) -> Self {
        Self { lander, jobs }
    }
}

impl ListingRefresher for CatalogRefresher {
    fn refresh<'a>(&'a self, account: &'a CloudAccount) -> RefreshFuture<'a> {
        Box::pin(async move {
            // The landing task may not have seen the latest snapshot yet.
            let snapshot = self.jobs.borrow().clone();
            self.lander.land(&snapshot).await;

            let listing = self.lander.catalog.lock().await.files(&account.id, ROOT);
            tracing::debug!(
                account = %account.id,
                entries = listing.len(),
                "destination listing refreshed"
            );
            Ok(())
        })
    }
}
