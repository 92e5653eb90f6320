//! Transfer engine: creates jobs, runs them concurrently and applies every
//! state change to the job store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use cloudhub_protocol::{CloudAccount, FileItem, TransferStatus};
use cloudhub_transfer::{FileTransport, ProgressCallback, SimulatedTransport, SimulationConfig};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::EngineError;
use crate::messages::{self, Language};
use crate::refresh::ListingRefresher;
use crate::selection::Selection;
use crate::store::JobStore;
use crate::types::{EngineConfig, JobId, TransferEvent, TransferJob};

/// Owns the transfer queue. Cheap to clone; clones share the same queue.
///
/// Jobs are executed on the ambient tokio runtime, so the mutating
/// operations must be called from within one.
#[derive(Clone)]
pub struct TransferEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Mutex<JobStore>,
    transport: Arc<dyn FileTransport>,
    refresher: Mutex<Option<Arc<dyn ListingRefresher>>>,
    /// Account whose listing is currently shown as the destination.
    active_destination: Mutex<Option<String>>,
    selection: Mutex<Selection>,
    language: Language,
    sequence: AtomicU64,
    events_tx: mpsc::Sender<TransferEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<TransferEvent>>>,
    jobs_tx: watch::Sender<Vec<TransferJob>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TransferEngine {
    /// Creates an engine driving jobs through `transport`.
    pub fn new(transport: Arc<dyn FileTransport>, config: EngineConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        let (jobs_tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(EngineInner {
                store: Mutex::new(JobStore::new()),
                transport,
                refresher: Mutex::new(None),
                active_destination: Mutex::new(None),
                selection: Mutex::new(Selection::new()),
                language: config.language,
                sequence: AtomicU64::new(1),
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
                jobs_tx,
            }),
        }
    }

    /// Creates an engine backed by a [`SimulatedTransport`].
    pub fn simulated(
        simulation: SimulationConfig,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let transport = SimulatedTransport::new(simulation)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Builder form of [`set_refresher`](Self::set_refresher).
    pub fn with_refresher(self, refresher: Arc<dyn ListingRefresher>) -> Self {
        self.set_refresher(refresher);
        self
    }

    /// Installs the listing refresher called after successful transfers.
    pub fn set_refresher(&self, refresher: Arc<dyn ListingRefresher>) {
        *lock(&self.inner.refresher) = Some(refresher);
    }

    /// Sets the account whose listing is on screen (`None` when no
    /// destination is shown).
    pub fn set_active_destination(&self, account_id: Option<String>) {
        *lock(&self.inner.active_destination) = account_id;
    }

    pub fn active_destination(&self) -> Option<String> {
        lock(&self.inner.active_destination).clone()
    }

    pub fn language(&self) -> Language {
        self.inner.language
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Current job list, newest first.
    pub fn jobs(&self) -> Vec<TransferJob> {
        lock(&self.inner.store).snapshot()
    }

    pub fn job(&self, id: &JobId) -> Option<TransferJob> {
        lock(&self.inner.store).get(id).cloned()
    }

    /// Receiver that always holds the latest job list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TransferJob>> {
        self.inner.jobs_tx.subscribe()
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&self) -> Option<mpsc::Receiver<TransferEvent>> {
        lock(&self.inner.events_rx).take()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select_file(&self, file_id: &str) {
        lock(&self.inner.selection).select(file_id);
    }

    pub fn deselect_file(&self, file_id: &str) {
        lock(&self.inner.selection).deselect(file_id);
    }

    pub fn toggle_file(&self, file_id: &str) -> bool {
        lock(&self.inner.selection).toggle(file_id)
    }

    pub fn selected(&self) -> Vec<String> {
        lock(&self.inner.selection).ids()
    }

    pub fn clear_selection(&self) {
        lock(&self.inner.selection).clear();
        self.emit(TransferEvent::SelectionCleared);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queues one job per file and starts them all concurrently.
    ///
    /// No-op (returns no ids) when `files` is empty, either account is
    /// missing, or source and destination are the same account.
    pub fn start_transfers(
        &self,
        files: Vec<FileItem>,
        source: Option<&CloudAccount>,
        destination: Option<&CloudAccount>,
    ) -> Vec<JobId> {
        let (Some(source), Some(destination)) = (source, destination) else {
            debug!("transfer request without source or destination ignored");
            return Vec::new();
        };
        if files.is_empty() {
            debug!("transfer request without files ignored");
            return Vec::new();
        }
        if source.id == destination.id {
            debug!(account = %source.id, "transfer onto the same account ignored");
            return Vec::new();
        }

        let fresh: Vec<(TransferJob, CancellationToken)> = files
            .into_iter()
            .map(|file| {
                let job = self.new_job(file, source.clone(), destination.clone());
                (job, CancellationToken::new())
            })
            .collect();
        let ids: Vec<JobId> = fresh.iter().map(|(job, _)| job.id.clone()).collect();

        self.commit(|store, events| {
            events.extend(
                fresh
                    .iter()
                    .map(|(job, _)| TransferEvent::Queued { job: job.clone() }),
            );
            store.prepend(fresh);
        });
        self.clear_selection();

        info!(
            count = ids.len(),
            source = %source.id,
            destination = %destination.id,
            "transfers queued"
        );
        for id in &ids {
            self.spawn_job(id.clone());
        }
        ids
    }

    /// Requests cancellation of an in-progress job.
    ///
    /// The job turns `Paused` once its transport observes the request.
    /// Returns `false` when there was nothing to cancel: unknown id, job not
    /// in progress, or cancellation already requested.
    pub fn pause_transfer(&self, id: &JobId) -> bool {
        let token = {
            let store = lock(&self.inner.store);
            match store.get(id) {
                Some(job) if job.status == TransferStatus::InProgress => store.cancel_token(id),
                _ => None,
            }
        };
        match token {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                info!(job = %id, "transfer pause requested");
                true
            }
            _ => {
                debug!(job = %id, "pause ignored");
                false
            }
        }
    }

    /// Restarts a paused or failed job as a fresh job.
    ///
    /// The replacement carries the same file and accounts, a new id and a new
    /// cancel token, starts from 0 % and takes the old job's place at the
    /// front of the queue. Returns the new id, or `None` if `id` is unknown
    /// or the job is not paused or failed.
    pub fn resume_transfer(&self, id: &JobId) -> Option<JobId> {
        let new_id = self.commit(|store, events| {
            let old = store.get(id)?;
            if !old.status.can_resume() {
                return None;
            }
            let job = self.new_job(
                old.file.clone(),
                old.source.clone(),
                old.destination.clone(),
            );
            let new_id = job.id.clone();
            store.replace(id, job.clone(), CancellationToken::new());
            events.push(TransferEvent::Replaced {
                old_id: id.clone(),
                job,
            });
            Some(new_id)
        });

        match new_id {
            Some(new_id) => {
                info!(job = %id, replacement = %new_id, "transfer restarted");
                self.spawn_job(new_id.clone());
                Some(new_id)
            }
            None => {
                debug!(job = %id, "resume ignored");
                None
            }
        }
    }

    /// Same as [`resume_transfer`](Self::resume_transfer); offered for failed jobs.
    pub fn retry_transfer(&self, id: &JobId) -> Option<JobId> {
        self.resume_transfer(id)
    }

    /// Removes a job, cancelling it first if it is in progress.
    pub fn remove_transfer(&self, id: &JobId) -> bool {
        let removed = self.commit(|store, events| {
            let status = store.get(id)?.status;
            if status == TransferStatus::InProgress
                && let Some(token) = store.cancel_token(id)
            {
                token.cancel();
            }
            store.remove(id)?;
            events.push(TransferEvent::Removed { id: id.clone() });
            Some(status)
        });

        match removed {
            Some(status) => {
                info!(job = %id, %status, "transfer removed");
                true
            }
            None => {
                debug!(job = %id, "remove ignored");
                false
            }
        }
    }

    /// Removes every completed job. Returns how many were removed.
    pub fn clear_finished(&self) -> usize {
        self.commit(|store, events| {
            let removed = store.remove_status(TransferStatus::Completed);
            events.extend(removed.into_iter().map(|id| TransferEvent::Removed { id }));
            events.len()
        })
    }

    /// Cancels every pending or in-progress job.
    pub fn shutdown(&self) {
        let tokens = lock(&self.inner.store).active_tokens();
        info!(count = tokens.len(), "cancelling active transfers");
        for token in tokens {
            token.cancel();
        }
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    fn spawn_job(&self, id: JobId) {
        tokio::spawn(self.clone().execute_job(id));
    }

    /// Runs one execution attempt. Every outcome ends up in the store;
    /// nothing is returned to the caller.
    async fn execute_job(self, id: JobId) {
        let Some((job, cancel)) = self.commit(|store, events| {
            let (job, cancel) = store.begin(&id)?;
            events.push(TransferEvent::Updated { job: job.clone() });
            Some((job, cancel))
        }) else {
            debug!(job = %id, "job gone before it started");
            return;
        };

        debug!(job = %id, file = %job.file.name, "transfer started");

        let engine = self.clone();
        let progress_id = id.clone();
        let on_progress: ProgressCallback = Box::new(move |percent, speed| {
            engine.record_progress(&progress_id, percent, speed);
        });

        let transport = Arc::clone(&self.inner.transport);
        let outcome = transport.transfer(&job.file, on_progress, cancel).await;

        match outcome {
            Ok(()) => {
                let done = self.commit(|store, events| {
                    let done = store.complete(&id)?;
                    events.push(TransferEvent::Updated { job: done.clone() });
                    Some(done)
                });
                if let Some(done) = done {
                    info!(job = %id, file = %done.file.name, "transfer completed");
                    self.refresh_destination(&done.destination).await;
                }
            }
            Err(e) if e.is_cancellation() => {
                let paused = self.commit(|store, events| {
                    let paused = store.pause(&id)?;
                    events.push(TransferEvent::Updated { job: paused });
                    Some(())
                });
                if paused.is_some() {
                    info!(job = %id, "transfer paused");
                }
            }
            Err(e) => {
                let message = messages::localize(self.inner.language, &e.reason());
                let failed = self.commit(|store, events| {
                    let failed = store.fail(&id, message.clone())?;
                    events.push(TransferEvent::Updated { job: failed });
                    Some(())
                });
                if failed.is_some() {
                    warn!(job = %id, reason = %e, "transfer failed");
                }
            }
        }
    }

    fn record_progress(&self, id: &JobId, percent: f64, speed: f64) {
        self.commit(|store, events| {
            if let Some(job) = store.record_progress(id, percent, speed) {
                trace!(job = %id, progress = job.progress, "transfer progress");
                events.push(TransferEvent::Updated { job });
            }
        });
    }

    async fn refresh_destination(&self, destination: &CloudAccount) {
        let is_active = self.active_destination().as_deref() == Some(destination.id.as_str());
        if !is_active {
            return;
        }
        let refresher = lock(&self.inner.refresher).clone();
        let Some(refresher) = refresher else {
            return;
        };
        debug!(account = %destination.id, "refreshing destination listing");
        if let Err(e) = refresher.refresh(destination).await {
            warn!(account = %destination.id, error = %e, "destination refresh failed");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn new_job(&self, file: FileItem, source: CloudAccount, destination: CloudAccount) -> TransferJob {
        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
        let id = JobId::generate(Utc::now(), sequence, &file.id);
        TransferJob::new(id, file, source, destination)
    }

    /// Applies one mutation under the store lock. If it produced events, the
    /// new snapshot is published and the events are emitted before the lock
    /// is released, so observers see changes in mutation order.
    fn commit<R>(&self, f: impl FnOnce(&mut JobStore, &mut Vec<TransferEvent>) -> R) -> R {
        let mut store = lock(&self.inner.store);
        let mut events = Vec::new();
        let result = f(&mut store, &mut events);
        if !events.is_empty() {
            self.inner.jobs_tx.send_replace(store.snapshot());
            for event in events {
                self.emit(event);
            }
        }
        result
    }

    fn emit(&self, event: TransferEvent) {
        match self.inner.events_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("event channel full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
