//! The job store: the ordered list of transfer jobs and their cancel tokens.
//!
//! Every write is a targeted merge into the one record matching a job id,
//! and every transition checks the current status first, so late or
//! duplicate updates from a job's transport cannot clobber other jobs or
//! break the status invariants.

use cloudhub_protocol::TransferStatus;
use tokio_util::sync::CancellationToken;

use crate::types::{JobId, TransferJob};

struct JobEntry {
    job: TransferJob,
    cancel: CancellationToken,
}

/// Transfer jobs, newest first.
#[derive(Default)]
pub struct JobStore {
    entries: Vec<JobEntry>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts jobs at the front, keeping their relative order.
    pub fn prepend(&mut self, jobs: Vec<(TransferJob, CancellationToken)>) {
        let mut fresh: Vec<JobEntry> = jobs
            .into_iter()
            .map(|(job, cancel)| JobEntry { job, cancel })
            .collect();
        fresh.append(&mut self.entries);
        self.entries = fresh;
    }

    pub fn get(&self, id: &JobId) -> Option<&TransferJob> {
        self.entry(id).map(|e| &e.job)
    }

    /// The cancel token of a job, if it exists.
    pub fn cancel_token(&self, id: &JobId) -> Option<CancellationToken> {
        self.entry(id).map(|e| e.cancel.clone())
    }

    /// Copy of the visible list.
    pub fn snapshot(&self) -> Vec<TransferJob> {
        self.entries.iter().map(|e| e.job.clone()).collect()
    }

    /// Pending → InProgress. Returns the updated job and its token.
    pub fn begin(&mut self, id: &JobId) -> Option<(TransferJob, CancellationToken)> {
        let entry = self.entry_mut(id)?;
        if entry.job.status != TransferStatus::Pending {
            return None;
        }
        entry.job.status = TransferStatus::InProgress;
        entry.job.progress = 0.0;
        entry.job.speed = None;
        entry.job.error = None;
        Some((entry.job.clone(), entry.cancel.clone()))
    }

    /// Merges a progress report into an in-progress job.
    ///
    /// The percentage is clamped to 0–100 and never moves backwards.
    pub fn record_progress(&mut self, id: &JobId, percent: f64, speed: f64) -> Option<TransferJob> {
        let job = self.in_progress_mut(id)?;
        if percent.is_finite() {
            job.progress = job.progress.max(percent.clamp(0.0, 100.0));
        }
        if speed.is_finite() {
            job.speed = Some(speed.max(0.0));
        }
        Some(job.clone())
    }

    /// InProgress → Completed.
    pub fn complete(&mut self, id: &JobId) -> Option<TransferJob> {
        let job = self.in_progress_mut(id)?;
        job.status = TransferStatus::Completed;
        job.progress = 100.0;
        job.speed = None;
        Some(job.clone())
    }

    /// InProgress → Failed with a display message.
    pub fn fail(&mut self, id: &JobId, message: String) -> Option<TransferJob> {
        let job = self.in_progress_mut(id)?;
        job.status = TransferStatus::Failed;
        job.speed = None;
        job.error = Some(message);
        Some(job.clone())
    }

    /// InProgress → Paused.
    pub fn pause(&mut self, id: &JobId) -> Option<TransferJob> {
        let job = self.in_progress_mut(id)?;
        job.status = TransferStatus::Paused;
        job.speed = None;
        Some(job.clone())
    }

    /// Removes a job regardless of status.
    pub fn remove(&mut self, id: &JobId) -> Option<(TransferJob, CancellationToken)> {
        let pos = self.entries.iter().position(|e| e.job.id == *id)?;
        let entry = self.entries.remove(pos);
        Some((entry.job, entry.cancel))
    }

    /// Removes `old_id` and inserts `job` at the front.
    ///
    /// Returns `false` (and changes nothing) if `old_id` is unknown.
    pub fn replace(&mut self, old_id: &JobId, job: TransferJob, cancel: CancellationToken) -> bool {
        if self.remove(old_id).is_none() {
            return false;
        }
        self.entries.insert(0, JobEntry { job, cancel });
        true
    }

    /// Removes every job in `status`, returning their ids.
    pub fn remove_status(&mut self, status: TransferStatus) -> Vec<JobId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if e.job.status == status {
                removed.push(e.job.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Tokens of every pending or in-progress job.
    pub fn active_tokens(&self) -> Vec<CancellationToken> {
        self.entries
            .iter()
            .filter(|e| e.job.status.is_active())
            .map(|e| e.cancel.clone())
            .collect()
    }

    fn entry(&self, id: &JobId) -> Option<&JobEntry> {
        self.entries.iter().find(|e| e.job.id == *id)
    }

    fn entry_mut(&mut self, id: &JobId) -> Option<&mut JobEntry> {
        self.entries.iter_mut().find(|e| e.job.id == *id)
    }

    fn in_progress_mut(&mut self, id: &JobId) -> Option<&mut TransferJob> {
        self.entry_mut(id)
            .map(|e| &mut e.job)
            .filter(|job| job.status == TransferStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudhub_protocol::{CloudAccount, CloudProvider, FileItem, FileType};

    fn job(id: &str) -> TransferJob {
        TransferJob::new(
            JobId::from(id),
            FileItem {
                id: format!("file-{id}"),
                name: format!("{id}.bin"),
                file_type: FileType::File,
                size: 1024,
                modified: Utc::now(),
                path: "/".into(),
            },
            CloudAccount {
                id: "acc_1".into(),
                provider: CloudProvider::GoogleDrive,
                email: "a@example.com".into(),
            },
            CloudAccount {
                id: "acc_2".into(),
                provider: CloudProvider::Dropbox,
                email: "b@example.com".into(),
            },
        )
    }

    fn store_with(ids: &[&str]) -> JobStore {
        let mut store = JobStore::new();
        store.prepend(
            ids.iter()
                .map(|id| (job(id), CancellationToken::new()))
                .collect(),
        );
        store
    }

    fn ids(store: &JobStore) -> Vec<String> {
        store
            .snapshot()
            .iter()
            .map(|j| j.id.to_string())
            .collect()
    }

    fn assert_invariants(job: &TransferJob) {
        assert_eq!(job.error.is_some(), job.status == TransferStatus::Failed);
        if job.status != TransferStatus::InProgress {
            assert!(job.speed.is_none());
        }
        assert!((0.0..=100.0).contains(&job.progress));
    }

    #[test]
    fn prepend_puts_newest_batch_first() {
        let mut store = store_with(&["a", "b"]);
        store.prepend(vec![(job("c"), CancellationToken::new())]);
        assert_eq!(ids(&store), vec!["c", "a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn begin_only_from_pending() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        let (started, _) = store.begin(&id).unwrap();
        assert_eq!(started.status, TransferStatus::InProgress);
        assert!(store.begin(&id).is_none());
        assert!(store.begin(&JobId::from("missing")).is_none());
    }

    #[test]
    fn progress_requires_in_progress() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        assert!(store.record_progress(&id, 10.0, 5.0).is_none());
        assert_eq!(store.get(&id).unwrap().progress, 0.0);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        store.begin(&id);

        assert_eq!(store.record_progress(&id, 40.0, 100.0).unwrap().progress, 40.0);
        assert_eq!(store.record_progress(&id, 20.0, 100.0).unwrap().progress, 40.0);
        assert_eq!(store.record_progress(&id, 250.0, 100.0).unwrap().progress, 100.0);
        let job = store.record_progress(&id, f64::NAN, -3.0).unwrap();
        assert_eq!(job.progress, 100.0);
        assert_eq!(job.speed, Some(0.0));
    }

    #[test]
    fn complete_sets_100_and_clears_speed() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        store.begin(&id);
        store.record_progress(&id, 60.0, 2048.0);
        let done = store.complete(&id).unwrap();
        assert_eq!(done.status, TransferStatus::Completed);
        assert_eq!(done.progress, 100.0);
        assert_invariants(&done);

        // Terminal: later reports are ignored.
        assert!(store.record_progress(&id, 10.0, 1.0).is_none());
        assert!(store.fail(&id, "late".into()).is_none());
        assert!(store.pause(&id).is_none());
    }

    #[test]
    fn fail_sets_error_only_when_failed() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        assert!(store.fail(&id, "boom".into()).is_none());
        assert!(store.get(&id).unwrap().error.is_none());

        store.begin(&id);
        store.record_progress(&id, 30.0, 10.0);
        let failed = store.fail(&id, "boom".into()).unwrap();
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert_eq!(failed.progress, 30.0);
        assert_invariants(&failed);
    }

    #[test]
    fn pause_keeps_progress_without_error() {
        let mut store = store_with(&["a"]);
        let id = JobId::from("a");
        store.begin(&id);
        store.record_progress(&id, 50.0, 10.0);
        let paused = store.pause(&id).unwrap();
        assert_eq!(paused.status, TransferStatus::Paused);
        assert_eq!(paused.progress, 50.0);
        assert_invariants(&paused);
    }

    #[test]
    fn updates_do_not_touch_sibling_jobs() {
        let mut store = store_with(&["a", "b"]);
        let a = JobId::from("a");
        let b = JobId::from("b");
        store.begin(&a);
        store.begin(&b);
        store.record_progress(&a, 70.0, 1.0);
        store.record_progress(&b, 20.0, 2.0);
        store.fail(&b, "x".into());

        let ja = store.get(&a).unwrap();
        assert_eq!(ja.status, TransferStatus::InProgress);
        assert_eq!(ja.progress, 70.0);
        assert_eq!(ja.speed, Some(1.0));
        assert_eq!(store.get(&b).unwrap().status, TransferStatus::Failed);
    }

    #[test]
    fn remove_any_status() {
        let mut store = store_with(&["a", "b"]);
        let a = JobId::from("a");
        store.begin(&a);
        store.complete(&a);
        assert!(store.remove(&a).is_some());
        assert!(store.remove(&JobId::from("b")).is_some());
        assert!(store.remove(&a).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn replace_moves_new_job_to_front() {
        let mut store = store_with(&["a", "b", "c"]);
        assert!(store.replace(&JobId::from("b"), job("d"), CancellationToken::new()));
        assert_eq!(ids(&store), vec!["d", "a", "c"]);
        assert!(!store.replace(&JobId::from("zzz"), job("e"), CancellationToken::new()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_status_only_matching() {
        let mut store = store_with(&["a", "b", "c"]);
        for id in ["a", "c"] {
            let id = JobId::from(id);
            store.begin(&id);
            store.complete(&id);
        }
        let removed = store.remove_status(TransferStatus::Completed);
        assert_eq!(removed, vec![JobId::from("a"), JobId::from("c")]);
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn active_tokens_skip_finished_jobs() {
        let mut store = store_with(&["a", "b", "c"]);
        let a = JobId::from("a");
        store.begin(&a);
        store.complete(&a);
        store.begin(&JobId::from("b"));
        assert_eq!(store.active_tokens().len(), 2);
    }

    #[test]
    fn cancel_token_is_per_job() {
        let store = store_with(&["a", "b"]);
        let ta = store.cancel_token(&JobId::from("a")).unwrap();
        let tb = store.cancel_token(&JobId::from("b")).unwrap();
        ta.cancel();
        assert!(ta.is_cancelled());
        assert!(!tb.is_cancelled());
        assert!(store.cancel_token(&JobId::from("missing")).is_none());
    }
}
