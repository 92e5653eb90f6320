//! Data types for the transfer queue.

use std::fmt;

use chrono::{DateTime, Utc};
use cloudhub_protocol::{CloudAccount, FileItem, TransferStatus};
use serde::{Deserialize, Serialize};

use crate::messages::Language;

/// Default capacity of the event channel.
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Unique identifier of one transfer job (one execution attempt).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Builds `"{unix_millis}-{sequence}-{file_id}"`.
    pub(crate) fn generate(now: DateTime<Utc>, sequence: u64, file_id: &str) -> Self {
        Self(format!("{}-{sequence}-{file_id}", now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Observable state of one transfer job.
///
/// `error` is only set while `status` is `Failed`; `speed` only while it is
/// `InProgress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferJob {
    pub id: JobId,
    pub file: FileItem,
    pub source: CloudAccount,
    pub destination: CloudAccount,
    pub status: TransferStatus,
    /// Percentage, 0–100.
    pub progress: f64,
    /// Bytes per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransferJob {
    /// A fresh pending job.
    pub fn new(id: JobId, file: FileItem, source: CloudAccount, destination: CloudAccount) -> Self {
        Self {
            id,
            file,
            source,
            destination,
            status: TransferStatus::Pending,
            progress: 0.0,
            speed: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

/// Change notification emitted by the engine, in mutation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransferEvent {
    /// A new job entered the queue (at the front).
    Queued { job: TransferJob },
    /// A job's status, progress or speed changed.
    Updated { job: TransferJob },
    /// A job was removed from the queue.
    #[serde(rename_all = "camelCase")]
    Removed { id: JobId },
    /// A paused or failed job was replaced by a fresh attempt.
    #[serde(rename_all = "camelCase")]
    Replaced { old_id: JobId, job: TransferJob },
    /// The source file selection was cleared.
    SelectionCleared,
}

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Language used to render failure messages.
    pub language: Language,
    /// Capacity of the [`TransferEvent`] channel.
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}
