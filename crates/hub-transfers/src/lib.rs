//! Transfer job lifecycle for the hub.
//!
//! The [`TransferEngine`] owns every transfer job, drives each one through
//! its state machine and is the only writer of job state. Front-ends observe
//! the [`JobStore`] through [`TransferEngine::subscribe`] (latest snapshot)
//! or [`TransferEngine::take_events`] (every change, in order).
//!
//! # Job state machine
//!
//! ```text
//! Pending ──begin──▶ InProgress ──ok──────────▶ Completed
//!                        │ ──cancelled────────▶ Paused ─┐
//!                        │ ──failed───────────▶ Failed ─┤ resume / retry
//!                        ▼                              ▼
//!                     removed                new job (Pending, new id)
//! ```
//!
//! Jobs run concurrently as independent tokio tasks; a failed or paused job
//! never affects its siblings.

pub mod engine;
pub mod error;
pub mod messages;
pub mod refresh;
pub mod selection;
pub mod store;
pub mod types;

pub use engine::TransferEngine;
pub use error::EngineError;
pub use messages::Language;
pub use refresh::{ListingRefresher, RefreshFuture};
pub use selection::Selection;
pub use store::JobStore;
pub use types::{EngineConfig, JobId, TransferEvent, TransferJob};
