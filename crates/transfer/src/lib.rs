//! File transport: moves one file between accounts, reporting progress and
//! honouring cooperative cancellation.
//!
//! The [`FileTransport`] trait is the seam between the transfer engine and
//! whatever actually moves bytes. [`SimulatedTransport`] is the stand-in used
//! by the hub: it paces progress with a timer and fails at a fixed rate.

mod simulated;
mod transport;

pub use simulated::{SimulatedTransport, SimulationConfig};
pub use transport::{
    CANCELLED_REASON, FileTransport, ProgressCallback, SIMULATED_FAILURE_REASON, TransportError,
    TransportFuture,
};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}
