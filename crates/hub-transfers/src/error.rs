//! Engine error types.

/// Errors produced while building the engine or refreshing listings.
///
/// Job operations themselves never fail: unknown ids and invalid
/// transitions are silent no-ops.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("transfer error: {0}")]
    Transfer(#[from] cloudhub_transfer::TransferError),

    #[error("listing refresh failed: {0}")]
    Refresh(String),
}
