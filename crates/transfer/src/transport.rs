use std::future::Future;
use std::pin::Pin;

use cloudhub_protocol::FileItem;
use tokio_util::sync::CancellationToken;

/// Reason string carried by a cancelled transfer.
pub const CANCELLED_REASON: &str = "errorTransferPaused";

/// Reason string carried by a simulated random failure.
pub const SIMULATED_FAILURE_REASON: &str = "errorSimulatedFailure";

/// Callback invoked with `(percent, bytes_per_second)`.
pub type ProgressCallback = Box<dyn Fn(f64, f64) + Send + Sync>;

/// Boxed future returned by [`FileTransport::transfer`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Why a transfer did not complete.
///
/// The `Display` form is the reason string, which doubles as a message
/// catalog key for front-ends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The cancellation token fired before the transfer finished.
    #[error("errorTransferPaused")]
    Cancelled,

    #[error("errorSimulatedFailure")]
    SimulatedFailure,

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Maps a reason string back to an error.
    pub fn from_reason(reason: &str) -> Self {
        match reason {
            CANCELLED_REASON => Self::Cancelled,
            SIMULATED_FAILURE_REASON => Self::SimulatedFailure,
            other => Self::Other(other.to_string()),
        }
    }

    /// The reason string (also the message catalog key).
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Returns `true` for the cancellation sentinel, including wrapped
    /// reasons that embed it.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::SimulatedFailure => false,
            Self::Other(reason) => reason.contains(CANCELLED_REASON),
        }
    }
}

/// Moves a single file.
///
/// Implementations must call `on_progress` with non-decreasing percentages,
/// stop promptly once `cancel` fires (rejecting with
/// [`TransportError::Cancelled`]), and must not invoke `on_progress` after
/// the returned future completes.
pub trait FileTransport: Send + Sync {
    fn transfer<'a>(
        &'a self,
        file: &'a FileItem,
        on_progress: ProgressCallback,
        cancel: CancellationToken,
    ) -> TransportFuture<'a>;
}
