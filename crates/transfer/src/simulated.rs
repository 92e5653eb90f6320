use std::time::Duration;

use cloudhub_protocol::FileItem;
use rand::Rng;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::TransferError;
use crate::transport::{FileTransport, ProgressCallback, TransportError, TransportFuture};

/// Shortest tick the simulation will schedule.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Pacing and failure parameters for [`SimulatedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Lower bound of the total transfer time.
    pub min_duration: Duration,
    /// Upper bound of the total transfer time.
    pub max_duration: Duration,
    /// Number of progress reports per transfer.
    pub steps: u32,
    /// Probability (0.0–1.0) that a transfer fails on its last step.
    pub failure_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_secs(2),
            max_duration: Duration::from_secs(5),
            steps: 10,
            failure_rate: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.steps == 0 {
            return Err(TransferError::InvalidConfig("steps must be at least 1".into()));
        }
        if self.min_duration.is_zero() {
            return Err(TransferError::InvalidConfig(
                "min_duration must be non-zero".into(),
            ));
        }
        if self.min_duration > self.max_duration {
            return Err(TransferError::InvalidConfig(format!(
                "min_duration {:?} exceeds max_duration {:?}",
                self.min_duration, self.max_duration
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(TransferError::InvalidConfig(format!(
                "failure_rate {} outside 0.0..=1.0",
                self.failure_rate
            )));
        }
        Ok(())
    }
}

/// Random choices for one transfer, drawn up front so the future stays `Send`.
struct SimulationPlan {
    duration: Duration,
    jitters: Vec<f64>,
    fails: bool,
}

/// Transport that pretends to move bytes on a timer.
pub struct SimulatedTransport {
    config: SimulationConfig,
}

impl SimulatedTransport {
    pub fn new(config: SimulationConfig) -> Result<Self, TransferError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn plan(&self) -> SimulationPlan {
        let mut rng = rand::thread_rng();
        let duration = rng.gen_range(self.config.min_duration..=self.config.max_duration);
        let jitters = (0..self.config.steps)
            .map(|_| rng.gen_range(0.8..1.2))
            .collect();
        let fails = rng.gen_bool(self.config.failure_rate);
        SimulationPlan {
            duration,
            jitters,
            fails,
        }
    }

    async fn run(
        &self,
        file: &FileItem,
        on_progress: ProgressCallback,
        cancel: CancellationToken,
    ) -> Result<(), TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let plan = self.plan();
        let steps = self.config.steps;
        let tick = (plan.duration / steps).max(MIN_TICK);
        let nominal_speed = file.size as f64 / plan.duration.as_secs_f64();
        debug!(
            file = %file.name,
            duration_ms = plan.duration.as_millis() as u64,
            will_fail = plan.fails,
            "simulated transfer started"
        );

        // The ticker lives in this frame, so every return path stops it.
        let mut ticker = interval_at(Instant::now() + tick, tick);

        for (i, jitter) in plan.jitters.iter().enumerate() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(file = %file.name, "simulated transfer cancelled");
                    return Err(TransportError::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            let step = i as u32 + 1;
            if step == steps && plan.fails {
                debug!(file = %file.name, "simulated transfer failed");
                return Err(TransportError::SimulatedFailure);
            }

            let percent = if step == steps {
                100.0
            } else {
                f64::from(step) * 100.0 / f64::from(steps)
            };
            trace!(file = %file.name, percent, "simulated progress");
            on_progress(percent, nominal_speed * jitter);
        }

        Ok(())
    }
}

impl FileTransport for SimulatedTransport {
    fn transfer<'a>(
        &'a self,
        file: &'a FileItem,
        on_progress: ProgressCallback,
        cancel: CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(self.run(file, on_progress, cancel))
    }
}
