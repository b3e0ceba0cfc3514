//! Fan-out/fan-in aggregation pipeline
//!
//! Records are counted by group key in three concurrently running stages:
//!
//! ```text
//! records ──► source ──► [contributions] ──► reducer × N ──► [partials] ──► final reduce ──► caller
//!                 ▲                               ▲                               ▲
//!                 └──────────── CancellationSignal (one per run) ─────────────────┘
//! ```
//!
//! Each run spawns exactly `worker_count + 2` tasks and joins all of them
//! before returning. The result is all-or-nothing: a cancelled run never
//! yields partial sums.

pub mod cancel;
pub mod errors;
pub mod finalize;
pub mod gauge;
pub mod pool;
pub mod source;
pub mod types;

#[cfg(test)]
mod tests;

pub use cancel::{CancelOnDrop, CancellationSignal};
pub use errors::{PipelineError, PipelineResult};
pub use gauge::TaskGauge;
pub use types::{Accumulator, AggregateResult, Contribution, GroupKey, KeyCount};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default reducer count, small enough to bound concurrency for any input size
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Default capacity of the inter-stage streams
pub const DEFAULT_BUFFER: usize = 1;

/// Sizing knobs for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of partial reducers
    #[serde(rename = "workers")]
    pub worker_count: usize,

    /// Capacity of the contribution and partial streams
    pub buffer: usize,
}

impl PipelineConfig {
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.worker_count == 0 {
            return Err(PipelineError::invalid_configuration(
                "worker_count must be greater than zero",
            ));
        }
        if self.buffer == 0 {
            return Err(PipelineError::invalid_configuration(
                "buffer must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            buffer: DEFAULT_BUFFER,
        }
    }
}

/// A validated pipeline that can be run any number of times.
///
/// Every run gets its own cancellation signal; the [`TaskGauge`] is shared
/// across runs so callers can check that nothing outlived a call.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    gauge: TaskGauge,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            gauge: TaskGauge::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn gauge(&self) -> &TaskGauge {
        &self.gauge
    }

    /// Count `records` by group key
    pub async fn run<R>(&self, records: Vec<R>) -> PipelineResult<AggregateResult>
    where
        R: GroupKey + Send + 'static,
    {
        self.run_until(records, &CancellationSignal::new()).await
    }

    /// Count `records` by group key, giving up with
    /// [`PipelineError::Cancelled`] if `external` fires first.
    pub async fn run_until<R>(
        &self,
        records: Vec<R>,
        external: &CancellationSignal,
    ) -> PipelineResult<AggregateResult>
    where
        R: GroupKey + Send + 'static,
    {
        if external.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let signal = CancellationSignal::new();
        // Stops every stage if this future is dropped before the joins below.
        let _guard = signal.cancel_on_drop();

        debug!(
            "Starting pipeline over {} records with {} reducers",
            records.len(),
            self.config.worker_count
        );

        let (contributions, source_task) =
            source::produce(records, self.config.buffer, signal.clone(), &self.gauge);
        let partials = match pool::reduce_many(
            contributions,
            self.config.worker_count,
            self.config.buffer,
            &signal,
            &self.gauge,
        ) {
            Ok(partials) => partials,
            Err(e) => {
                signal.cancel();
                let _ = source_task.await;
                return Err(e);
            }
        };
        let mut final_task = finalize::spawn_finalize(partials, signal.clone(), &self.gauge);

        let finished = tokio::select! {
            biased;
            joined = &mut final_task => Some(
                joined.unwrap_or_else(|e| Err(PipelineError::task_failed("final-reduce", e))),
            ),
            _ = external.cancelled() => None,
        };

        signal.cancel();
        let outcome = match finished {
            Some(outcome) => outcome,
            None => {
                debug!("Pipeline cancelled by caller");
                // Final reduce joins the reducers before it returns.
                let _ = final_task.await;
                Err(PipelineError::Cancelled)
            }
        };
        let source_joined = source_task
            .await
            .map_err(|e| PipelineError::task_failed("source", e));

        let result = outcome?;
        source_joined?;
        Ok(result)
    }
}

/// Count `records` by group key using `worker_count` reducers
pub async fn aggregate<R>(records: Vec<R>, worker_count: usize) -> PipelineResult<AggregateResult>
where
    R: GroupKey + Send + 'static,
{
    Pipeline::new(PipelineConfig::with_workers(worker_count))?
        .run(records)
        .await
}

/// Like [`aggregate`], but abandons the run once `external` is cancelled
pub async fn aggregate_until<R>(
    records: Vec<R>,
    worker_count: usize,
    external: &CancellationSignal,
) -> PipelineResult<AggregateResult>
where
    R: GroupKey + Send + 'static,
{
    Pipeline::new(PipelineConfig::with_workers(worker_count))?
        .run_until(records, external)
        .await
}
