//! Final-reduce stage: fold every partial accumulator into the aggregate

use super::cancel::CancellationSignal;
use super::errors::{PipelineError, PipelineResult};
use super::gauge::TaskGauge;
use super::pool::PartialStream;
use super::types::{Accumulator, AggregateResult};
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the final-reduce task
pub fn spawn_finalize(
    partials: PartialStream,
    signal: CancellationSignal,
    gauge: &TaskGauge,
) -> JoinHandle<PipelineResult<AggregateResult>> {
    gauge.spawn("final-reduce", finalize(partials, signal))
}

/// Drain `partials` until the pool is done, then fold into one result.
///
/// Completion is only declared after the pool's join barrier, so every reducer
/// has terminated by the time this returns. On cancellation the partial sums
/// are discarded and [`PipelineError::Cancelled`] is returned.
pub async fn finalize(
    mut partials: PartialStream,
    signal: CancellationSignal,
) -> PipelineResult<AggregateResult> {
    let expected = partials.worker_count();
    let mut total = Accumulator::new();
    let mut received = 0usize;

    let drained = loop {
        tokio::select! {
            biased;
            _ = signal.cancelled() => break Err(PipelineError::Cancelled),
            next = partials.recv() => match next {
                Some(partial) => {
                    received += 1;
                    total.merge(partial);
                }
                None => break Ok(()),
            },
        }
    };

    let joined = partials.join().await;
    drained?;
    joined?;

    debug!(
        "Final reduce folded {} of {} partials into {} keys",
        received,
        expected,
        total.len()
    );
    Ok(total.into_result())
}
