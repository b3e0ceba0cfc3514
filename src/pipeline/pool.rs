//! Partial-reduce pool
//!
//! `worker_count` reducers drain one shared contribution stream. Whichever
//! reducer grabs the receiver first takes the next item, so every contribution
//! is folded by exactly one reducer. Each reducer keeps a private
//! [`Accumulator`] and emits it once the input closes.

use super::cancel::CancellationSignal;
use super::errors::{PipelineError, PipelineResult};
use super::gauge::TaskGauge;
use super::types::{Accumulator, Contribution};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Output side of the pool: one partial accumulator per reducer, plus the
/// handles needed to join every reducer.
pub struct PartialStream {
    rx: mpsc::Receiver<Accumulator>,
    workers: Vec<JoinHandle<()>>,
}

impl PartialStream {
    /// Number of reducers feeding this stream
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Next partial accumulator, or `None` once every reducer has dropped its sender
    pub async fn recv(&mut self) -> Option<Accumulator> {
        self.rx.recv().await
    }

    /// Join barrier: wait until every reducer has terminated.
    ///
    /// Dropping the receiver first guarantees no reducer stays parked on an
    /// emission nobody will read.
    pub async fn join(self) -> PipelineResult<()> {
        let PartialStream { rx, workers } = self;
        drop(rx);

        for joined in join_all(workers).await {
            joined.map_err(|e| PipelineError::task_failed("reducer", e))?;
        }
        Ok(())
    }
}

/// Spawn `worker_count` reducers over `input`.
///
/// Fails with [`PipelineError::InvalidConfiguration`] before spawning anything
/// when `worker_count` is zero.
pub fn reduce_many(
    input: mpsc::Receiver<Contribution>,
    worker_count: usize,
    buffer: usize,
    signal: &CancellationSignal,
    gauge: &TaskGauge,
) -> PipelineResult<PartialStream> {
    if worker_count == 0 {
        return Err(PipelineError::invalid_configuration(
            "worker_count must be greater than zero",
        ));
    }

    let input = Arc::new(Mutex::new(input));
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let workers = (0..worker_count)
        .map(|worker_id| {
            gauge.spawn(
                "reducer",
                reduce_partial(worker_id, Arc::clone(&input), tx.clone(), signal.clone()),
            )
        })
        .collect();

    // Only reducers hold senders now, so the stream closes when the last one exits.
    drop(tx);

    debug!("Spawned {} reducers", worker_count);
    Ok(PartialStream { rx, workers })
}

async fn reduce_partial(
    worker_id: usize,
    input: Arc<Mutex<mpsc::Receiver<Contribution>>>,
    output: mpsc::Sender<Accumulator>,
    signal: CancellationSignal,
) {
    let mut accumulator = Accumulator::new();
    let mut folded = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = signal.cancelled() => {
                debug!("Reducer {} cancelled after {} contributions", worker_id, folded);
                return;
            }
            next = async {
                let mut rx = input.lock().await;
                rx.recv().await
            } => next,
        };

        let Some(contribution) = next else {
            break;
        };
        accumulator.add(&contribution);
        folded += 1;
    }

    trace!(
        "Reducer {} folded {} contributions into {} keys",
        worker_id,
        folded,
        accumulator.len()
    );

    tokio::select! {
        biased;
        _ = signal.cancelled() => {
            debug!("Reducer {} cancelled before emitting its partial", worker_id);
        }
        sent = output.send(accumulator) => {
            if sent.is_err() {
                debug!("Partial stream dropped before reducer {} could emit", worker_id);
            }
        }
    }
}
