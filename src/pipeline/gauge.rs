//! Task accounting for pipeline stages

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug, Default)]
struct Counters {
    spawned: AtomicUsize,
    live: AtomicUsize,
}

/// Counts the tasks a pipeline has spawned and how many are still alive.
///
/// A task stops counting as live as soon as its future is dropped, which tokio
/// does before waking whoever awaits its `JoinHandle`.
#[derive(Debug, Clone, Default)]
pub struct TaskGauge {
    counters: Arc<Counters>,
}

impl TaskGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the current runtime and track it under `stage`
    pub fn spawn<F>(&self, stage: &'static str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.counters.spawned.fetch_add(1, Ordering::AcqRel);
        self.counters.live.fetch_add(1, Ordering::AcqRel);
        let guard = LiveTask {
            counters: Arc::clone(&self.counters),
            stage,
        };

        tokio::spawn(async move {
            let _guard = guard;
            future.await
        })
    }

    /// Total tasks spawned through this gauge
    pub fn spawned(&self) -> usize {
        self.counters.spawned.load(Ordering::Acquire)
    }

    /// Tasks spawned through this gauge that have not yet terminated
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Acquire)
    }
}

struct LiveTask {
    counters: Arc<Counters>,
    stage: &'static str,
}

impl Drop for LiveTask {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::AcqRel);
        trace!("{} task exited", self.stage);
    }
}
