//! Source stage: records in, one contribution per record out

use super::cancel::CancellationSignal;
use super::gauge::TaskGauge;
use super::types::{Contribution, GroupKey};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Start the source task.
///
/// The returned stream yields exactly one [`Contribution`] per record, in input
/// order, and closes after the last one or as soon as `signal` is cancelled.
/// An empty input closes the stream without yielding anything.
pub fn produce<R>(
    records: Vec<R>,
    buffer: usize,
    signal: CancellationSignal,
    gauge: &TaskGauge,
) -> (mpsc::Receiver<Contribution>, JoinHandle<()>)
where
    R: GroupKey + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let handle = gauge.spawn("source", emit(records, tx, signal));
    (rx, handle)
}

async fn emit<R: GroupKey>(
    records: Vec<R>,
    tx: mpsc::Sender<Contribution>,
    signal: CancellationSignal,
) {
    let total = records.len();

    for (index, record) in records.into_iter().enumerate() {
        let contribution = Contribution::unit(record.group_key());

        tokio::select! {
            biased;
            _ = signal.cancelled() => {
                debug!("Source cancelled after {} of {} records", index, total);
                return;
            }
            sent = tx.send(contribution) => {
                if sent.is_err() {
                    debug!("Contribution stream dropped by readers after {} of {} records", index, total);
                    return;
                }
            }
        }
    }

    debug!("Source emitted {} contributions", total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_emits_one_contribution_per_record_in_order() {
        let gauge = TaskGauge::new();
        let (mut rx, handle) = produce(
            vec!["High", "Low", "High"],
            1,
            CancellationSignal::new(),
            &gauge,
        );

        let mut keys = Vec::new();
        while let Some(contribution) = rx.recv().await {
            let pairs: Vec<(String, u64)> = contribution
                .iter()
                .map(|(key, count)| (key.to_string(), count))
                .collect();
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].1, 1);
            keys.push(pairs[0].0.clone());
        }

        handle.await.unwrap();
        assert_eq!(keys, vec!["High", "Low", "High"]);
        assert_eq!(gauge.live(), 0);
    }

    #[tokio::test]
    async fn test_empty_input_closes_immediately() {
        let gauge = TaskGauge::new();
        let (mut rx, handle) = produce(Vec::<String>::new(), 1, CancellationSignal::new(), &gauge);

        assert!(rx.recv().await.is_none());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_unblocks_pending_send() {
        let gauge = TaskGauge::new();
        let signal = CancellationSignal::new();
        let (_rx, handle) = produce(vec!["a", "b", "c", "d"], 1, signal.clone(), &gauge);

        // Nobody reads, so the source parks on its second send.
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        signal.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("source should exit after cancellation")
            .unwrap();
        assert_eq!(gauge.live(), 0);
    }

    #[tokio::test]
    async fn test_source_exits_when_readers_go_away() {
        let gauge = TaskGauge::new();
        let (rx, handle) = produce(vec!["a", "b", "c"], 1, CancellationSignal::new(), &gauge);
        drop(rx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("source should exit once the stream is dropped")
            .unwrap();
    }
}
