use super::*;
use std::collections::HashMap;

fn priorities(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

fn expected_counts(records: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.clone()).or_insert(0) += 1;
    }
    counts
}

fn as_map(result: &AggregateResult) -> HashMap<String, u64> {
    result
        .iter()
        .map(|pair| (pair.key.clone(), pair.sum))
        .collect()
}

#[tokio::test]
async fn test_counts_by_priority() {
    let result = aggregate(priorities(&["High", "High", "Low"]), 3)
        .await
        .unwrap();

    assert_eq!(
        result.pairs(),
        &[
            KeyCount {
                key: "High".to_string(),
                sum: 2
            },
            KeyCount {
                key: "Low".to_string(),
                sum: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_empty_input_returns_empty_result() {
    let result = aggregate(Vec::<String>::new(), 5).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_zero_workers_fails_before_spawning() {
    let result = aggregate(priorities(&["High"]), 0).await;
    assert!(matches!(
        result,
        Err(PipelineError::InvalidConfiguration { .. })
    ));

    assert!(Pipeline::new(PipelineConfig::with_workers(0)).is_err());
}

#[tokio::test]
async fn test_zero_buffer_is_invalid() {
    let config = PipelineConfig {
        worker_count: 2,
        buffer: 0,
    };
    assert!(matches!(
        Pipeline::new(config),
        Err(PipelineError::InvalidConfiguration { .. })
    ));
}

#[tokio::test]
async fn test_missing_key_is_counted_as_empty_bucket() {
    let result = aggregate(priorities(&["", "High", ""]), 2).await.unwrap();
    assert_eq!(result.get(""), Some(2));
    assert_eq!(result.get("High"), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_result_is_invariant_to_worker_count() {
    let keys = ["Critical", "High", "Medium", "Low", ""];
    let records: Vec<String> = (0..997)
        .map(|i| keys[(i * 7 + i / 3) % keys.len()].to_string())
        .collect();
    let expected = expected_counts(&records);

    let mut results = Vec::new();
    for workers in [1, 3, 50] {
        let result = aggregate(records.clone(), workers).await.unwrap();
        assert_eq!(result.total(), records.len() as u64);
        assert_eq!(as_map(&result), expected);
        results.push(result);
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[tokio::test]
async fn test_run_spawns_worker_count_plus_two_tasks_and_leaks_none() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(4)).unwrap();

    let result = pipeline
        .run(priorities(&["High", "Low", "Low"]))
        .await
        .unwrap();

    assert_eq!(result.total(), 3);
    assert_eq!(pipeline.gauge().spawned(), 6);
    assert_eq!(pipeline.gauge().live(), 0);
}

#[tokio::test]
async fn test_pipeline_is_reusable_across_runs() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(2)).unwrap();

    let first = pipeline.run(priorities(&["High"])).await.unwrap();
    let second = pipeline.run(priorities(&["Low", "Low"])).await.unwrap();

    assert_eq!(first.get("High"), Some(1));
    assert_eq!(second.get("Low"), Some(2));
    assert_eq!(second.get("High"), None);
    assert_eq!(pipeline.gauge().spawned(), 8);
    assert_eq!(pipeline.gauge().live(), 0);
}

#[tokio::test]
async fn test_already_cancelled_signal_spawns_nothing() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(3)).unwrap();
    let external = CancellationSignal::new();
    external.cancel();

    let result = pipeline
        .run_until(priorities(&["High", "Low"]), &external)
        .await;

    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(pipeline.gauge().spawned(), 0);
}

#[tokio::test]
async fn test_cancellation_mid_run_discards_partial_sums() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(3)).unwrap();
    let records: Vec<String> = (0..100_000).map(|i| format!("P{}", i % 4)).collect();
    let external = CancellationSignal::new();

    let run = {
        let pipeline = pipeline.clone();
        let external = external.clone();
        tokio::spawn(async move { pipeline.run_until(records, &external).await })
    };

    tokio::task::yield_now().await;
    external.cancel();

    let result = run.await.unwrap();
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(pipeline.gauge().live(), 0);
}

#[tokio::test]
async fn test_dropping_the_run_cancels_every_stage() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(3)).unwrap();
    let records: Vec<String> = (0..100_000).map(|i| format!("P{}", i % 4)).collect();

    let run = pipeline.run(records);
    let _ = tokio::time::timeout(std::time::Duration::from_millis(1), run).await;

    // If the run was cut short, the drop guard fired; let the stages wind down.
    for _ in 0..100 {
        if pipeline.gauge().live() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(pipeline.gauge().live(), 0);
}

#[test]
fn test_default_config_matches_constants() {
    let config = PipelineConfig::default();
    assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
    assert_eq!(config.buffer, DEFAULT_BUFFER);
    assert!(config.validate().is_ok());
}

/// Record whose key lookup panics at a chosen position
struct Volatile {
    index: usize,
    fuse: usize,
}

impl GroupKey for Volatile {
    fn group_key(&self) -> &str {
        if self.index == self.fuse {
            panic!("record {} has no key", self.index);
        }
        "High"
    }
}

#[tokio::test]
async fn test_panicking_source_fails_the_run_without_partial_sums() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(3)).unwrap();
    let records: Vec<Volatile> = (0..10).map(|index| Volatile { index, fuse: 3 }).collect();

    let result = pipeline.run(records).await;

    match result {
        Err(PipelineError::TaskFailed { stage, source }) => {
            assert_eq!(stage, "source");
            assert!(source.is_panic());
        }
        other => panic!("expected source TaskFailed, got {:?}", other),
    }
    assert_eq!(pipeline.gauge().spawned(), 5);
    assert_eq!(pipeline.gauge().live(), 0);
}

#[tokio::test]
async fn test_panic_on_first_record_still_joins_every_task() {
    let pipeline = Pipeline::new(PipelineConfig::with_workers(4)).unwrap();
    let records: Vec<Volatile> = (0..3).map(|index| Volatile { index, fuse: 0 }).collect();

    let result = pipeline.run(records).await;

    assert!(matches!(
        result,
        Err(PipelineError::TaskFailed {
            stage: "source",
            ..
        })
    ));
    assert_eq!(pipeline.gauge().live(), 0);
}
