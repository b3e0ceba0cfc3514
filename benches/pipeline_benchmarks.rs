//! Performance benchmarks for the aggregation pipeline
//! Measures reducer scaling, stream buffer sizing, and payload decoding

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use incident_tally::incidents::{parse, to_json, Incident, Incidents};
use incident_tally::pipeline::{Pipeline, PipelineConfig};
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

const PRIORITIES: [&str; 4] = ["Critical", "High", "Medium", "Low"];

/// Create incidents spread evenly over the known priorities
fn create_incidents(count: usize) -> Vec<Incident> {
    (0..count)
        .map(|i| Incident {
            number: format!("INC{:07}", i),
            assigned_to: format!("team_{}", i % 7),
            description: format!("Synthetic incident {}", i),
            state: "Open".to_string(),
            priority: PRIORITIES[i % PRIORITIES.len()].to_string(),
            severity: format!("Sev{}", i % 4 + 1),
        })
        .collect()
}

fn bench_worker_scaling(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("worker_scaling");
    group.measurement_time(Duration::from_secs(10));

    for workers in &[1, 4, 10, 50] {
        let pipeline = Pipeline::new(PipelineConfig::with_workers(*workers)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("aggregate_10k", workers),
            &pipeline,
            |b, pipeline| {
                b.to_async(&rt).iter_batched(
                    || create_incidents(10_000),
                    |incidents| async move {
                        black_box(pipeline.run(incidents).await.unwrap());
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_buffer_sizing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("buffer_sizing");

    for buffer in &[1, 16, 256] {
        let pipeline = Pipeline::new(PipelineConfig {
            worker_count: 10,
            buffer: *buffer,
        })
        .unwrap();
        group.bench_with_input(
            BenchmarkId::new("aggregate_10k", buffer),
            &pipeline,
            |b, pipeline| {
                b.to_async(&rt).iter_batched(
                    || create_incidents(10_000),
                    |incidents| async move {
                        black_box(pipeline.run(incidents).await.unwrap());
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_payload_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_decoding");

    for size in &[100, 1000, 10_000] {
        let payload = to_json(&Incidents {
            name: "ServiceNowQuery".to_string(),
            report: create_incidents(*size),
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::new("parse", size), &payload, |b, payload| {
            b.iter(|| black_box(parse(payload).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_worker_scaling,
    bench_buffer_sizing,
    bench_payload_decoding
);

criterion_main!(benches);
