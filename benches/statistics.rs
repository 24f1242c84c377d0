//! 统计计算基准测试
//!
//! 测试百分位计算、结果汇总和报告序列化的性能

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use stability_probe::probe::executor::classify_response;
use stability_probe::probe::{percentile, summarize, Outcome};
use stability_probe::report::{assemble_report, RunSummary, RunTiming};
use std::hint::black_box;
use std::time::Duration;

/// 构造一份混合成功和失败的结果日志
fn sample_outcomes(count: usize) -> Vec<Outcome> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let latency = Duration::from_micros(5_000 + (i as u64 * 7_919) % 40_000);
            if i % 10 == 0 {
                Outcome::transport_failure(now, latency, "Request timeout".to_string())
            } else {
                Outcome::success(now, 200, latency)
            }
        })
        .collect()
}

/// 百分位计算基准测试
fn percentile_benchmark(c: &mut Criterion) {
    let mut sorted: Vec<f64> = (0..10_000).map(|i| (i % 997) as f64 * 0.37).collect();
    sorted.sort_by(f64::total_cmp);

    c.bench_function("percentile_p95_10k", |b| {
        b.iter(|| black_box(percentile(black_box(&sorted), 95.0)))
    });
}

/// 结果汇总基准测试
fn summarize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for count in [60, 600, 3_600] {
        let outcomes = sample_outcomes(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &outcomes, |b, outcomes| {
            b.iter(|| black_box(summarize(black_box(outcomes))))
        });
    }

    group.finish();
}

/// 响应分类基准测试
fn classify_benchmark(c: &mut Criterion) {
    let body = "status: OK\n".repeat(256);

    c.bench_function("classify_with_content_check", |b| {
        b.iter(|| {
            black_box(classify_response(
                Utc::now(),
                200,
                black_box(&body),
                Some("OK"),
                Duration::from_millis(12),
            ))
        })
    });
}

/// 报告序列化基准测试
fn report_serialization_benchmark(c: &mut Criterion) {
    let outcomes = sample_outcomes(600);
    let now = Utc::now();
    let timing = RunTiming {
        start: now,
        end: now,
        elapsed: Duration::from_secs(600),
    };
    let summary = RunSummary::new("http://localhost:8000/health", &timing, &summarize(&outcomes));
    let report = assemble_report(summary, &outcomes);

    c.bench_function("report_to_json_600", |b| {
        b.iter(|| black_box(report.to_json().unwrap()))
    });
}

criterion_group!(
    benches,
    percentile_benchmark,
    summarize_benchmark,
    classify_benchmark,
    report_serialization_benchmark
);
criterion_main!(benches);
