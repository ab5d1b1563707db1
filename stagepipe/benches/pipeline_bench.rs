//! Benchmarks for pipeline execution.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use stagepipe::prelude::*;
use tokio::runtime::Runtime;

fn add_one() -> Arc<dyn Stage<u64>> {
    from_fn(|ctx, input: u64| StageOutput::ok(ctx, input + 1))
}

fn pipeline_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let ten_stages = Pipeline::new((0..10).map(|_| add_one()));
    c.bench_function("sequential_10_stages", |b| {
        b.iter(|| rt.block_on(ten_stages.run(ExecutionContext::new(), black_box(0))))
    });

    let stack = Pipeline::named(
        "bench",
        vec![
            Arc::new(RequestId::always()) as Arc<dyn Stage<Value>>,
            Arc::new(Timeout::new(Duration::from_secs(30))),
            Arc::new(Observability::new(Arc::new(NoopTracer))),
            Arc::new(RateLimit::new(u32::MAX, Duration::from_secs(3600))),
            Arc::new(ObservabilityComplete::new()),
        ],
    );
    let payload = json!({ "user_id": "abc123", "action": "login" });
    c.bench_function("middleware_stack", |b| {
        b.iter(|| rt.block_on(stack.run(ExecutionContext::new(), black_box(payload.clone()))))
    });

    let ctx = (0..32).fold(ExecutionContext::new().with_request_id("req"), |ctx, i| {
        ctx.with_metadata(format!("key{i}"), i)
    });
    c.bench_function("context_lookup_depth_33", |b| {
        b.iter(|| black_box(ctx.request_id()))
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
