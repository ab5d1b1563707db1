//! Runs a small user-service pipeline over a JSON payload.
//!
//! ```text
//! RUST_LOG=info cargo run -p stagepipe --example basic
//! ```

use std::sync::Arc;

use anyhow::ensure;
use serde_json::{json, Value};
use stagepipe::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn not_null(input: &Value) -> anyhow::Result<()> {
    ensure!(!input.is_null(), "input cannot be null");
    Ok(())
}

fn business_logic() -> Arc<dyn Stage<Value>> {
    from_fn(|ctx, input: Value| {
        let (Some(user_id), Some(action)) = (
            input.get("user_id").and_then(Value::as_str),
            input.get("action").and_then(Value::as_str),
        ) else {
            let kind = input.kind();
            return StageOutput::fail(
                ctx,
                PipelineError::type_mismatch("object with user_id and action", kind),
            );
        };

        info!(user_id, action, "Running business logic");
        let output = json!({
            "message": "Action completed",
            "user_id": user_id,
        });
        StageOutput::ok(ctx, output)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MiddlewareConfig::from_json_str(
        r#"{"observability": {"span_name": "user-service.request"}}"#,
    )?;

    let pipeline = Pipeline::named(
        "user-service",
        vec![
            Arc::new(RequestId::always()) as Arc<dyn Stage<Value>>,
            Arc::new(Observability::with_config(
                config.observability,
                Arc::new(LoggingTracer),
            )),
            Arc::new(Validate::new(not_null)),
            Arc::new(Recover::new(business_logic())),
            Arc::new(ObservabilityComplete::new()),
        ],
    );

    let payload = json!({ "user_id": "abc123", "action": "login" });
    match pipeline.run(ExecutionContext::new(), payload).await.into_parts() {
        (ctx, Ok(result)) => {
            info!(request_id = ctx.request_id(), output = %result, "Final result");
        }
        (ctx, Err(err)) => {
            error!(request_id = ctx.request_id(), error = %err, "Pipeline failed");
        }
    }

    let bad = pipeline.run(ExecutionContext::new(), json!("not an object")).await;
    if let Some(err) = bad.error() {
        error!(error = %err, "Pipeline failed");
    }

    Ok(())
}
