//! Test assertions for stage outputs.

use std::fmt::Debug;

use crate::core::StageOutput;

/// Asserts that the output indicates success.
pub fn assert_output_succeeded<T: Debug>(output: &StageOutput<T>) {
    assert!(
        output.is_success(),
        "Expected success, got error: {:?}",
        output.error()
    );
}

/// Asserts that the output indicates failure.
pub fn assert_output_failed<T: Debug>(output: &StageOutput<T>) {
    assert!(
        !output.is_success(),
        "Expected failure, got value: {:?}",
        output.value()
    );
}

/// Asserts that the output failed at the given stage position.
pub fn assert_failed_at_stage<T: Debug>(output: &StageOutput<T>, index: usize) {
    assert_output_failed(output);
    let failed = output.error().and_then(|e| e.failed_stage());
    assert_eq!(
        failed,
        Some(index),
        "Expected failure at stage {index}, got {:?}",
        output.error()
    );
}

/// Asserts that the output's metadata bag holds `expected` under `key`.
pub fn assert_metadata<T>(output: &StageOutput<T>, key: &str, expected: &serde_json::Value) {
    let actual = output.context.metadata(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected metadata {expected:?} for key '{key}', got {actual:?}"
    );
}
