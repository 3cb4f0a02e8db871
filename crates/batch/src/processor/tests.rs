use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fail(message: &str) -> BoxError {
    message.to_string().into()
}

#[tokio::test]
async fn all_items_succeed() {
    let processor = BatchProcessor::default();
    let result = processor
        .process_parallel(vec![1u32, 2, 3, 4], |n| async move { Ok(n * 10) })
        .await;

    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 0);
    assert!(result.is_fully_successful());
    let mut successes = result.successes.clone();
    successes.sort_unstable();
    assert_eq!(successes, vec![10, 20, 30, 40]);
}

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let processor = BatchProcessor::default();
    let result = processor
        .process_parallel(vec![0u32, 1, 2, 3, 4], |n| async move {
            if n == 3 {
                Err(fail("synthetic extraction error"))
            } else {
                Ok(n)
            }
        })
        .await;

    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].identifier, "item-3");
    assert_eq!(result.failures[0].error, "synthetic extraction error");
}

#[tokio::test]
async fn panicking_processor_is_isolated_like_any_failure() {
    let processor = BatchProcessor::default();
    let result = processor
        .process_parallel(vec![0u32, 1, 2, 3, 4], |n| async move {
            if n == 3 {
                panic!("synthetic processor panic");
            }
            Ok(n)
        })
        .await;

    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].identifier, "item-3");
    assert_eq!(
        result.failures[0].error,
        "processor panicked: synthetic processor panic"
    );
}

#[tokio::test]
async fn hung_item_times_out_with_fixed_message() {
    let processor = BatchProcessor::new(BatchConfig {
        timeout_ms: 50,
        ..Default::default()
    })
    .unwrap();

    let started = std::time::Instant::now();
    let result = processor
        .process_parallel(vec![()], |_| async {
            std::future::pending::<Result<(), BoxError>>().await
        })
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].error, OPERATION_TIMEOUT);
    assert!(
        elapsed.as_millis() < 1_000,
        "timeout took {elapsed:?}, expected ~50ms"
    );
}

#[tokio::test]
async fn timeout_clock_starts_at_admission() {
    // With a cap of 1, the second item waits for the first; its own 80ms
    // budget must not tick while queued.
    let processor = BatchProcessor::new(BatchConfig {
        max_concurrency: 1,
        timeout_ms: 80,
    })
    .unwrap();

    let result = processor
        .process_parallel(vec![0u32, 1], |_| async {
            tokio::time::sleep(std::time::Duration::from_millis(60)).await;
            Ok(())
        })
        .await;

    assert!(result.is_fully_successful(), "{:?}", result.failures);
}

#[tokio::test]
async fn empty_batch_yields_empty_result() {
    let processor = BatchProcessor::default();
    let result = processor
        .process_parallel(Vec::<u32>::new(), |n| async move { Ok(n) })
        .await;

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 0);
    assert_eq!(result.avg_time_per_item_ms, 0.0);
}

#[tokio::test]
async fn named_batch_reports_caller_identifiers() {
    let processor = BatchProcessor::default();
    let items = vec![
        ("img-aaa".to_string(), 1u32),
        ("img-bbb".to_string(), 2),
        ("img-ccc".to_string(), 3),
    ];
    let result = processor
        .process_named(items, |n| async move {
            if n == 2 {
                Err(fail("feature extraction failed"))
            } else {
                Ok(n)
            }
        })
        .await;

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failures[0].identifier, "img-bbb");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn processor_respects_concurrency_cap() {
    let processor = BatchProcessor::new(BatchConfig {
        max_concurrency: 2,
        ..Default::default()
    })
    .unwrap();

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let in_flight_task = Arc::clone(&in_flight);
    let peak_task = Arc::clone(&peak);

    let result = processor
        .process_parallel((0..10u32).collect(), move |n| {
            let in_flight = Arc::clone(&in_flight_task);
            let peak = Arc::clone(&peak_task);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(n)
            }
        })
        .await;

    assert!(result.is_fully_successful());
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[test]
fn invalid_configs_rejected() {
    assert!(BatchProcessor::new(BatchConfig {
        max_concurrency: 0,
        ..Default::default()
    })
    .is_err());
    assert!(BatchProcessor::new(BatchConfig {
        timeout_ms: 0,
        ..Default::default()
    })
    .is_err());
}

#[tokio::test]
async fn batch_result_serializes_for_reporting() {
    let processor = BatchProcessor::default();
    let result = processor
        .process_parallel(vec![1u32, 2], |n| async move {
            if n == 2 {
                Err(fail("boom"))
            } else {
                Ok(n)
            }
        })
        .await;

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["successes"], serde_json::json!([1]));
    assert_eq!(json["failures"][0]["identifier"], "item-1");
    assert!(json["total_time_ms"].is_u64());
}

#[test]
fn partial_config_deserializes_with_defaults() {
    let cfg: BatchConfig = serde_json::from_str("{\"max_concurrency\": 8}").unwrap();
    assert_eq!(cfg.max_concurrency, 8);
    assert_eq!(cfg.timeout_ms, BatchConfig::default_timeout_ms());
}
