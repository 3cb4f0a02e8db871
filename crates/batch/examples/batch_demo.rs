//! Demonstrates bounded-concurrency batch processing with failure isolation.
//!
//! Run with: `cargo run -p identity-batch --example batch_demo`

use std::time::Duration;

use batch::{BatchConfig, BatchProcessor};

#[tokio::main]
async fn main() {
    let processor = BatchProcessor::new(BatchConfig {
        max_concurrency: 3,
        timeout_ms: 500,
    })
    .expect("valid config");

    // Simulate eight feature-extraction calls; number 5 fails, number 7 hangs.
    let result = processor
        .process_parallel((0..8u64).collect(), |n| async move {
            match n {
                5 => Err("upstream returned 503".to_string().into()),
                7 => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(n)
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(50 + n * 10)).await;
                    Ok(n * 100)
                }
            }
        })
        .await;

    println!(
        "batch finished in {}ms ({:.1}ms/item)",
        result.total_time_ms, result.avg_time_per_item_ms
    );
    println!("successes: {:?}", result.successes);
    for failure in &result.failures {
        println!("failed {}: {}", failure.identifier, failure.error);
    }
}
