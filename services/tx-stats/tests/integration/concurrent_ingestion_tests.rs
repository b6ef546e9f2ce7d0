//! Concurrent ingestion tests
//!
//! Writers hammer a handful of hot milliseconds while readers and cleanup run
//! alongside. Totals must come out exact.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinSet;
use tx_stats::{ManualClock, WindowConfig, WindowedAggregator};

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn frozen_aggregator() -> Arc<WindowedAggregator> {
    super::super::init_test_env();
    let clock = Arc::new(ManualClock::new(start()));
    Arc::new(WindowedAggregator::with_clock(WindowConfig::default(), clock).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingestion_is_exact() {
    const TASKS: usize = 8;
    const RECORDS_PER_TASK: usize = 2_000;

    let aggregator = frozen_aggregator();
    let mut tasks = JoinSet::new();

    for seed in 0..TASKS {
        let aggregator = Arc::clone(&aggregator);
        tasks.spawn(async move {
            let mut rng = fastrand::Rng::with_seed(seed as u64);
            let mut expected_minor = 0i64;
            for i in 0..RECORDS_PER_TASK {
                // 16 hot milliseconds shared by every task
                let offset = rng.i64(0..16);
                let minor = rng.i64(1..100_000);
                let at = start() - Duration::milliseconds(offset);
                assert!(aggregator.record(at, Decimal::new(minor, 2)).is_accepted());
                expected_minor += minor;
                if i % 256 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            expected_minor
        });
    }

    let mut expected_minor = 0i64;
    while let Some(result) = tasks.join_next().await {
        expected_minor += result.unwrap();
    }

    let stats = aggregator.query();
    assert_eq!(stats.order_count, (TASKS * RECORDS_PER_TASK) as u64);
    assert_eq!(stats.total_amount, Decimal::new(expected_minor, 2));
    assert!(aggregator.len() <= 16);
}

#[test]
fn test_same_millisecond_contention() {
    const THREADS: usize = 8;
    const RECORDS_PER_THREAD: u64 = 5_000;

    let aggregator = frozen_aggregator();
    let at = start() - Duration::seconds(1);

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..RECORDS_PER_THREAD {
                    let _ = aggregator.record(at, Decimal::new(1, 2));
                }
            });
        }
    });

    let bucket = aggregator.bucket_at(at).unwrap();
    assert_eq!(bucket.order_count, THREADS as u64 * RECORDS_PER_THREAD);
    assert_eq!(bucket.amount_minor, (THREADS as u64 * RECORDS_PER_THREAD) as i64);
}

#[test]
fn test_queries_race_with_writers() {
    const WRITERS: usize = 4;
    const RECORDS_PER_WRITER: u64 = 5_000;

    let aggregator = frozen_aggregator();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut last_seen = 0u64;
            while !done.load(Ordering::Acquire) {
                let stats = aggregator.query();
                assert!(stats.order_count <= WRITERS as u64 * RECORDS_PER_WRITER);
                // Counts never go backwards within a frozen window
                assert!(stats.order_count >= last_seen);
                last_seen = stats.order_count;
            }
        });

        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let aggregator = &aggregator;
                scope.spawn(move || {
                    for i in 0..RECORDS_PER_WRITER {
                        let offset = i64::try_from((i + w as u64) % 50).unwrap();
                        let at = start() - Duration::milliseconds(offset);
                        let _ = aggregator.record(at, Decimal::new(100, 2));
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();
    });

    let stats = aggregator.query();
    assert_eq!(stats.order_count, WRITERS as u64 * RECORDS_PER_WRITER);
    assert_eq!(
        stats.total_amount,
        Decimal::from(WRITERS as u64 * RECORDS_PER_WRITER)
    );
}

#[test]
fn test_cleanup_races_with_writers() {
    super::super::init_test_env();
    let clock = Arc::new(ManualClock::new(start()));
    let aggregator =
        WindowedAggregator::with_clock(WindowConfig::default(), clock.clone()).unwrap();

    // Old buckets that the next records will purge
    for secs in 0..100 {
        let _ = aggregator.record(start() - Duration::milliseconds(secs), Decimal::ONE);
    }
    clock.advance(Duration::seconds(121));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..1_000 {
                    let _ = aggregator.record_now(Decimal::ONE);
                }
            });
        }
    });

    let stats = aggregator.query();
    assert_eq!(stats.order_count, 4_000);
    assert_eq!(aggregator.len(), 1);
    assert_eq!(aggregator.metrics().purged(), 100);
}
