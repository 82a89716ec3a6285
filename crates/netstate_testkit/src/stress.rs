//! Concurrent stress helpers.
//!
//! These run many retrievals from several threads against one retriever and
//! tally the outcomes.

use netstate_core::{NativeLibrary, NetStateRetriever};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total retrievals performed.
    pub total_ops: usize,
    /// Retrievals that returned a payload.
    pub successful_ops: usize,
    /// Retrievals that returned an error.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            duration,
        }
    }

    /// Retrievals per second.
    pub fn ops_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total_ops as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Retrievals per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 250,
            threads: 8,
        }
    }
}

/// Runs `config.operations` retrievals on each of `config.threads` threads.
pub fn concurrent_retrievals<L>(
    retriever: &Arc<NetStateRetriever<L>>,
    config: &StressConfig,
) -> StressTestResult
where
    L: NativeLibrary + 'static,
{
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let retriever = Arc::clone(retriever);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            thread::spawn(move || {
                for _ in 0..operations {
                    match retriever.retrieve() {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("stress worker panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_totals() {
        let result = StressTestResult::new(3, 1, Duration::from_secs(2));
        assert_eq!(result.total_ops, 4);
        assert!((result.ops_per_second() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_duration_rate() {
        let result = StressTestResult::new(0, 0, Duration::ZERO);
        assert_eq!(result.ops_per_second(), 0.0);
    }
}
