// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timed multi-threaded compression driver.
//!
//! Every worker thread owns one encoder context and compresses the shared
//! input again and again until the common deadline passes. The deadline is
//! only checked between full passes, so a run can overshoot the budget by up
//! to one pass. A worker that fails raises a shared stop flag so the
//! others return after their current pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use compbench_core::{
    Backend, BenchConfig, BenchError, BenchResult, Codec, Compressor, Concurrency, Level,
    ValidationError, DEFAULT_BUDGET,
};
use serde::{Deserialize, Serialize};

use crate::metrics::RunResult;

/// Result record returned by one worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Index of the worker in spawn order
    pub worker_id: usize,
    /// Number of complete compression passes
    pub iterations: u64,
    /// Compressed size of the last pass in bytes
    pub last_output_size: u64,
}

/// Benchmark harness running the timed compression loop on N threads.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    backend: Backend,
    level: Level,
    concurrency: Concurrency,
    budget: Duration,
}

impl BenchmarkHarness {
    /// Create a harness with one thread and the default 10 second budget.
    pub fn new(backend: Backend, level: Level) -> Self {
        Self {
            backend,
            level,
            concurrency: Concurrency::default(),
            budget: DEFAULT_BUDGET,
        }
    }

    /// Create a harness from a validated configuration.
    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(config.backend(), config.level())
            .threads(config.concurrency())
            .budget(config.budget())
    }

    /// Set the number of worker threads.
    pub fn threads(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the wall-clock budget.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Run the benchmark over `input`, optionally with a preset dictionary.
    ///
    /// Fails as a whole if any worker fails: no partial result is returned.
    pub fn run(&self, input: &[u8], dictionary: Option<&[u8]>) -> BenchResult<RunResult> {
        let threads = self.concurrency.get();
        let cpus = num_cpus::get();
        if threads > cpus {
            tracing::warn!(threads, cpus, "More worker threads than CPUs, throughput will be shared");
        }

        tracing::debug!(
            backend = %self.backend,
            level = self.level.value(),
            threads,
            input_bytes = input.len(),
            budget_ms = self.budget.as_millis() as u64,
            "Starting benchmark"
        );

        let timer = Timer::start();
        let deadline = timer
            .deadline(self.budget)
            .ok_or(ValidationError::InvalidBudget)?;
        let (backend, level) = (self.backend, self.level);
        let stop = AtomicBool::new(false);
        let stop = &stop;

        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(threads);
            for worker_id in 0..threads {
                let spawned = thread::Builder::new()
                    .name(format!("compbench-{}", worker_id))
                    .spawn_scoped(scope, move || {
                        run_worker(worker_id, backend, level, input, dictionary, deadline, stop)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    // Already spawned workers are joined when the scope ends.
                    Err(source) => {
                        stop.store(true, Ordering::Relaxed);
                        return Err(BenchError::ThreadSpawn { source });
                    }
                }
            }

            Ok(handles
                .into_iter()
                .enumerate()
                .map(|(worker_id, handle)| {
                    handle
                        .join()
                        .unwrap_or(Err(BenchError::WorkerPanicked { worker_id }))
                })
                .collect::<Vec<_>>())
        })?;

        let elapsed = timer.elapsed();
        let workers = outcomes.into_iter().collect::<BenchResult<Vec<_>>>()?;

        let result = RunResult {
            backend,
            level: level.value(),
            input_size: input.len() as u64,
            dictionary_size: dictionary.map(|d| d.len() as u64),
            workers,
            elapsed,
            budget: self.budget,
        };

        tracing::debug!(
            total_iterations = result.total_iterations(),
            output_size = result.output_size(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Benchmark finished"
        );

        Ok(result)
    }
}

/// Body of one worker thread. Raises `stop` if the worker fails.
fn run_worker(
    worker_id: usize,
    backend: Backend,
    level: Level,
    input: &[u8],
    dictionary: Option<&[u8]>,
    deadline: Instant,
    stop: &AtomicBool,
) -> BenchResult<WorkerReport> {
    let outcome = compress_until(worker_id, backend, level, input, dictionary, deadline, stop);
    if let Err(err) = &outcome {
        tracing::debug!(worker_id, error = %err, "Worker failed, stopping the run");
        stop.store(true, Ordering::Relaxed);
    }
    outcome
}

fn compress_until(
    worker_id: usize,
    backend: Backend,
    level: Level,
    input: &[u8],
    dictionary: Option<&[u8]>,
    deadline: Instant,
    stop: &AtomicBool,
) -> BenchResult<WorkerReport> {
    let mut codec = Codec::new(backend, level, dictionary)?;
    let mut iterations = 0u64;
    let mut last_output_size = 0u64;

    while Instant::now() <= deadline && !stop.load(Ordering::Relaxed) {
        last_output_size = codec.compress_once(input)?;
        iterations += 1;
    }

    tracing::debug!(worker_id, iterations, last_output_size, "Worker finished");

    Ok(WorkerReport {
        worker_id,
        iterations,
        last_output_size,
    })
}

/// Timer shared by all workers of a run.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Instant at which a run with `budget` must stop.
    ///
    /// `None` if the deadline is not representable.
    pub fn deadline(&self, budget: Duration) -> Option<Instant> {
        self.start.checked_add(budget)
    }

    /// Time elapsed since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness(backend: Backend, level: i32) -> BenchmarkHarness {
        BenchmarkHarness::new(backend, Level::new(backend, level).unwrap())
            .budget(Duration::from_millis(200))
    }

    #[test]
    fn test_single_thread_makes_progress() {
        let input = vec![0x5Au8; 16 * 1024];
        let result = harness(Backend::Deflate, 1).run(&input, None).unwrap();

        assert_eq!(result.workers.len(), 1);
        assert!(result.total_iterations() >= 1);
        assert!(result.output_size() > 0);
        assert!(result.elapsed >= Duration::from_millis(200));
    }

    #[test]
    fn test_one_report_per_thread() {
        let input = vec![1u8; 8 * 1024];
        let result = harness(Backend::Zstd, 3)
            .threads(Concurrency::new(3).unwrap())
            .run(&input, None)
            .unwrap();

        let ids: Vec<usize> = result.workers.iter().map(|w| w.worker_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        // Same input and settings everywhere, so every worker saw the same size.
        assert!(result
            .workers
            .iter()
            .all(|w| w.iterations > 0 && w.last_output_size == result.output_size()));
    }

    #[test]
    fn test_dictionary_is_passed_to_workers() {
        let dictionary = b"shared dictionary payload ".repeat(64);
        let input = &dictionary[..512];
        let result = harness(Backend::Brotli, 5)
            .run(input, Some(dictionary.as_slice()))
            .unwrap();
        assert_eq!(result.dictionary_size, Some(dictionary.len() as u64));
        assert!(result.total_iterations() > 0);
    }

    #[test]
    fn test_unrepresentable_budget_fails_before_spawning() {
        let err = harness(Backend::Deflate, 1)
            .budget(Duration::MAX)
            .run(&[0u8; 64], None)
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Validation(ValidationError::InvalidBudget)
        ));
        assert!(Timer::start().deadline(Duration::MAX).is_none());
    }

    #[test]
    fn test_raised_stop_flag_ends_worker() {
        let stop = AtomicBool::new(true);
        let deadline = Instant::now() + Duration::from_secs(3600);
        let level = Level::new(Backend::Zstd, 1).unwrap();

        let report =
            run_worker(0, Backend::Zstd, level, &[7u8; 1024], None, deadline, &stop).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(report.last_output_size, 0);
    }

    #[test]
    fn test_timer_deadline() {
        let timer = Timer::start();
        let deadline = timer.deadline(Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(15));
        assert!(Instant::now() > deadline);
        assert!(timer.elapsed() >= Duration::from_millis(15));
    }
}
