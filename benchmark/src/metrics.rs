// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Metrics types for benchmark results.
//!
//! This module defines the in-memory result of a run and the data structures
//! used to serialize it for later comparison.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compbench_core::Backend;
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::harness::WorkerReport;

/// Bytes in one MiB, the unit throughput is reported in.
pub const MIB: f64 = 1024.0 * 1024.0;

/// Aggregate outcome of one benchmark run, built after all workers joined.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub backend: Backend,
    pub level: i32,
    /// Size of the compressed input in bytes
    pub input_size: u64,
    /// Size of the preset dictionary, if one was used
    pub dictionary_size: Option<u64>,
    /// One report per worker, in spawn order
    pub workers: Vec<WorkerReport>,
    /// Time from the shared start until every worker joined
    pub elapsed: Duration,
    /// Nominal wall-clock budget of the run
    pub budget: Duration,
}

impl RunResult {
    /// Sum of completed passes across all workers.
    pub fn total_iterations(&self) -> u64 {
        self.workers.iter().map(|w| w.iterations).sum()
    }

    /// Compressed size seen by the first worker.
    ///
    /// Sizes are deterministic for a fixed input and level, so one sample
    /// stands for all of them.
    pub fn output_size(&self) -> u64 {
        self.workers.first().map_or(0, |w| w.last_output_size)
    }

    /// Input MiB compressed per second of measured wall-clock time.
    pub fn throughput_mib_per_sec(&self) -> f64 {
        throughput_mib_per_sec(self.total_iterations(), self.input_size, self.elapsed)
    }

    /// Input MiB compressed per second of the nominal budget.
    pub fn nominal_throughput_mib_per_sec(&self) -> f64 {
        throughput_mib_per_sec(self.total_iterations(), self.input_size, self.budget)
    }

    /// Ratio of the busiest worker's pass count to the slowest one's.
    ///
    /// `None` if a worker finished no pass at all.
    pub fn worker_balance(&self) -> Option<f64> {
        let max = self.workers.iter().map(|w| w.iterations).max()?;
        let min = self.workers.iter().map(|w| w.iterations).min()?;
        if min == 0 {
            return None;
        }
        Some(max as f64 / min as f64)
    }
}

/// `iterations × input_size / MiB / seconds`.
pub fn throughput_mib_per_sec(iterations: u64, input_size: u64, duration: Duration) -> f64 {
    iterations as f64 * input_size as f64 / MIB / duration.as_secs_f64()
}

/// Throughput metrics for a compression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Compression passes per second
    pub iterations_per_sec: f64,
    /// Input bytes compressed per second
    pub bytes_per_sec: f64,
    /// Input MiB compressed per second
    pub mib_per_sec: f64,
    /// Total passes
    pub total_iterations: u64,
    /// Total input bytes compressed
    pub total_bytes: u64,
    /// Duration of the run in nanoseconds
    pub duration_ns: u64,
}

impl ThroughputMetrics {
    /// Calculate throughput from pass count, input size, and duration.
    pub fn calculate(iterations: u64, input_size: u64, duration: Duration) -> Self {
        let duration_secs = duration.as_secs_f64();
        let total_bytes = iterations.saturating_mul(input_size);
        Self {
            iterations_per_sec: iterations as f64 / duration_secs,
            bytes_per_sec: total_bytes as f64 / duration_secs,
            mib_per_sec: throughput_mib_per_sec(iterations, input_size, duration),
            total_iterations: iterations,
            total_bytes,
            duration_ns: duration.as_nanos() as u64,
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// A single benchmark result with all associated metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark, e.g. `zstd_q3_t4`
    pub name: String,
    pub backend: Backend,
    pub level: i32,
    /// Number of worker threads
    pub concurrency: usize,
    /// Size of the compressed input in bytes
    pub input_size: u64,
    /// Compressed size of one pass in bytes
    pub output_size: u64,
    /// Throughput over the measured wall-clock time
    pub throughput: ThroughputMetrics,
    /// Completed passes per worker, in spawn order
    pub worker_iterations: Vec<u64>,
    /// Additional metadata specific to this run
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    /// Build a serializable result from a finished run.
    pub fn from_run(run: &RunResult) -> Self {
        let concurrency = run.workers.len();
        let mut result = Self {
            name: format!("{}_q{}_t{}", run.backend.id(), run.level, concurrency),
            backend: run.backend,
            level: run.level,
            concurrency,
            input_size: run.input_size,
            output_size: run.output_size(),
            throughput: ThroughputMetrics::calculate(
                run.total_iterations(),
                run.input_size,
                run.elapsed,
            ),
            worker_iterations: run.workers.iter().map(|w| w.iterations).collect(),
            metadata: HashMap::new(),
        }
        .with_metadata("budget_ms", run.budget.as_millis() as u64)
        .with_metadata("nominal_mib_per_sec", run.nominal_throughput_mib_per_sec());

        if let Some(size) = run.dictionary_size {
            result = result.with_metadata("dictionary_size_bytes", size);
        }
        if let Some(balance) = run.worker_balance() {
            result = result.with_metadata("worker_balance", balance);
        }
        result
    }

    /// Add metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }
}

/// Complete benchmark report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Individual benchmark results
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    /// Create a new benchmark report.
    pub fn new() -> Self {
        Self {
            benchmark_suite: "compbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    /// Add a result to the report.
    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
