// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! compbench Benchmark Driver
//!
//! Measures how fast a file can be compressed by N threads at once.
//!
//! # Run Model
//!
//! - **Workers**: one OS thread per unit of concurrency, each with its own encoder
//! - **Budget**: every worker loops over full compression passes until a shared deadline
//! - **Result**: pass counts are summed after all workers joined
//!
//! # Data Output
//!
//! Throughput is printed as a CSV line; runs can also be saved as JSON files.

pub mod harness;
pub mod metrics;
pub mod reporter;

pub use harness::{BenchmarkHarness, Timer, WorkerReport};
pub use metrics::{BenchmarkReport, BenchmarkResult, RunResult, SystemInfo, ThroughputMetrics};
pub use reporter::JsonReporter;
