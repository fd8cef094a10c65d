//! Custom error types for compbench.
//!
//! Explicit enum error types only. No `Box<dyn Error>` and no
//! `anyhow::Result` in library code: every failure a run can hit is a variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Backend;

/// Top-level error type for a benchmark run.
/// Every variant is fatal: a run either completes or aborts, it never
/// reports partial throughput.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Input Errors - Reported Before Any Worker Starts
    // =========================================================================
    #[error("Error opening {}: {source}", .path.display())]
    InputFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error opening {}: {source}", .path.display())]
    DictionaryFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to map {}: {reason}", .path.display())]
    MapFailed { path: PathBuf, reason: String },

    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Options
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Encoder Errors
    // =========================================================================
    #[error("{backend} encoder failure: {message}")]
    EncoderFailure { backend: Backend, message: String },

    // =========================================================================
    // Worker Errors
    // =========================================================================
    #[error("Failed to spawn worker thread: {source}")]
    ThreadSpawn {
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

impl BenchError {
    /// Path of the file that could not be opened, if this is an open failure.
    pub fn failed_path(&self) -> Option<&std::path::Path> {
        match self {
            BenchError::InputFileOpen { path, .. }
            | BenchError::DictionaryFileOpen { path, .. }
            | BenchError::MapFailed { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn encoder(backend: Backend, message: impl ToString) -> Self {
        BenchError::EncoderFailure {
            backend,
            message: message.to_string(),
        }
    }
}

/// Validation errors reject a configuration before any file is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Level {level} is out of range for {backend} ({min}..={max})")]
    InvalidLevel {
        backend: Backend,
        level: i32,
        min: i32,
        max: i32,
    },

    #[error("Concurrency must be at least 1, got {value}")]
    InvalidConcurrency { value: usize },

    #[error("Benchmark duration must be non-zero and representable as a deadline")]
    InvalidBudget,
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
