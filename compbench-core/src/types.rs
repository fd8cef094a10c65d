// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default compression level, meaningful for every backend.
pub const DEFAULT_LEVEL: i32 = 8;

/// Compression backend. Exactly one is selected per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// zlib stream (deflate with zlib header) via flate2.
    #[default]
    Deflate,
    /// Brotli encoder.
    Brotli,
    /// Zstandard streaming encoder.
    Zstd,
}

impl Backend {
    /// All backends, in the order they are listed in reports.
    pub const ALL: [Backend; 3] = [Backend::Deflate, Backend::Brotli, Backend::Zstd];

    /// Name printed in the diagnostic summary.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Deflate => "gzip",
            Backend::Brotli => "brotli",
            Backend::Zstd => "Zstd",
        }
    }

    /// Lowercase identifier used in result and file names.
    pub fn id(&self) -> &'static str {
        match self {
            Backend::Deflate => "deflate",
            Backend::Brotli => "brotli",
            Backend::Zstd => "zstd",
        }
    }

    /// Levels accepted by the backend's library.
    pub fn level_range(&self) -> RangeInclusive<i32> {
        match self {
            Backend::Deflate => 0..=9,
            Backend::Brotli => 0..=11,
            Backend::Zstd => 1..=*zstd::compression_level_range().end(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Backend-specific compression level.
/// Not normalized across backends; only checked against the backend's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level(i32);

impl Level {
    /// Create a level, validating it against the backend's range.
    pub fn new(backend: Backend, level: i32) -> Result<Self, ValidationError> {
        let range = backend.level_range();
        if !range.contains(&level) {
            return Err(ValidationError::InvalidLevel {
                backend,
                level,
                min: *range.start(),
                max: *range.end(),
            });
        }
        Ok(Self(level))
    }

    /// Get the raw level value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of worker threads. Must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    /// Create a new Concurrency with validation.
    pub fn new(threads: usize) -> Result<Self, ValidationError> {
        NonZeroUsize::new(threads)
            .map(Self)
            .ok_or(ValidationError::InvalidConcurrency { value: threads })
    }

    /// Get the thread count.
    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(NonZeroUsize::MIN)
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Concurrency> for usize {
    fn from(c: Concurrency) -> Self {
        c.get()
    }
}
