// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run configuration with strict validation.
//!
//! Options are validated before any file is opened. Any invalid value results
//! in a ValidationError that prevents the run from starting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::ValidationError;
use crate::types::{Backend, Concurrency, Level, DEFAULT_LEVEL};

/// Default wall-clock budget for one run.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(10);

/// Options as given on the command line (before validation).
#[derive(Debug, Clone)]
pub struct RawBenchConfig {
    pub input_path: PathBuf,
    pub dictionary_path: Option<PathBuf>,
    pub concurrency: usize,
    pub level: i32,
    pub backend: Backend,
    pub budget: Duration,
}

impl RawBenchConfig {
    /// Defaults of the original tool: one thread, level 8, deflate, 10 seconds.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            dictionary_path: None,
            concurrency: 1,
            level: DEFAULT_LEVEL,
            backend: Backend::default(),
            budget: DEFAULT_BUDGET,
        }
    }

    /// Validate every field.
    pub fn validate(self) -> Result<BenchConfig, ValidationError> {
        check_budget(self.budget)?;

        Ok(BenchConfig {
            concurrency: Concurrency::new(self.concurrency)?,
            level: Level::new(self.backend, self.level)?,
            input_path: self.input_path,
            dictionary_path: self.dictionary_path,
            backend: self.backend,
            budget: self.budget,
        })
    }
}

/// A budget must be non-zero and its deadline must be representable.
fn check_budget(budget: Duration) -> Result<(), ValidationError> {
    if budget.is_zero() || Instant::now().checked_add(budget).is_none() {
        return Err(ValidationError::InvalidBudget);
    }
    Ok(())
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    input_path: PathBuf,
    dictionary_path: Option<PathBuf>,
    concurrency: Concurrency,
    level: Level,
    backend: Backend,
    budget: Duration,
}

impl BenchConfig {
    /// Default configuration for `backend`, level 8.
    pub fn new(input_path: impl Into<PathBuf>, backend: Backend) -> Result<Self, ValidationError> {
        RawBenchConfig {
            backend,
            ..RawBenchConfig::new(input_path)
        }
        .validate()
    }

    pub fn with_concurrency(mut self, threads: usize) -> Result<Self, ValidationError> {
        self.concurrency = Concurrency::new(threads)?;
        Ok(self)
    }

    pub fn with_level(mut self, level: i32) -> Result<Self, ValidationError> {
        self.level = Level::new(self.backend, level)?;
        Ok(self)
    }

    pub fn with_budget(mut self, budget: Duration) -> Result<Self, ValidationError> {
        check_budget(budget)?;
        self.budget = budget;
        Ok(self)
    }

    pub fn with_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = Some(path.into());
        self
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn dictionary_path(&self) -> Option<&Path> {
        self.dictionary_path.as_deref()
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}
