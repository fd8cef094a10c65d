//! compbench Core Library
//!
//! Building blocks of the compression throughput benchmark: validated run
//! configuration, read-only mapped inputs, and the codec adapters that drive
//! the deflate, Brotli and Zstd encoders through one call shape.

pub mod codec;
pub mod config;
pub mod error;
pub mod mapped;
pub mod types;

// Re-export commonly used types
pub use codec::{compress_once, Codec, Compressor, EncoderPhase};
pub use config::{BenchConfig, RawBenchConfig, DEFAULT_BUDGET};
pub use error::{BenchError, BenchResult, ValidationError};
pub use mapped::{FileRole, MappedFile};
pub use types::{Backend, Concurrency, Level};
