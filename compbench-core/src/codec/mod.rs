// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec adapters.
//!
//! Every backend is driven through the same [`Compressor`] call shape: feed the
//! whole input, finish the stream, report how many bytes came out. Output is
//! drained into a fixed scratch buffer and thrown away.

mod brotli;
mod deflate;
mod zstd;

pub use self::brotli::BrotliCompressor;
pub use self::deflate::DeflateCompressor;
pub use self::zstd::ZstdCompressor;

use crate::error::BenchResult;
use crate::types::{Backend, Level};

/// Size of the scratch buffer compressed output is drained into.
pub const SCRATCH_SIZE: usize = 32 * 1024;

/// Lifecycle of an encoder instance.
///
/// `Done` goes back to `Initialized` when the stream is reset for the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderPhase {
    Idle,
    Initialized,
    Processing,
    Finishing,
    Done,
}

/// One full compression pass over a buffer.
pub trait Compressor: Send {
    /// Compress `input` to completion and return the number of bytes produced.
    fn compress_once(&mut self, input: &[u8]) -> BenchResult<u64>;

    /// Backend this compressor drives.
    fn backend(&self) -> Backend;

    /// Current lifecycle phase.
    fn phase(&self) -> EncoderPhase;
}

/// Encoder for the backend selected at startup.
pub enum Codec<'d> {
    Deflate(DeflateCompressor<'d>),
    Brotli(BrotliCompressor<'d>),
    Zstd(ZstdCompressor),
}

impl<'d> Codec<'d> {
    /// Build an encoder context, configured with the preset dictionary if any.
    pub fn new(backend: Backend, level: Level, dictionary: Option<&'d [u8]>) -> BenchResult<Self> {
        let codec = match backend {
            Backend::Deflate => Codec::Deflate(DeflateCompressor::new(level, dictionary)?),
            Backend::Brotli => Codec::Brotli(BrotliCompressor::new(level, dictionary)?),
            Backend::Zstd => Codec::Zstd(ZstdCompressor::new(level, dictionary)?),
        };

        tracing::trace!(
            backend = %backend,
            level = level.value(),
            dictionary_bytes = dictionary.map_or(0, <[u8]>::len),
            "Encoder initialized"
        );

        Ok(codec)
    }
}

impl Compressor for Codec<'_> {
    fn compress_once(&mut self, input: &[u8]) -> BenchResult<u64> {
        match self {
            Codec::Deflate(c) => c.compress_once(input),
            Codec::Brotli(c) => c.compress_once(input),
            Codec::Zstd(c) => c.compress_once(input),
        }
    }

    fn backend(&self) -> Backend {
        match self {
            Codec::Deflate(c) => c.backend(),
            Codec::Brotli(c) => c.backend(),
            Codec::Zstd(c) => c.backend(),
        }
    }

    fn phase(&self) -> EncoderPhase {
        match self {
            Codec::Deflate(c) => c.phase(),
            Codec::Brotli(c) => c.phase(),
            Codec::Zstd(c) => c.phase(),
        }
    }
}

/// Compress `input` once with a freshly built encoder.
pub fn compress_once(
    backend: Backend,
    level: Level,
    dictionary: Option<&[u8]>,
    input: &[u8],
) -> BenchResult<u64> {
    Codec::new(backend, level, dictionary)?.compress_once(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> Vec<u8> {
        let line = b"the quick brown fox jumps over the lazy dog 0123456789\n";
        line.iter().copied().cycle().take(200 * 1024).collect()
    }

    #[test]
    fn test_every_backend_compresses() {
        let input = sample_input();
        for backend in Backend::ALL {
            let level = Level::new(backend, 3).unwrap();
            let size = compress_once(backend, level, None, &input).unwrap();
            assert!(size > 0, "{} produced no output", backend);
            assert!((size as usize) < input.len(), "{} did not compress", backend);
        }
    }

    #[test]
    fn test_output_size_is_deterministic_across_passes() {
        let input = sample_input();
        for backend in Backend::ALL {
            let level = Level::new(backend, 5).unwrap();
            let mut codec = Codec::new(backend, level, None).unwrap();
            let first = codec.compress_once(&input).unwrap();
            for _ in 0..3 {
                assert_eq!(codec.compress_once(&input).unwrap(), first, "{}", backend);
            }
            // A fresh context agrees with the reused one.
            assert_eq!(compress_once(backend, level, None, &input).unwrap(), first);
        }
    }

    #[test]
    fn test_phase_transitions() {
        let input = sample_input();
        for backend in Backend::ALL {
            let level = Level::new(backend, 1).unwrap();
            let mut codec = Codec::new(backend, level, None).unwrap();
            assert_eq!(codec.phase(), EncoderPhase::Initialized);
            codec.compress_once(&input).unwrap();
            assert_eq!(codec.phase(), EncoderPhase::Done);
            assert_eq!(codec.backend(), backend);
        }
    }

    #[test]
    fn test_empty_input() {
        for backend in Backend::ALL {
            let level = Level::new(backend, 1).unwrap();
            let size = compress_once(backend, level, None, &[]).unwrap();
            assert!(size > 0, "{} must still emit a stream trailer", backend);
        }
    }

    /// Bytes that do not compress on their own.
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect()
    }

    #[test]
    fn test_dictionary_helps_small_input() {
        let dictionary = noise(16 * 1024);
        let input = &dictionary[1024..5120];
        for backend in Backend::ALL {
            let level = Level::new(backend, 6).unwrap();
            let plain = compress_once(backend, level, None, input).unwrap();
            let with_dict =
                compress_once(backend, level, Some(dictionary.as_slice()), input).unwrap();
            assert!(
                with_dict * 4 < plain,
                "{}: dictionary {} vs plain {}",
                backend,
                with_dict,
                plain
            );
        }
    }
}
