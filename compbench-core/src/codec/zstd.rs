//! Zstd adapter on top of the raw streaming encoder.

use ::zstd::stream::raw::{Encoder, InBuffer, Operation, OutBuffer};

use super::{Compressor, EncoderPhase, SCRATCH_SIZE};
use crate::error::{BenchError, BenchResult};
use crate::types::{Backend, Level};

/// Zstd compressor.
///
/// One compression context per thread. The dictionary and level are loaded
/// once; `reinit` only resets the session before each pass.
pub struct ZstdCompressor {
    encoder: Encoder<'static>,
    scratch: Box<[u8]>,
    phase: EncoderPhase,
}

impl ZstdCompressor {
    pub fn new(level: Level, dictionary: Option<&[u8]>) -> BenchResult<Self> {
        let encoder = match dictionary {
            Some(dictionary) => Encoder::with_dictionary(level.value(), dictionary),
            None => Encoder::new(level.value()),
        }
        .map_err(|e| BenchError::encoder(Backend::Zstd, e))?;

        Ok(Self {
            encoder,
            scratch: vec![0u8; SCRATCH_SIZE].into_boxed_slice(),
            phase: EncoderPhase::Initialized,
        })
    }
}

impl Compressor for ZstdCompressor {
    fn compress_once(&mut self, input: &[u8]) -> BenchResult<u64> {
        self.encoder
            .reinit()
            .map_err(|e| BenchError::encoder(Backend::Zstd, e))?;
        self.phase = EncoderPhase::Processing;

        let mut src = InBuffer::around(input);
        let mut produced = 0u64;

        while src.pos() < input.len() {
            let mut dst = OutBuffer::around(&mut self.scratch[..]);
            self.encoder
                .run(&mut src, &mut dst)
                .map_err(|e| BenchError::encoder(Backend::Zstd, e))?;
            produced += dst.pos() as u64;
        }

        self.phase = EncoderPhase::Finishing;
        loop {
            let mut dst = OutBuffer::around(&mut self.scratch[..]);
            let remaining = self
                .encoder
                .finish(&mut dst, true)
                .map_err(|e| BenchError::encoder(Backend::Zstd, e))?;
            produced += dst.pos() as u64;
            if remaining == 0 {
                break;
            }
        }

        self.phase = EncoderPhase::Done;
        Ok(produced)
    }

    fn backend(&self) -> Backend {
        Backend::Zstd
    }

    fn phase(&self) -> EncoderPhase {
        self.phase
    }
}
