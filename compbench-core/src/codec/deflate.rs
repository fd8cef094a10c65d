//! zlib/deflate adapter on top of `flate2::Compress`.

use flate2::{Compress, Compression, FlushCompress, Status};

use super::{Compressor, EncoderPhase, SCRATCH_SIZE};
use crate::error::{BenchError, BenchResult};
use crate::types::{Backend, Level};

/// zlib only keeps a 32 KiB window, longer dictionaries are truncated.
pub const MAX_DICTIONARY_SIZE: usize = 32 * 1024;

/// Deflate compressor emitting a zlib stream with a 15-bit window.
///
/// One `Compress` lives for the whole run and is reset before every pass.
/// zlib drops the preset dictionary on reset, so it is applied again each time.
pub struct DeflateCompressor<'d> {
    stream: Compress,
    dictionary: Option<&'d [u8]>,
    scratch: Box<[u8]>,
    phase: EncoderPhase,
}

impl<'d> DeflateCompressor<'d> {
    pub fn new(level: Level, dictionary: Option<&'d [u8]>) -> BenchResult<Self> {
        let level = u32::try_from(level.value())
            .map_err(|_| BenchError::encoder(Backend::Deflate, "negative level"))?;

        Ok(Self {
            stream: Compress::new(Compression::new(level), true),
            dictionary: dictionary.map(|d| &d[..d.len().min(MAX_DICTIONARY_SIZE)]),
            scratch: vec![0u8; SCRATCH_SIZE].into_boxed_slice(),
            phase: EncoderPhase::Initialized,
        })
    }

    fn reset(&mut self) -> BenchResult<()> {
        self.stream.reset();
        if let Some(dictionary) = self.dictionary {
            self.stream
                .set_dictionary(dictionary)
                .map_err(|e| BenchError::encoder(Backend::Deflate, e))?;
        }
        self.phase = EncoderPhase::Initialized;
        Ok(())
    }
}

impl Compressor for DeflateCompressor<'_> {
    fn compress_once(&mut self, input: &[u8]) -> BenchResult<u64> {
        self.reset()?;

        self.phase = EncoderPhase::Processing;
        let mut consumed = 0usize;
        while consumed < input.len() {
            let before = self.stream.total_in();
            self.stream
                .compress(&input[consumed..], &mut self.scratch, FlushCompress::None)
                .map_err(|e| BenchError::encoder(Backend::Deflate, e))?;
            consumed += (self.stream.total_in() - before) as usize;
        }

        self.phase = EncoderPhase::Finishing;
        loop {
            let status = self
                .stream
                .compress(&[], &mut self.scratch, FlushCompress::Finish)
                .map_err(|e| BenchError::encoder(Backend::Deflate, e))?;
            if status == Status::StreamEnd {
                break;
            }
        }

        self.phase = EncoderPhase::Done;
        Ok(self.stream.total_out())
    }

    fn backend(&self) -> Backend {
        Backend::Deflate
    }

    fn phase(&self) -> EncoderPhase {
        self.phase
    }
}
