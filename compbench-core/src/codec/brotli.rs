//! Brotli adapter on top of the `brotli` crate's streaming encoder state.

use ::brotli::enc::encode::{
    BrotliEncoderOperation, BrotliEncoderParameter, BrotliEncoderStateStruct,
};
use ::brotli::enc::StandardAlloc;

use super::{Compressor, EncoderPhase, SCRATCH_SIZE};
use crate::error::{BenchError, BenchResult};
use crate::types::{Backend, Level};

type EncoderState = BrotliEncoderStateStruct<StandardAlloc>;

/// Brotli compressor.
///
/// The encoder state cannot be reset once finished, so each pass builds a
/// fresh one from the stored quality and dictionary. The scratch buffer is
/// kept across passes.
pub struct BrotliCompressor<'d> {
    quality: u32,
    dictionary: Option<&'d [u8]>,
    scratch: Box<[u8]>,
    phase: EncoderPhase,
}

impl<'d> BrotliCompressor<'d> {
    pub fn new(level: Level, dictionary: Option<&'d [u8]>) -> BenchResult<Self> {
        let quality = u32::try_from(level.value())
            .map_err(|_| BenchError::encoder(Backend::Brotli, "negative quality"))?;

        Ok(Self {
            quality,
            dictionary,
            scratch: vec![0u8; SCRATCH_SIZE].into_boxed_slice(),
            phase: EncoderPhase::Initialized,
        })
    }

    fn new_state(&self) -> BenchResult<EncoderState> {
        let mut state = EncoderState::new(StandardAlloc::default());
        if !state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_QUALITY, self.quality) {
            return Err(BenchError::encoder(
                Backend::Brotli,
                format!("quality {} rejected", self.quality),
            ));
        }
        if let Some(dictionary) = self.dictionary {
            state.set_custom_dictionary(dictionary.len(), dictionary);
        }
        Ok(state)
    }

    /// Run one `compress_stream` call into the scratch buffer.
    /// Returns the number of bytes it produced.
    fn drain(
        &mut self,
        state: &mut EncoderState,
        op: BrotliEncoderOperation,
        input: &[u8],
        available_in: &mut usize,
        next_in: &mut usize,
    ) -> BenchResult<u64> {
        let mut available_out = self.scratch.len();
        let mut next_out = 0usize;
        let mut total_out = None;
        let stage = match op {
            BrotliEncoderOperation::BROTLI_OPERATION_FINISH => "finish",
            _ => "process",
        };

        let ok = state.compress_stream(
            op,
            available_in,
            input,
            next_in,
            &mut available_out,
            &mut self.scratch,
            &mut next_out,
            &mut total_out,
            &mut |_, _, _, _| (),
        );
        if !ok {
            return Err(BenchError::encoder(
                Backend::Brotli,
                format!("compress_stream failed during {}", stage),
            ));
        }
        Ok(next_out as u64)
    }
}

impl Compressor for BrotliCompressor<'_> {
    fn compress_once(&mut self, input: &[u8]) -> BenchResult<u64> {
        let mut state = self.new_state()?;
        self.phase = EncoderPhase::Processing;

        let mut available_in = input.len();
        let mut next_in = 0usize;
        let mut produced = 0u64;

        while available_in > 0 {
            produced += self.drain(
                &mut state,
                BrotliEncoderOperation::BROTLI_OPERATION_PROCESS,
                input,
                &mut available_in,
                &mut next_in,
            )?;
        }

        self.phase = EncoderPhase::Finishing;
        while !state.is_finished() {
            produced += self.drain(
                &mut state,
                BrotliEncoderOperation::BROTLI_OPERATION_FINISH,
                input,
                &mut available_in,
                &mut next_in,
            )?;
        }

        self.phase = EncoderPhase::Done;
        Ok(produced)
    }

    fn backend(&self) -> Backend {
        Backend::Brotli
    }

    fn phase(&self) -> EncoderPhase {
        self.phase
    }
}
