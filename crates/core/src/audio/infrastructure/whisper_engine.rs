use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::transcript::{RawSegment, RawWord};
use crate::audio::domain::transcription_engine::{
    EngineError, RawSegments, TranscribeOptions, TranscriptionEngine,
};
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::shared::device::Device;

/// Transcription engine backed by whisper.cpp via whisper-rs.
///
/// The model context is loaded once and shared by every job. Each call gets
/// its own inference state; inference itself is serialized behind a
/// process-wide lock so concurrent jobs never compete for the device.
pub struct WhisperEngine {
    ctx: WhisperContext,
    reader: Box<dyn AudioReader>,
    threads: usize,
    inference_lock: Mutex<()>,
}

impl WhisperEngine {
    pub fn load(
        model_path: &Path,
        device: Device,
        threads: usize,
        reader: Box<dyn AudioReader>,
    ) -> Result<Self, EngineError> {
        if !model_path.exists() {
            return Err(EngineError::ModelNotFound(model_path.display().to_string()));
        }

        log::info!(
            "Loading model: {} using device={device}",
            model_path.display()
        );
        let t0 = Instant::now();

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(device.use_gpu());
        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| EngineError::Load("model path is not valid UTF-8".into()))?,
            ctx_params,
        )
        .map_err(|e| EngineError::Load(e.to_string()))?;

        log::info!("Model loaded in {:.1} seconds.", t0.elapsed().as_secs_f64());

        Ok(Self {
            ctx,
            reader,
            threads: threads.max(1),
            inference_lock: Mutex::new(()),
        })
    }

    fn run_inference(
        &self,
        samples: &[f32],
        options: &TranscribeOptions,
    ) -> Result<WhisperState, EngineError> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| EngineError::Inference(format!("failed to create state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(options.language.as_str()));
        params.set_translate(false);
        params.set_token_timestamps(options.word_timestamps);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.threads as i32);

        let _guard = exclusive(&self.inference_lock);
        state
            .full(params, samples)
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        Ok(state)
    }
}

impl TranscriptionEngine for WhisperEngine {
    fn transcribe<'a>(
        &'a self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<RawSegments<'a>, EngineError> {
        let audio = self
            .reader
            .read_audio(audio_path, WHISPER_SAMPLE_RATE)?
            .ok_or_else(|| {
                EngineError::Decode(format!("no audio stream in {}", audio_path.display()))
            })?;
        log::debug!("Decoded {:.1}s of audio", audio.duration());

        let state = self.run_inference(audio.samples(), options)?;
        let count = state.full_n_segments();

        let segments: RawSegments<'a> = Box::new(SegmentIter {
            state,
            next: 0,
            count,
            word_timestamps: options.word_timestamps,
        });
        Ok(segments)
    }
}

/// Serializes inference. The lock guards `()`, so a poisoned lock is reused.
fn exclusive(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Walks the finished inference state one segment at a time.
struct SegmentIter {
    state: WhisperState,
    next: i32,
    count: i32,
    word_timestamps: bool,
}

impl Iterator for SegmentIter {
    type Item = Result<RawSegment, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let idx = self.next;
        self.next += 1;

        let Some(segment) = self.state.get_segment(idx) else {
            return Some(Err(EngineError::Inference(format!(
                "segment {idx} missing from inference results"
            ))));
        };

        let text = segment
            .to_bytes()
            .ok()
            .map(|b| String::from_utf8_lossy(b).into_owned());

        let words = if self.word_timestamps {
            let pieces: Vec<TokenPiece> = (0..segment.n_tokens())
                .filter_map(|i| segment.get_token(i))
                .filter_map(|token| {
                    let bytes = token.to_bytes().ok()?.to_vec();
                    let data = token.token_data();
                    Some(TokenPiece {
                        bytes,
                        start: centis_to_secs(data.t0),
                        end: centis_to_secs(data.t1),
                        probability: token.token_probability(),
                    })
                })
                .collect();
            merge_tokens(&pieces)
        } else {
            Vec::new()
        };

        Some(Ok(RawSegment {
            id: idx as u32 + 1,
            start: centis_to_secs(segment.start_timestamp()),
            end: centis_to_secs(segment.end_timestamp()),
            text,
            words,
        }))
    }
}

/// One decoded token with its timing.
#[derive(Clone, Debug)]
struct TokenPiece {
    bytes: Vec<u8>,
    start: f64,
    end: f64,
    probability: f32,
}

impl TokenPiece {
    // [_BEG_], [_TT_150], <|endoftext|> and friends
    fn is_special(&self) -> bool {
        self.bytes.starts_with(b"[_") || self.bytes.starts_with(b"<|")
    }
}

/// Merge sub-word tokens into words.
///
/// A token starting with a space opens a new word. Bytes are joined before
/// UTF-8 decoding since multi-byte characters can span tokens. Word
/// probability is the mean of its token probabilities.
fn merge_tokens(pieces: &[TokenPiece]) -> Vec<RawWord> {
    let mut words = Vec::new();
    let mut current: Option<(Vec<u8>, f64, f64, Vec<f32>)> = None;

    for piece in pieces.iter().filter(|p| !p.is_special() && !p.bytes.is_empty()) {
        let starts_word = piece.bytes.first() == Some(&b' ');
        if !starts_word {
            if let Some((bytes, _, end, probs)) = current.as_mut() {
                bytes.extend_from_slice(&piece.bytes);
                *end = piece.end;
                probs.push(piece.probability);
                continue;
            }
        }
        if let Some(done) = current.take() {
            words.push(finish_word(done));
        }
        current = Some((
            piece.bytes.clone(),
            piece.start,
            piece.end,
            vec![piece.probability],
        ));
    }
    if let Some(done) = current {
        words.push(finish_word(done));
    }
    words
}

fn finish_word((bytes, start, end, probs): (Vec<u8>, f64, f64, Vec<f32>)) -> RawWord {
    let probability = probs.iter().sum::<f32>() / probs.len().max(1) as f32;
    RawWord {
        word: String::from_utf8_lossy(&bytes).into_owned(),
        start,
        end,
        probability,
    }
}

/// whisper.cpp timestamps are in centiseconds (10ms units).
fn centis_to_secs(t: i64) -> f64 {
    t as f64 / 100.0
}
