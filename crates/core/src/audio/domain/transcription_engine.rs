use std::path::Path;

use thiserror::Error;

use super::transcript::RawSegment;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("model not found at: {0}")]
    ModelNotFound(String),
    #[error("failed to load model: {0}")]
    Load(String),
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("engine panicked: {0}")]
    Panicked(String),
}

/// Per-call engine options.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscribeOptions {
    pub language: String,
    pub word_timestamps: bool,
}

/// Lazy, finite, single-pass stream of engine segments.
pub type RawSegments<'a> = Box<dyn Iterator<Item = Result<RawSegment, EngineError>> + 'a>;

/// Domain interface for the speech-recognition engine.
///
/// Loaded once per process and shared read-only between jobs.
pub trait TranscriptionEngine: Send + Sync {
    fn transcribe<'a>(
        &'a self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<RawSegments<'a>, EngineError>;
}
