use std::path::Path;
use std::sync::Arc;

use crate::audio::domain::transcript::Segment;
use crate::audio::domain::transcription_engine::{
    EngineError, TranscribeOptions, TranscriptionEngine,
};
use crate::pipeline::job_logger::JobLogger;

/// Calls the shared engine and projects its output into [`Segment`]s.
///
/// The engine's segment stream is consumed exactly once, in order. An error
/// anywhere in the stream fails the whole call; no partial list escapes.
pub struct TranscriptionAdapter {
    engine: Arc<dyn TranscriptionEngine>,
    options: TranscribeOptions,
}

impl TranscriptionAdapter {
    pub fn new(engine: Arc<dyn TranscriptionEngine>, language: &str) -> Self {
        Self {
            engine,
            options: TranscribeOptions {
                language: language.to_string(),
                word_timestamps: true,
            },
        }
    }

    pub fn transcribe(
        &self,
        audio_path: &Path,
        logger: &mut dyn JobLogger,
    ) -> Result<Vec<Segment>, EngineError> {
        logger.info("Transcribing...");

        let mut segments = Vec::new();
        for (i, raw) in self.engine.transcribe(audio_path, &self.options)?.enumerate() {
            let segment = Segment::from(raw?);
            logger.segment(
                i + 1,
                segment.start,
                segment.end,
                segment.approx_word_count(),
                &segment.text,
            );
            segments.push(segment);
        }
        Ok(segments)
    }
}
