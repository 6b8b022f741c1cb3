//! Job pipeline for a speech-to-text worker.
//!
//! A job names its audio either inline (base64) or by URL. The pipeline
//! validates it, acquires the audio into a per-job temp file (downloads are
//! capped at a hard byte ceiling), runs the shared transcription engine and
//! returns segment/word results or a single error message.

pub mod acquisition;
pub mod audio;
pub mod job;
pub mod pipeline;
pub mod shared;
