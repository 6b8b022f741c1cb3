use thiserror::Error;

use crate::acquisition::domain::remote_fetcher::DownloadError;
use crate::audio::domain::transcription_engine::EngineError;

/// Terminal failure of one job. The first failure wins; none is ever
/// converted into another kind.
#[derive(Error, Debug)]
pub enum JobError {
    /// Malformed or missing job fields, detected before any I/O.
    #[error("{0}")]
    Input(String),
    #[error("Error downloading data from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },
    /// Local I/O while preparing the audio resource.
    #[error("failed to prepare audio file: {0}")]
    Acquisition(#[source] std::io::Error),
    #[error("transcription failed: {0}")]
    Transcription(#[source] EngineError),
}

impl JobError {
    pub fn input(message: impl Into<String>) -> Self {
        JobError::Input(message.into())
    }
}
