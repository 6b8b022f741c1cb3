use serde::{Deserialize, Serialize};

use super::job_error::JobError;
use crate::audio::domain::transcript::{Segment, Transcript};

/// What the runtime receives for one job: a result or an error, never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    Result(Transcript),
    Error(String),
}

impl JobResult {
    pub fn is_error(&self) -> bool {
        matches!(self, JobResult::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobResult::Error(message) => Some(message),
            JobResult::Result(_) => None,
        }
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            JobResult::Result(transcript) => Some(transcript),
            JobResult::Error(_) => None,
        }
    }
}

impl From<JobError> for JobResult {
    fn from(err: JobError) -> Self {
        JobResult::Error(err.to_string())
    }
}

/// Builds the response envelope for the success path.
pub struct ResultAssembler;

impl ResultAssembler {
    /// Wrap segments in emission order. No re-sorting happens here.
    pub fn assemble(segments: Vec<Segment>) -> JobResult {
        JobResult::Result(Transcript { segments })
    }

    /// Collapse a pipeline outcome into the single output shape.
    pub fn finish(outcome: Result<Vec<Segment>, JobError>) -> JobResult {
        match outcome {
            Ok(segments) => Self::assemble(segments),
            Err(err) => err.into(),
        }
    }
}
