use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::acquisition::domain::audio_resource::{decode_blob, AudioResource};
use crate::acquisition::domain::remote_fetcher::RemoteFetcher;
use crate::audio::domain::transcript::Segment;
use crate::audio::domain::transcription_engine::{EngineError, TranscriptionEngine};
use crate::job::domain::job::{AudioSource, JobDescriptor};
use crate::job::domain::job_error::JobError;
use crate::job::domain::job_result::{JobResult, ResultAssembler};
use crate::job::domain::job_validator::JobValidator;
use crate::pipeline::job_logger::JobLogger;
use crate::pipeline::transcription_adapter::TranscriptionAdapter;
use crate::shared::worker_config::WorkerConfig;

/// The job handler: one job in, one [`JobResult`] out.
///
/// Validation runs before any I/O. The audio resource lives exactly as long
/// as one call to [`handle`](Self::handle) and is removed on every exit path,
/// including a panic inside the engine.
pub struct TranscribeJobUseCase {
    adapter: TranscriptionAdapter,
    fetcher: Box<dyn RemoteFetcher>,
    scratch_dir: Option<PathBuf>,
}

impl TranscribeJobUseCase {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        fetcher: Box<dyn RemoteFetcher>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            adapter: TranscriptionAdapter::new(engine, &config.language),
            fetcher,
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    /// Process one raw job. Never fails and never panics past this call.
    pub fn handle(&self, job: &Value, logger: &mut dyn JobLogger) -> JobResult {
        let result = ResultAssembler::finish(self.run(job, logger));
        if let Some(message) = result.error_message() {
            log::warn!("Job failed: {message}");
        }
        logger.summary();
        result
    }

    fn run(&self, job: &Value, logger: &mut dyn JobLogger) -> Result<Vec<Segment>, JobError> {
        let descriptor = JobValidator::validate(job)?;
        logger.info(&format!("Accepted {} job", descriptor.source.kind()));

        let started = Instant::now();
        let resource = self.acquire(&descriptor)?;
        logger.timing("acquire", elapsed_ms(started));

        let started = Instant::now();
        let segments = self.transcribe(resource.path(), logger)?;
        logger.timing("transcribe", elapsed_ms(started));

        Ok(segments)
    }

    fn acquire(&self, descriptor: &JobDescriptor) -> Result<AudioResource, JobError> {
        match &descriptor.source {
            AudioSource::Blob { data } => {
                let bytes = decode_blob(data)
                    .map_err(|e| JobError::input(format!("invalid base64 data: {e}")))?;
                let resource = self.create_resource()?;
                resource.write_bytes(&bytes).map_err(JobError::Acquisition)?;
                Ok(resource)
            }
            AudioSource::Url { url } => {
                let resource = self.create_resource()?;
                self.fetcher
                    .fetch(url, resource.path(), descriptor.api_key.as_deref())
                    .map_err(|source| JobError::Download {
                        url: url.clone(),
                        source,
                    })?;
                Ok(resource)
            }
        }
    }

    fn create_resource(&self) -> Result<AudioResource, JobError> {
        AudioResource::create(self.scratch_dir.as_deref()).map_err(JobError::Acquisition)
    }

    fn transcribe(
        &self,
        audio_path: &Path,
        logger: &mut dyn JobLogger,
    ) -> Result<Vec<Segment>, JobError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.adapter.transcribe(audio_path, logger)
        }));
        match outcome {
            Ok(result) => result.map_err(JobError::Transcription),
            Err(payload) => Err(JobError::Transcription(EngineError::Panicked(
                panic_message(payload.as_ref()),
            ))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
