pub mod job_logger;
pub mod transcribe_job_use_case;
pub mod transcription_adapter;
