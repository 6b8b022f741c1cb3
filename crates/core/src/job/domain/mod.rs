pub mod job;
pub mod job_error;
pub mod job_result;
pub mod job_validator;
