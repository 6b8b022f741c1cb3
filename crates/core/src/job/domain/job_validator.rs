use serde_json::Value;

use super::job::{AudioSource, JobDescriptor};
use super::job_error::JobError;

pub const MISSING_INPUT: &str = "missing input in job";
pub const MISSING_TYPE: &str = "datatype field not provided. Should be 'blob' or 'url'.";
pub const MISSING_DATA: &str = "data field not provided for blob input.";
pub const MISSING_URL: &str = "url field not provided for url input.";

/// Checks the shape of a raw job before any I/O happens.
///
/// Checks run in order and stop at the first failure:
/// `input` present, `input.type` present, `input.type` is `blob` or `url`,
/// then the payload field matching the type.
pub struct JobValidator;

impl JobValidator {
    pub fn validate(job: &Value) -> Result<JobDescriptor, JobError> {
        let input = match job.get("input") {
            Some(Value::Null) | None => return Err(JobError::input(MISSING_INPUT)),
            Some(input) => input,
        };

        let datatype = match input.get("type") {
            Some(t) if !is_blank(t) => t,
            _ => return Err(JobError::input(MISSING_TYPE)),
        };

        let source = match datatype.as_str() {
            Some("blob") => {
                let data = required_string(input, "data")
                    .ok_or_else(|| JobError::input(MISSING_DATA))?;
                AudioSource::Blob { data }
            }
            Some("url") => {
                let url = required_string(input, "url")
                    .ok_or_else(|| JobError::input(MISSING_URL))?;
                AudioSource::Url { url }
            }
            Some(other) => return Err(unsupported(other)),
            None => return Err(unsupported(&datatype.to_string())),
        };

        Ok(JobDescriptor {
            source,
            api_key: required_string(input, "api_key"),
        })
    }
}

fn unsupported(value: &str) -> JobError {
    JobError::input(format!(
        "datatype should be 'blob' or 'url', but is {value} instead."
    ))
}

/// `null`, `false`, zero, and empty strings, arrays or objects.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// A non-empty string field, or `None`.
fn required_string(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn message(job: Value) -> String {
        JobValidator::validate(&job).unwrap_err().to_string()
    }

    #[rstest]
    #[case::empty_job(json!({}))]
    #[case::null_input(json!({"input": null}))]
    #[case::other_keys(json!({"id": "abc", "inputs": {"type": "blob"}}))]
    fn test_missing_input(#[case] job: Value) {
        assert_eq!(message(job), "missing input in job");
    }

    #[rstest]
    #[case::no_type(json!({"input": {"data": "aGk="}}))]
    #[case::null_type(json!({"input": {"type": null}}))]
    #[case::empty_type(json!({"input": {"type": ""}}))]
    #[case::input_not_object(json!({"input": "blob"}))]
    #[case::false_type(json!({"input": {"type": false}}))]
    #[case::zero_type(json!({"input": {"type": 0}}))]
    #[case::empty_list_type(json!({"input": {"type": []}}))]
    #[case::empty_object_type(json!({"input": {"type": {}}}))]
    fn test_missing_type(#[case] job: Value) {
        assert_eq!(
            message(job),
            "datatype field not provided. Should be 'blob' or 'url'."
        );
    }

    #[rstest]
    #[case::file(json!({"input": {"type": "file"}}), "file")]
    #[case::uppercase(json!({"input": {"type": "URL", "url": "http://x"}}), "URL")]
    #[case::number(json!({"input": {"type": 5}}), "5")]
    #[case::boolean(json!({"input": {"type": true}}), "true")]
    #[case::list(json!({"input": {"type": ["url"]}}), "[\"url\"]")]
    fn test_unsupported_type_names_value(#[case] job: Value, #[case] shown: &str) {
        assert_eq!(
            message(job),
            format!("datatype should be 'blob' or 'url', but is {shown} instead.")
        );
    }

    #[test]
    fn test_type_checked_before_payload() {
        // Missing data must not mask an unsupported type.
        let msg = message(json!({"input": {"type": "ftp"}}));
        assert!(msg.contains("ftp"));
    }

    #[test]
    fn test_blob_requires_data() {
        assert_eq!(message(json!({"input": {"type": "blob"}})), MISSING_DATA);
        assert_eq!(
            message(json!({"input": {"type": "blob", "data": ""}})),
            MISSING_DATA
        );
    }

    #[test]
    fn test_url_requires_url() {
        assert_eq!(
            message(json!({"input": {"type": "url", "url": 42}})),
            MISSING_URL
        );
    }

    #[test]
    fn test_valid_blob() {
        let descriptor =
            JobValidator::validate(&json!({"input": {"type": "blob", "data": "aGk="}})).unwrap();
        assert_eq!(
            descriptor.source,
            AudioSource::Blob {
                data: "aGk=".to_string()
            }
        );
        assert_eq!(descriptor.source.kind(), "blob");
        assert!(descriptor.api_key.is_none());
    }

    #[test]
    fn test_valid_url_with_api_key() {
        let descriptor = JobValidator::validate(&json!({
            "input": {"type": "url", "url": "https://example.com/a.mp3", "api_key": "k"}
        }))
        .unwrap();
        assert_eq!(
            descriptor.source,
            AudioSource::Url {
                url: "https://example.com/a.mp3".to_string()
            }
        );
        assert_eq!(descriptor.api_key.as_deref(), Some("k"));
    }

    #[rstest]
    #[case::empty(json!(""))]
    #[case::number(json!(12))]
    #[case::null(json!(null))]
    fn test_unusable_api_key_is_dropped(#[case] key: Value) {
        let descriptor = JobValidator::validate(&json!({
            "input": {"type": "url", "url": "https://example.com/a.mp3", "api_key": key}
        }))
        .unwrap();
        assert!(descriptor.api_key.is_none());
    }
}
