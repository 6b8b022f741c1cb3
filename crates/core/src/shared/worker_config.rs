use std::path::PathBuf;

use super::constants::{DEFAULT_LANGUAGE, MAX_PAYLOAD_SIZE};
use super::device::DevicePolicy;

/// Process-wide settings, fixed before the first job is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Explicit model file. When `None` the model is resolved from cache or downloaded.
    pub model_path: Option<PathBuf>,
    pub device: DevicePolicy,
    /// Inference threads; `None` means min(available cores, 4).
    pub threads: Option<usize>,
    pub language: String,
    pub max_payload_size: u64,
    /// Parent directory for per-job temp resources; `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            device: DevicePolicy::Auto,
            threads: None,
            language: DEFAULT_LANGUAGE.to_string(),
            max_payload_size: MAX_PAYLOAD_SIZE,
            scratch_dir: None,
        }
    }
}

impl WorkerConfig {
    pub fn inference_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| num_cpus().min(4))
            .max(1)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = WorkerConfig::default();
        assert_eq!(config.max_payload_size, 209_715_200);
        assert_eq!(config.language, "he");
        assert_eq!(config.device, DevicePolicy::Auto);
        assert!(config.model_path.is_none());
    }

    #[test]
    fn test_inference_threads_capped() {
        let config = WorkerConfig::default();
        let threads = config.inference_threads();
        assert!((1..=4).contains(&threads));
    }

    #[test]
    fn test_inference_threads_explicit_zero_clamped() {
        let config = WorkerConfig {
            threads: Some(0),
            ..WorkerConfig::default()
        };
        assert_eq!(config.inference_threads(), 1);
    }
}
