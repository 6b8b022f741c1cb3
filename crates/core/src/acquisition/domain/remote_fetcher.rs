use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a fetch failed. Kept distinct so job errors can say what went wrong.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("connection interrupted while streaming body: {0}")]
    Interrupted(#[source] std::io::Error),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("advertised size of {advertised} bytes exceeds the limit of {limit} bytes")]
    AdvertisedTooLarge { advertised: u64, limit: u64 },
    #[error("download stopped: size limit of {limit} bytes exceeded")]
    LimitExceeded { limit: u64 },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Domain interface for pulling a remote resource onto local disk.
///
/// Returns the number of bytes written on success. On failure the
/// destination must not be treated as usable.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        bearer_token: Option<&str>,
    ) -> Result<u64, DownloadError>;
}
