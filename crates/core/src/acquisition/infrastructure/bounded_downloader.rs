use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use reqwest::blocking::{Client, Response};

use crate::acquisition::domain::remote_fetcher::{DownloadError, ProgressFn, RemoteFetcher};
use crate::shared::constants::DOWNLOAD_CHUNK_SIZE;

/// HTTP(S) fetcher with a hard byte ceiling.
///
/// The ceiling is enforced twice: against the advertised `Content-Length`
/// before any body byte is written, and against the running total while the
/// body streams to disk. The body is never buffered whole in memory.
pub struct BoundedDownloader {
    client: Client,
    max_size_bytes: u64,
    chunk_size: usize,
    progress: Option<ProgressFn>,
}

impl BoundedDownloader {
    pub fn new(max_size_bytes: u64) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(DownloadError::Request)?;
        Ok(Self {
            client,
            max_size_bytes,
            chunk_size: DOWNLOAD_CHUNK_SIZE,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Download `url` into `destination`, returning the bytes written.
    ///
    /// `destination` is only created once the status and advertised size
    /// have been accepted. A partially written file is removed on failure.
    pub fn download(
        &self,
        url: &str,
        destination: &Path,
        bearer_token: Option<&str>,
    ) -> Result<u64, DownloadError> {
        let response = match self.open(url, bearer_token) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Error downloading file from {url}: {e}");
                return Err(e);
            }
        };

        let result = self.write_body(response, destination);
        match &result {
            Ok(written) => log::info!(
                "File downloaded successfully: {} ({written} bytes)",
                destination.display()
            ),
            Err(e) => {
                log::warn!("Error downloading file from {url}: {e}");
                let _ = fs::remove_file(destination);
            }
        }
        result
    }

    fn open(&self, url: &str, bearer_token: Option<&str>) -> Result<Response, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer_token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(DownloadError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        if let Some(advertised) = response.content_length() {
            if advertised > self.max_size_bytes {
                return Err(DownloadError::AdvertisedTooLarge {
                    advertised,
                    limit: self.max_size_bytes,
                });
            }
        }

        Ok(response)
    }

    fn write_body(&self, mut response: Response, destination: &Path) -> Result<u64, DownloadError> {
        let total = response.content_length().unwrap_or(0);
        let write_err = |source| DownloadError::Write {
            path: destination.to_path_buf(),
            source,
        };

        let mut file = fs::File::create(destination).map_err(write_err)?;
        let mut buf = vec![0u8; self.chunk_size];
        let mut downloaded: u64 = 0;

        loop {
            let n = response.read(&mut buf).map_err(DownloadError::Interrupted)?;
            if n == 0 {
                break;
            }
            downloaded += n as u64;
            // Covers servers that omit or understate Content-Length.
            if downloaded > self.max_size_bytes {
                return Err(DownloadError::LimitExceeded {
                    limit: self.max_size_bytes,
                });
            }
            file.write_all(&buf[..n]).map_err(write_err)?;
            if let Some(ref cb) = self.progress {
                cb(downloaded, total);
            }
        }

        file.flush().map_err(write_err)?;
        Ok(downloaded)
    }
}

impl RemoteFetcher for BoundedDownloader {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        bearer_token: Option<&str>,
    ) -> Result<u64, DownloadError> {
        self.download(url, destination, bearer_token)
    }
}
