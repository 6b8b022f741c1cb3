use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::acquisition::domain::remote_fetcher::{DownloadError, ProgressFn};
use crate::acquisition::infrastructure::bounded_downloader::BoundedDownloader;
use crate::shared::constants::MODEL_MAX_SIZE;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },
    #[error("failed to move model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Resolve a model file by name, checking cache locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for container images with the model baked in)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    resolve_in(&cache_dir, name, url, bundled_dir, progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading model {name} to {}", cache_dir.display());
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Transcribe Worker/models/`
/// - Linux: `$XDG_CACHE_HOME/Transcribe Worker/models/` or `~/.cache/Transcribe Worker/models/`
/// - Windows: `%LOCALAPPDATA%/Transcribe Worker/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Transcribe Worker").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Transcribe Worker").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

/// Stream to `<dest>.part`, then rename so a half-written model is never picked up.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let to_download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };

    let mut downloader = BoundedDownloader::new(MODEL_MAX_SIZE).map_err(to_download_err)?;
    if let Some(cb) = progress {
        downloader = downloader.with_progress(cb);
    }

    let temp_path = dest.with_extension("part");
    downloader
        .download(url, &temp_path, None)
        .map_err(to_download_err)?;

    fs::rename(&temp_path, dest).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ModelResolveError::Write {
            path: dest.to_path_buf(),
            source: e,
        }
    })
}
