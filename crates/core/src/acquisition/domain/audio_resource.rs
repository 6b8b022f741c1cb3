use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tempfile::TempDir;

use crate::shared::constants::AUDIO_FILE_NAME;

/// Scratch file holding one job's audio.
///
/// Owns a private temp directory that is removed when the resource is
/// dropped, including during unwinding.
#[derive(Debug)]
pub struct AudioResource {
    dir: TempDir,
    path: PathBuf,
}

impl AudioResource {
    /// Create an empty resource in `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let dir = match parent {
            Some(p) => tempfile::Builder::new().prefix("job-").tempdir_in(p)?,
            None => tempfile::Builder::new().prefix("job-").tempdir()?,
        };
        let path = dir.path().join(AUDIO_FILE_NAME);
        Ok(Self { dir, path })
    }

    /// Path of the audio file. It may not exist until written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)
    }
}

/// Decode a base64 payload, ignoring ASCII whitespace such as line wraps.
pub fn decode_blob(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}
