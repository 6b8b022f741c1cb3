/// Where the job's audio comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    /// Base64 payload carried in the job itself.
    Blob { data: String },
    /// Remote resource to download.
    Url { url: String },
}

impl AudioSource {
    pub fn kind(&self) -> &'static str {
        match self {
            AudioSource::Blob { .. } => "blob",
            AudioSource::Url { .. } => "url",
        }
    }
}

/// A validated job, ready for acquisition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobDescriptor {
    pub source: AudioSource,
    /// Forwarded as a bearer token when downloading. Never empty.
    pub api_key: Option<String>,
}
