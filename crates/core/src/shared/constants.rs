pub const WHISPER_MODEL_NAME: &str = "ggml-large-v3-turbo.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3-turbo.bin";
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Language passed to the engine for every job.
pub const DEFAULT_LANGUAGE: &str = "he";

/// Hard ceiling for downloaded job audio: 200 MiB.
pub const MAX_PAYLOAD_SIZE: u64 = 200 * 1024 * 1024;

/// Ceiling for model downloads, which are far larger than job audio.
pub const MODEL_MAX_SIZE: u64 = 4 * 1024 * 1024 * 1024;

pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// File name of the per-job audio resource inside its temp directory.
pub const AUDIO_FILE_NAME: &str = "audio.mp3";

/// Decimal places kept on word confidence scores.
pub const SCORE_DECIMALS: i32 = 3;
