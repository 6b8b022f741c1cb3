pub mod audio_reader;
pub mod pcm_audio;
pub mod transcript;
pub mod transcription_engine;
