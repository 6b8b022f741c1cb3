pub mod audio_resource;
pub mod remote_fetcher;
