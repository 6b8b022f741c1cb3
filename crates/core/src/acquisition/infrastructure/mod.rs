pub mod bounded_downloader;

#[cfg(test)]
pub(crate) mod http_stub;
