pub mod constants;
pub mod device;
pub mod model_resolver;
pub mod worker_config;
