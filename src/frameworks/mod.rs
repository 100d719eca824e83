pub mod cli;
pub mod client;
pub mod config;
pub mod logging;

pub use client::build_api_client;
pub use config::{ClientConfig, ConfigError, FileConfig};
pub use logging::init_tracing;
