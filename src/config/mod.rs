//! Configuration management for wavi.

pub mod file;

pub use file::{get_config_path, WaviConfig};
