//! Application command handlers for wavi.
//!
//! Each submodule handles one application command.
//!
//! # Commands
//! - `view`: Render the waveform of an audio file
//! - `record`: Live capture with a scrolling waveform
//! - `config`: Open configuration file in the user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod view;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use view::handle_view;
