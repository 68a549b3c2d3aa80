//! Live audio capture for wavi.
//!
//! Device selection plus the cpal input stream that feeds a live waveform
//! session from the capture callback thread.

pub mod audio;
pub mod devices;

pub use audio::{CaptureResult, LiveCapture};
