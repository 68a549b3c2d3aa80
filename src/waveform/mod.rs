//! Waveform engine for wavi.
//!
//! Turns raw PCM16 byte streams into pixel-resolution amplitude envelopes:
//! the streaming downsampler does the rectify/decimate work, the pipeline
//! fixes the decimation factor and handles publish-or-discard, and the wav
//! module adapts WAV files into the byte chunks the pipeline consumes.

pub mod downsampler;
pub mod pipeline;
pub mod wav;

pub use downsampler::StreamingDownsampler;
pub use pipeline::{samples_per_pixel, SourceFormat, WaveformPipeline, WaveformSnapshot};
pub use wav::WavSource;
