//! Live audio capture feeding a waveform session.
//!
//! Captures i16 PCM from a cpal input device. Each capture callback appends
//! the interleaved buffer to the session's pipeline (on the callback thread,
//! where no work blocks) and publishes an immutable snapshot over a channel;
//! the render thread drains that channel, never touching session-owned state
//! directly. Dropping a `LiveCapture` without calling `stop` discards the
//! session whole.

use super::devices::resolve_input_device;
use crate::waveform::{SourceFormat, WaveformPipeline, WaveformSnapshot};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

struct LiveSession {
    pipeline: WaveformPipeline,
    /// Mono mixdown of everything captured, kept for the optional WAV save.
    samples: Vec<i16>,
}

/// Final result of a kept capture session.
pub struct CaptureResult {
    /// Atomic publish of the finished session.
    pub snapshot: WaveformSnapshot,
    /// Mono i16 samples for saving.
    pub samples: Vec<i16>,
    /// Actual device sample rate.
    pub sample_rate: u32,
}

/// An armed live capture session.
pub struct LiveCapture {
    sample_rate: u32,
    session: Arc<Mutex<LiveSession>>,
    stream: Option<cpal::Stream>,
    is_paused: Arc<Mutex<bool>>,
    snapshots: Receiver<WaveformSnapshot>,
}

impl LiveCapture {
    /// Opens the device given by `device_spec` and starts capturing.
    ///
    /// `target_samples_per_sec` fixes the waveform pixel density;
    /// `peak_ceiling` is the fixed normalization reference carried by every
    /// live snapshot, so bars already on screen keep their height as louder
    /// audio arrives.
    pub fn start(
        device_spec: &str,
        target_samples_per_sec: u32,
        peak_ceiling: f32,
    ) -> Result<LiveCapture> {
        let device = resolve_input_device(device_spec)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        let sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels();
        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            sample_rate,
            channels
        );

        let format = SourceFormat {
            channels,
            sample_rate,
        };
        let session = Arc::new(Mutex::new(LiveSession {
            pipeline: WaveformPipeline::new(format, target_samples_per_sec),
            samples: Vec::new(),
        }));
        let is_paused = Arc::new(Mutex::new(false));
        let (snapshot_tx, snapshot_rx) = mpsc::channel();

        let session_arc = Arc::clone(&session);
        let pause_arc = Arc::clone(&is_paused);
        let callback_channels = channels as usize;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if *pause_arc.lock().unwrap() {
                    return;
                }
                let mut session = session_arc.lock().unwrap();

                let mut bytes = Vec::with_capacity(data.len() * 2);
                for sample in data {
                    bytes.extend_from_slice(&sample.to_le_bytes());
                }
                session.pipeline.append(&bytes);
                mixdown(&mut session.samples, data, callback_channels);

                // One-way incremental publish per captured buffer. The render
                // thread may lag; it drains to the newest snapshot.
                let _ = snapshot_tx.send(session.pipeline.live_snapshot(peak_ceiling));
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(LiveCapture {
            sample_rate,
            session,
            stream: Some(stream),
            is_paused,
            snapshots: snapshot_rx,
        })
    }

    /// Drains the snapshot channel, returning the newest snapshot if any
    /// chunk arrived since the last call.
    pub fn latest_snapshot(&self) -> Option<WaveformSnapshot> {
        self.snapshots.try_iter().last()
    }

    /// Actual device sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds of audio captured so far.
    pub fn duration_secs(&self) -> f64 {
        self.session.lock().unwrap().pipeline.duration_secs()
    }

    /// Toggles between paused and capturing states.
    pub fn toggle_pause(&self) {
        let mut paused = self.is_paused.lock().unwrap();
        *paused = !*paused;
        tracing::debug!(
            "Capture {}",
            if *paused { "paused" } else { "resumed" }
        );
    }

    /// Whether capture is currently paused.
    pub fn is_paused(&self) -> bool {
        *self.is_paused.lock().unwrap()
    }

    /// Stops capturing and publishes the finished session.
    pub fn stop(mut self) -> Result<CaptureResult> {
        // Dropping the stream stops callbacks; the session Arc then has no
        // other holder.
        self.stream = None;
        let session = Arc::try_unwrap(self.session)
            .map_err(|_| anyhow!("Capture stream still holds the session"))?
            .into_inner()
            .map_err(|_| anyhow!("Capture session lock poisoned"))?;

        let sample_count = session.samples.len();
        let snapshot = session.pipeline.finish();
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            snapshot.duration_secs,
            sample_count,
            self.sample_rate
        );

        Ok(CaptureResult {
            snapshot,
            samples: session.samples,
            sample_rate: self.sample_rate,
        })
    }
}

/// Folds an interleaved buffer into mono by averaging channels per frame.
fn mixdown(samples: &mut Vec<i16>, data: &[i16], channels: usize) {
    match channels {
        0 | 1 => samples.extend_from_slice(data),
        _ => {
            for frame in data.chunks_exact(channels) {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                samples.push((sum / channels as i32) as i16);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixdown_mono_passthrough() {
        let mut out = Vec::new();
        mixdown(&mut out, &[1, -2, 3], 1);
        assert_eq!(out, vec![1, -2, 3]);
    }

    #[test]
    fn test_mixdown_stereo_averages_pairs() {
        let mut out = Vec::new();
        mixdown(&mut out, &[100, 300, -100, -300], 2);
        assert_eq!(out, vec![200, -200]);
    }

    #[test]
    fn test_mixdown_multichannel() {
        let mut out = Vec::new();
        mixdown(&mut out, &[90, 0, 30, 3, 3, 3], 3);
        assert_eq!(out, vec![40, 3]);
    }
}
