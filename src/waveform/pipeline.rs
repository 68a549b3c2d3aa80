//! Waveform session orchestration.
//!
//! Fixes the decimation factor from the source format, drives PCM chunks from
//! a producer into a [`StreamingDownsampler`], and publishes results as
//! immutable snapshots. A session either completes and publishes atomically
//! or fails and is discarded whole; a renderer never sees partial state from
//! a failed session.

use super::downsampler::StreamingDownsampler;
use anyhow::Result;
use std::sync::Arc;

/// Out-of-band metadata for one PCM source, supplied once per session.
#[derive(Debug, Clone, Copy)]
pub struct SourceFormat {
    /// Interleaved channel count.
    pub channels: u16,
    /// Source sample rate in Hz.
    pub sample_rate: u32,
}

/// Number of consecutive samples (across all interleaved channels) averaged
/// into one waveform pixel.
///
/// `target_samples_per_sec` is the wanted pixel density per second of audio.
pub fn samples_per_pixel(format: SourceFormat, target_samples_per_sec: u32) -> usize {
    let per_channel = (format.sample_rate / target_samples_per_sec.max(1)) as usize;
    (format.channels as usize * per_channel).max(1)
}

/// Immutable published result of a waveform session.
///
/// `peak` is the normalization reference the renderer should divide by: the
/// session's own running max for completed offline renders, or a fixed
/// caller-supplied ceiling for live previews (so bars already on screen do
/// not rescale when louder audio arrives later).
#[derive(Debug, Clone)]
pub struct WaveformSnapshot {
    /// One non-negative amplitude per pixel, in time order.
    pub amplitudes: Arc<[f32]>,
    /// Normalization reference, >= every value in `amplitudes` for offline
    /// sessions.
    pub peak: f32,
    /// Seconds of audio represented by `amplitudes`.
    pub duration_secs: f64,
}

impl WaveformSnapshot {
    /// Amplitudes scaled to 0..=`scale` against this snapshot's peak.
    ///
    /// A silent or empty session (peak 0) scales to all zeros.
    pub fn normalized(&self, scale: u64) -> Vec<u64> {
        if self.peak <= 0.0 {
            return vec![0; self.amplitudes.len()];
        }
        self.amplitudes
            .iter()
            .map(|&a| ((a / self.peak) * scale as f32).round() as u64)
            .collect()
    }
}

/// One downsampling session from first chunk through publish or discard.
pub struct WaveformPipeline {
    downsampler: StreamingDownsampler,
    format: SourceFormat,
    bytes_consumed: u64,
}

impl WaveformPipeline {
    /// Starts a session for `format` at the given pixel density.
    pub fn new(format: SourceFormat, target_samples_per_sec: u32) -> Self {
        let spp = samples_per_pixel(format, target_samples_per_sec);
        tracing::debug!(
            "Waveform session: {}ch @ {}Hz, {} samples per pixel",
            format.channels,
            format.sample_rate,
            spp
        );
        WaveformPipeline {
            downsampler: StreamingDownsampler::new(spp),
            format,
            bytes_consumed: 0,
        }
    }

    /// Feeds one raw PCM16 LE chunk. Returns newly produced pixel count.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        self.bytes_consumed += bytes.len() as u64;
        self.downsampler.append(bytes)
    }

    /// Seconds of audio consumed so far.
    pub fn duration_secs(&self) -> f64 {
        let samples = self.bytes_consumed / 2;
        let frames = samples as f64 / self.format.channels as f64;
        frames / self.format.sample_rate as f64
    }

    /// Mid-session snapshot for a live preview.
    ///
    /// Uses `peak_ceiling` as the normalization reference instead of the
    /// running max.
    pub fn live_snapshot(&self, peak_ceiling: f32) -> WaveformSnapshot {
        WaveformSnapshot {
            amplitudes: Arc::from(self.downsampler.outputs()),
            peak: peak_ceiling,
            duration_secs: self.duration_secs(),
        }
    }

    /// Flushes the remainder and publishes the session's final snapshot.
    ///
    /// Consumes the pipeline: nothing can be appended to a finished session.
    pub fn finish(mut self) -> WaveformSnapshot {
        self.downsampler.finish();
        let snapshot = WaveformSnapshot {
            amplitudes: Arc::from(self.downsampler.outputs()),
            peak: self.downsampler.running_max(),
            duration_secs: self.duration_secs(),
        };
        tracing::debug!(
            "Waveform session complete: {} pixels, peak {:.1}, {:.2}s",
            snapshot.amplitudes.len(),
            snapshot.peak,
            snapshot.duration_secs
        );
        snapshot
    }

    /// Drains a fallible chunk producer to completion.
    ///
    /// On normal exhaustion the remainder is flushed and one snapshot is
    /// published. The first producer error discards the whole session; no
    /// partial output ever escapes.
    pub fn run<I>(mut self, chunks: I) -> Result<WaveformSnapshot>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
    {
        for chunk in chunks {
            self.append(&chunk?);
        }
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn bytes_of(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_samples_per_pixel_formula() {
        let stereo_44k = SourceFormat {
            channels: 2,
            sample_rate: 44100,
        };
        // 2 * floor(44100 / 80)
        assert_eq!(samples_per_pixel(stereo_44k, 80), 1102);

        let mono_16k = SourceFormat {
            channels: 1,
            sample_rate: 16000,
        };
        assert_eq!(samples_per_pixel(mono_16k, 80), 200);

        // Density above the sample rate floors to zero per channel and
        // clamps to one sample per pixel.
        assert_eq!(samples_per_pixel(mono_16k, 20000), 1);
    }

    #[test]
    fn test_run_publishes_once_on_success() {
        let format = SourceFormat {
            channels: 1,
            sample_rate: 8,
        };
        // 8Hz at 2 pixels/sec: 4 samples per pixel.
        let pipeline = WaveformPipeline::new(format, 2);
        let chunks = vec![
            Ok(bytes_of(&[0, 1000, -2000, 500])),
            Ok(bytes_of(&[100, -100])),
        ];
        let snapshot = pipeline.run(chunks).unwrap();
        assert_eq!(snapshot.amplitudes.as_ref(), &[875.0, 100.0]);
        assert_eq!(snapshot.peak, 875.0);
        // 6 mono samples at 8Hz.
        assert!((snapshot.duration_secs - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_run_discards_session_on_producer_failure() {
        let format = SourceFormat {
            channels: 1,
            sample_rate: 8,
        };
        let pipeline = WaveformPipeline::new(format, 2);
        let chunks = vec![
            Ok(bytes_of(&[0, 1000, -2000, 500])),
            Err(anyhow!("reader stopped before completion")),
            Ok(bytes_of(&[100, -100])),
        ];
        // One error, no data: the pixels produced before the failure are
        // dropped with the session.
        assert!(pipeline.run(chunks).is_err());
    }

    #[test]
    fn test_live_snapshot_uses_fixed_ceiling() {
        let format = SourceFormat {
            channels: 1,
            sample_rate: 8,
        };
        let mut pipeline = WaveformPipeline::new(format, 2);
        pipeline.append(&bytes_of(&[400, -400, 400, -400]));
        let snapshot = pipeline.live_snapshot(8000.0);
        assert_eq!(snapshot.peak, 8000.0);
        assert_eq!(snapshot.amplitudes.as_ref(), &[400.0]);
    }

    #[test]
    fn test_normalized_scales_against_peak() {
        let snapshot = WaveformSnapshot {
            amplitudes: Arc::from(vec![0.0, 250.0, 500.0, 1000.0].as_slice()),
            peak: 1000.0,
            duration_secs: 1.0,
        };
        assert_eq!(snapshot.normalized(100), vec![0, 25, 50, 100]);

        let silent = WaveformSnapshot {
            amplitudes: Arc::from(vec![0.0, 0.0].as_slice()),
            peak: 0.0,
            duration_secs: 1.0,
        };
        assert_eq!(silent.normalized(100), vec![0, 0]);
    }
}
