//! WAV decoding and encoding via hound.
//!
//! Produces the raw PCM16 LE byte chunks the waveform pipeline consumes, and
//! writes captured live sessions back out as 16-bit PCM WAV. Non-16-bit and
//! float sources are converted to i16 here, at the decode boundary, so the
//! downsampler only ever sees one sample layout.

use super::pipeline::SourceFormat;
use anyhow::{anyhow, Context, Result};
use hound::WavWriter;
use std::path::Path;

/// Samples per decoded chunk handed to the pipeline.
const CHUNK_SAMPLES: usize = 4096;

/// An opened WAV file as a stream of PCM16 byte chunks.
pub struct WavSource {
    format: SourceFormat,
    samples: Box<dyn Iterator<Item = Result<i16>> + Send>,
}

impl WavSource {
    /// Opens a WAV file and prepares sample conversion to i16.
    ///
    /// Fails if the file cannot be opened or its header cannot be parsed
    /// (the source-unavailable case; a mid-stream decode error surfaces
    /// later, from the chunk iterator).
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let spec = reader.spec();

        let format = SourceFormat {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        };
        tracing::info!(
            "Opened {}: {}ch, {}Hz, {}-bit {:?}",
            path.display(),
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            spec.sample_format
        );

        let samples: Box<dyn Iterator<Item = Result<i16>> + Send> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let bits = spec.bits_per_sample;
                if bits > 32 {
                    return Err(anyhow!("Unsupported bit depth: {bits}"));
                }
                Box::new(reader.into_samples::<i32>().map(move |s| {
                    let s = s.map_err(|e| anyhow!("Failed to decode sample: {e}"))?;
                    Ok(rescale_int(s, bits))
                }))
            }
            hound::SampleFormat::Float => Box::new(reader.into_samples::<f32>().map(|s| {
                let s = s.map_err(|e| anyhow!("Failed to decode sample: {e}"))?;
                Ok((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            })),
        };

        Ok(WavSource { format, samples })
    }

    /// Channel count and sample rate of the opened file.
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Consumes the source, yielding raw PCM16 LE byte chunks.
    ///
    /// The first decode error ends the stream; the pipeline discards the
    /// session when it sees it.
    pub fn chunks(self) -> impl Iterator<Item = Result<Vec<u8>>> + Send {
        WavChunks {
            samples: self.samples,
            failed: false,
        }
    }
}

/// Widens or narrows an integer sample of `bits` precision to 16 bits.
fn rescale_int(sample: i32, bits: u16) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else if bits < 16 {
        (sample << (16 - bits)) as i16
    } else {
        sample as i16
    }
}

struct WavChunks {
    samples: Box<dyn Iterator<Item = Result<i16>> + Send>,
    failed: bool,
}

impl Iterator for WavChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut bytes = Vec::with_capacity(CHUNK_SAMPLES * 2);
        for sample in self.samples.by_ref().take(CHUNK_SAMPLES) {
            match sample {
                Ok(s) => bytes.extend_from_slice(&s.to_le_bytes()),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        if bytes.is_empty() {
            None
        } else {
            Some(Ok(bytes))
        }
    }
}

/// Writes captured mono samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    tracing::debug!("WAV written: {} ({} samples)", path.display(), samples.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::pipeline::WaveformPipeline;

    fn temp_wav_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wavi_test_{}_{}.wav", std::process::id(), name))
    }

    #[test]
    fn test_rescale_int_widths() {
        assert_eq!(rescale_int(1000, 16), 1000);
        assert_eq!(rescale_int(-128, 8), -32768);
        assert_eq!(rescale_int(-(1 << 23), 24), i16::MIN);
        assert_eq!(rescale_int((1 << 23) - 1, 24), i16::MAX);
    }

    #[test]
    fn test_write_then_stream_round_trip() {
        let path = temp_wav_path("round_trip");
        let samples: Vec<i16> = vec![0, 1000, -2000, 500, 100, -100, 50, 50];
        write_wav(&path, &samples, 8000).unwrap();

        let source = WavSource::open(&path).unwrap();
        assert_eq!(source.format().channels, 1);
        assert_eq!(source.format().sample_rate, 8000);

        // 8000Hz at 2000 pixels/sec: 4 samples per pixel.
        let pipeline = WaveformPipeline::new(source.format(), 2000);
        let snapshot = pipeline.run(source.chunks()).unwrap();
        assert_eq!(snapshot.amplitudes.as_ref(), &[875.0, 75.0]);
        assert_eq!(snapshot.peak, 875.0);
        assert!((snapshot.duration_secs - 0.001).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_rejects_missing_file() {
        let path = temp_wav_path("does_not_exist");
        assert!(WavSource::open(&path).is_err());
    }
}
