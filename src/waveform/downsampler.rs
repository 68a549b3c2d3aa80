//! Streaming PCM16 downsampler.
//!
//! Converts an unbounded sequence of raw little-endian 16-bit PCM byte chunks
//! into one rectified, box-averaged amplitude per group of `samples_per_pixel`
//! samples, tracking the loudest amplitude seen. Chunks may arrive with
//! arbitrary boundaries (file decode buffers or live capture callbacks); the
//! output is identical regardless of how the byte stream is split.

/// Rectified box average of a raw PCM16 LE byte slice.
///
/// The window length is the slice's whole-sample count, so the same function
/// serves both the fixed-width per-pixel groups and the variable-width final
/// remainder. An odd trailing byte is ignored by the caller's slicing.
fn box_mean(bytes: &[u8]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for pair in bytes.chunks_exact(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        sum += (sample as f32).abs();
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f32
}

/// Incremental PCM16 → per-pixel amplitude converter.
///
/// One instance is scoped to a single downsampling session: feed chunks with
/// [`append`](Self::append), flush the tail with [`finish`](Self::finish),
/// read results with [`outputs`](Self::outputs) and
/// [`running_max`](Self::running_max) at any point (including mid-session,
/// for live preview).
pub struct StreamingDownsampler {
    /// Samples averaged into one output value. Fixed for the session.
    samples_per_pixel: usize,
    /// Bytes that do not yet complete a group. Always shorter than one group.
    pending: Vec<u8>,
    /// Per-pixel amplitudes in arrival order.
    outputs: Vec<f32>,
    /// Largest single output produced so far. Monotonically non-decreasing.
    running_max: f32,
}

impl StreamingDownsampler {
    /// Creates a downsampler averaging `samples_per_pixel` samples per output.
    ///
    /// A value of 0 is clamped to 1, so every sample maps to one output.
    pub fn new(samples_per_pixel: usize) -> Self {
        let samples_per_pixel = samples_per_pixel.max(1);
        StreamingDownsampler {
            samples_per_pixel,
            pending: Vec::with_capacity(samples_per_pixel * 2),
            outputs: Vec::new(),
            running_max: 0.0,
        }
    }

    /// Appends a raw PCM16 LE byte chunk and consumes every complete group.
    ///
    /// Complete groups in `bytes` are averaged straight from the input slice;
    /// only the sub-group tail is copied into the pending buffer, so the
    /// total work stays linear in the number of bytes ever appended. Returns
    /// the number of outputs newly produced (possibly 0).
    ///
    /// Must not be called after [`finish`](Self::finish).
    pub fn append(&mut self, mut bytes: &[u8]) -> usize {
        let group_bytes = self.samples_per_pixel * 2;
        let before = self.outputs.len();

        // Top up a partially filled group from the front of the chunk first,
        // preserving sample order across the chunk boundary.
        if !self.pending.is_empty() {
            let wanted = group_bytes - self.pending.len();
            let take = wanted.min(bytes.len());
            self.pending.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
            if self.pending.len() < group_bytes {
                return 0;
            }
            let amplitude = box_mean(&self.pending);
            self.push_output(amplitude);
            self.pending.clear();
        }

        let mut groups = bytes.chunks_exact(group_bytes);
        for group in &mut groups {
            let amplitude = box_mean(group);
            self.push_output(amplitude);
        }
        self.pending.extend_from_slice(groups.remainder());

        self.outputs.len() - before
    }

    /// Flushes the remainder as one final group of dynamic width.
    ///
    /// Whatever whole samples are still pending (even fewer than
    /// `samples_per_pixel`) are averaged into exactly one more output. A
    /// trailing odd byte that never became a full sample is dropped. With no
    /// pending whole sample this is a no-op. Returns the number of outputs
    /// produced (0 or 1).
    pub fn finish(&mut self) -> usize {
        let whole = self.pending.len() & !1;
        if whole == 0 {
            self.pending.clear();
            return 0;
        }
        let amplitude = box_mean(&self.pending[..whole]);
        self.push_output(amplitude);
        self.pending.clear();
        1
    }

    /// Amplitudes produced so far, in arrival order.
    pub fn outputs(&self) -> &[f32] {
        &self.outputs
    }

    /// Largest single amplitude produced so far (0 before any output).
    pub fn running_max(&self) -> f32 {
        self.running_max
    }

    /// Number of samples averaged into one output value.
    pub fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }

    fn push_output(&mut self, amplitude: f32) {
        if amplitude > self.running_max {
            self.running_max = amplitude;
        }
        self.outputs.push(amplitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_two_full_groups() {
        let mut ds = StreamingDownsampler::new(4);
        let produced = ds.append(&bytes_of(&[0, 1000, -2000, 500, 100, -100, 50, 50]));
        assert_eq!(produced, 2);
        assert_eq!(ds.outputs(), &[875.0, 75.0]);
        assert_eq!(ds.running_max(), 875.0);
        assert_eq!(ds.finish(), 0);
        assert_eq!(ds.outputs().len(), 2);
    }

    #[test]
    fn test_remainder_flushed_as_single_group() {
        let mut ds = StreamingDownsampler::new(4);
        ds.append(&bytes_of(&[0, 1000, -2000, 500, 300, -100]));
        assert_eq!(ds.outputs().len(), 1);
        assert_eq!(ds.finish(), 1);
        assert_eq!(ds.outputs().len(), 2);
        // Mean of |300| and |-100|.
        assert_eq!(ds.outputs()[1], 200.0);
    }

    #[test]
    fn test_chunk_boundaries_do_not_matter() {
        let samples: Vec<i16> = (0..997).map(|i| ((i * 37) % 5000) as i16 - 2500).collect();
        let bytes = bytes_of(&samples);

        let mut all_at_once = StreamingDownsampler::new(7);
        all_at_once.append(&bytes);
        all_at_once.finish();

        let mut byte_by_byte = StreamingDownsampler::new(7);
        for b in &bytes {
            byte_by_byte.append(std::slice::from_ref(b));
        }
        byte_by_byte.finish();

        assert_eq!(all_at_once.outputs(), byte_by_byte.outputs());
        assert_eq!(all_at_once.running_max(), byte_by_byte.running_max());
    }

    #[test]
    fn test_output_count_matches_sample_count() {
        let samples: Vec<i16> = vec![123; 26];
        let mut ds = StreamingDownsampler::new(4);
        ds.append(&bytes_of(&samples));
        assert_eq!(ds.outputs().len(), 26 / 4);
        ds.finish();
        // 26 % 4 != 0, so the flush adds exactly one more.
        assert_eq!(ds.outputs().len(), 26 / 4 + 1);
    }

    #[test]
    fn test_group_larger_than_whole_stream() {
        let mut ds = StreamingDownsampler::new(1000);
        ds.append(&bytes_of(&[100, -300]));
        assert!(ds.outputs().is_empty());
        assert_eq!(ds.finish(), 1);
        assert_eq!(ds.outputs(), &[200.0]);
    }

    #[test]
    fn test_finish_on_empty_buffer_is_noop() {
        let mut ds = StreamingDownsampler::new(4);
        ds.append(&bytes_of(&[1, 2, 3, 4]));
        let outputs_before = ds.outputs().to_vec();
        let max_before = ds.running_max();
        assert_eq!(ds.finish(), 0);
        assert_eq!(ds.outputs(), outputs_before.as_slice());
        assert_eq!(ds.running_max(), max_before);
    }

    #[test]
    fn test_trailing_odd_byte_is_dropped() {
        let mut ds = StreamingDownsampler::new(2);
        let mut bytes = bytes_of(&[500, -500]);
        bytes.push(0x7f);
        ds.append(&bytes);
        assert_eq!(ds.outputs(), &[500.0]);
        assert_eq!(ds.finish(), 0);
        assert_eq!(ds.outputs(), &[500.0]);
    }

    #[test]
    fn test_odd_byte_completes_on_next_chunk() {
        let bytes = bytes_of(&[1000, 2000]);
        let mut ds = StreamingDownsampler::new(2);
        ds.append(&bytes[..3]);
        assert!(ds.outputs().is_empty());
        ds.append(&bytes[3..]);
        assert_eq!(ds.outputs(), &[1500.0]);
    }

    #[test]
    fn test_max_is_monotonic_and_outputs_non_negative() {
        let samples: Vec<i16> = vec![-30000, 42, i16::MIN, 7, -1, 0, 12000, -5];
        let mut ds = StreamingDownsampler::new(3);
        let mut last_max = 0.0f32;
        for s in &samples {
            ds.append(&s.to_le_bytes());
            assert!(ds.running_max() >= last_max);
            last_max = ds.running_max();
        }
        ds.finish();
        assert!(ds.running_max() >= last_max);
        assert!(ds.outputs().iter().all(|&a| a >= 0.0));
    }

    #[test]
    fn test_zero_samples_per_pixel_clamps_to_one() {
        let mut ds = StreamingDownsampler::new(0);
        assert_eq!(ds.samples_per_pixel(), 1);
        ds.append(&bytes_of(&[-123]));
        assert_eq!(ds.outputs(), &[123.0]);
    }
}
