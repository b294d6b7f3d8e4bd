//! Decoded audio representation.

/// A decoded audio clip: interleaved `f32` PCM in `[-1.0, 1.0]`.
///
/// Owned exclusively by the request that decoded it; every operation
/// returns a new clip and leaves the source untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl AudioClip {
    /// Creates a clip from interleaved samples. A trailing partial frame is
    /// dropped.
    pub fn new(sample_rate: u32, channels: u16, mut samples: Vec<f32>) -> Self {
        let channels = channels.max(1);
        let usable = samples.len() - samples.len() % channels as usize;
        samples.truncate(usable);
        Self {
            sample_rate: sample_rate.max(1),
            channels,
            samples,
        }
    }

    /// Creates a silent clip of the given duration.
    pub fn silent(sample_rate: u32, channels: u16, duration_ms: u64) -> Self {
        let frames = (sample_rate as u64 * duration_ms / 1000) as usize;
        Self::new(
            sample_rate,
            channels,
            vec![0.0; frames * channels.max(1) as usize],
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Returns the window `[start_ms, end_ms)`. The end is clamped to the
    /// clip duration; a start past the end yields an empty clip.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Self {
        let ch = self.channels as usize;
        let to_index = |ms: u64| {
            let frame = (self.sample_rate as u64).saturating_mul(ms) / 1000;
            (frame as usize).saturating_mul(ch).min(self.samples.len())
        };
        let start = to_index(start_ms);
        let end = to_index(end_ms);
        let samples = if start >= end {
            Vec::new()
        } else {
            self.samples[start..end].to_vec()
        };
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Returns a copy with the given gain applied, clamped to `[-1, 1]`.
    pub fn gained_db(&self, db: f32) -> Self {
        let factor = 10f32.powf(db / 20.0);
        let samples = self
            .samples
            .iter()
            .map(|s| (s * factor).clamp(-1.0, 1.0))
            .collect();
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Peak normalization leaving the given headroom below full scale.
    pub fn normalized_peak(&self, headroom_db: f32) -> Self {
        let peak = self.peak();
        if peak <= f32::EPSILON {
            return self.clone();
        }
        let target = 10f32.powf(-headroom_db.abs() / 20.0);
        let factor = target / peak;
        let samples = self
            .samples
            .iter()
            .map(|s| (s * factor).clamp(-1.0, 1.0))
            .collect();
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Mixes `other` into a copy of this clip starting at `offset_ms`.
    ///
    /// The overlay is clipped to this clip's duration; sample rate and
    /// channel count of `other` must already match.
    pub fn overlaid(&self, other: &AudioClip, offset_ms: u64) -> Self {
        let ch = self.channels as usize;
        let offset_frame = (self.sample_rate as u64).saturating_mul(offset_ms) / 1000;
        let offset = (offset_frame as usize).saturating_mul(ch);
        let mut samples = self.samples.clone();
        for (i, s) in other.samples.iter().enumerate() {
            let Some(slot) = offset.checked_add(i).and_then(|idx| samples.get_mut(idx)) else {
                break;
            };
            *slot = (*slot + s).clamp(-1.0, 1.0);
        }
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Linear resampling to a new sample rate.
    pub fn resampled(&self, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        if sample_rate == self.sample_rate {
            return self.clone();
        }
        if self.is_empty() {
            return Self::new(sample_rate, self.channels, Vec::new());
        }
        let ch = self.channels as usize;
        let src_frames = self.frames();
        let dst_frames =
            (src_frames as u64 * sample_rate as u64 / self.sample_rate as u64).max(1) as usize;
        let mut samples = Vec::with_capacity(dst_frames * ch);
        for frame in 0..dst_frames {
            let pos = frame as f64 * (src_frames as f64 - 1.0) / (dst_frames as f64 - 1.0).max(1.0);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(src_frames - 1);
            let frac = (pos - lo as f64) as f32;
            for c in 0..ch {
                let a = self.samples[lo * ch + c];
                let b = self.samples[hi * ch + c];
                samples.push(a + (b - a) * frac);
            }
        }
        Self::new(sample_rate, self.channels, samples)
    }

    /// Remixes to a new channel count: downmix averages, upmix duplicates
    /// the first channel.
    pub fn remixed(&self, channels: u16) -> Self {
        let channels = channels.max(1);
        if channels == self.channels {
            return self.clone();
        }
        let src_ch = self.channels as usize;
        let dst_ch = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst_ch);
        for frame in self.samples.chunks_exact(src_ch) {
            if dst_ch == 1 {
                samples.push(frame.iter().sum::<f32>() / src_ch as f32);
            } else if src_ch == 1 {
                samples.extend(std::iter::repeat(frame[0]).take(dst_ch));
            } else {
                for c in 0..dst_ch {
                    samples.push(frame[c.min(src_ch - 1)]);
                }
            }
        }
        Self::new(self.sample_rate, channels, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_clip(frames: usize) -> AudioClip {
        let samples = (0..frames).map(|i| i as f32 / frames as f32).collect();
        AudioClip::new(1000, 1, samples)
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::silent(44100, 2, 1500);
        assert_eq!(clip.duration_ms(), 1500);
        assert_eq!(clip.channels(), 2);
    }

    #[test]
    fn test_partial_frame_dropped() {
        let clip = AudioClip::new(8000, 2, vec![0.1, 0.2, 0.3]);
        assert_eq!(clip.frames(), 1);
    }

    #[test]
    fn test_slice_clamps_end() {
        let clip = ramp_clip(1000); // 1 second at 1 kHz
        let sliced = clip.slice_ms(500, 5000);
        assert_eq!(sliced.frames(), 500);
    }

    #[test]
    fn test_slice_start_past_duration_is_empty() {
        let clip = ramp_clip(1000);
        let sliced = clip.slice_ms(2000, 3000);
        assert!(sliced.is_empty());
    }

    #[test]
    fn test_gain_minus_six_db_halves_amplitude() {
        let clip = AudioClip::new(1000, 1, vec![0.8; 100]);
        let gained = clip.gained_db(-6.0);
        let expected = 0.8 * 10f32.powf(-6.0 / 20.0);
        assert!((gained.samples()[0] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_peak_reaches_headroom_target() {
        let clip = AudioClip::new(1000, 1, vec![0.25, -0.5, 0.1]);
        let normalized = clip.normalized_peak(0.1);
        let target = 10f32.powf(-0.1 / 20.0);
        assert!((normalized.peak() - target).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_silence_is_noop() {
        let clip = AudioClip::silent(1000, 1, 100);
        let normalized = clip.normalized_peak(0.1);
        assert_eq!(normalized.peak(), 0.0);
    }

    #[test]
    fn test_overlay_clipped_to_host_length() {
        let host = AudioClip::silent(1000, 1, 100);
        let long = AudioClip::new(1000, 1, vec![0.5; 500]);
        let mixed = host.overlaid(&long, 50);
        assert_eq!(mixed.frames(), host.frames());
        assert_eq!(mixed.samples()[49], 0.0);
        assert_eq!(mixed.samples()[50], 0.5);
    }

    #[test]
    fn test_resample_changes_frame_count() {
        let clip = AudioClip::silent(1000, 1, 1000);
        let resampled = clip.resampled(2000);
        assert_eq!(resampled.sample_rate(), 2000);
        assert_eq!(resampled.frames(), 2000);
    }

    #[test]
    fn test_remix_stereo_to_mono_averages() {
        let clip = AudioClip::new(1000, 2, vec![0.2, 0.4, -0.2, -0.4]);
        let mono = clip.remixed(1);
        assert_eq!(mono.channels(), 1);
        assert!((mono.samples()[0] - 0.3).abs() < 1e-6);
        assert!((mono.samples()[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_remix_mono_to_stereo_duplicates() {
        let clip = AudioClip::new(1000, 1, vec![0.7, -0.7]);
        let stereo = clip.remixed(2);
        assert_eq!(stereo.samples(), &[0.7, 0.7, -0.7, -0.7]);
    }
}
