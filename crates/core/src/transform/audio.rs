//! Audio transform primitives.
//!
//! The mandatory application order is trim → normalize → watermark.
//! The speech watermark runs a sub-pipeline against the text-to-speech and
//! audio codec collaborators; any failure inside it degrades to the
//! unmodified audio instead of aborting the conversion.

use tracing::warn;

use crate::codec::{AudioClip, AudioCodec, SpeechSynthesizer};

use super::types::{TransformSpec, WatermarkSource};

/// Peak-normalization headroom in dB.
const NORMALIZE_HEADROOM_DB: f32 = 0.1;

/// Minimum gap between watermark repetitions.
const MIN_REPEAT_INTERVAL_MS: u64 = 30_000;

/// Applies the requested audio transforms in the mandatory order and
/// returns the transformed clip together with the applied-feature labels.
pub async fn apply_audio_transforms(
    clip: AudioClip,
    spec: &TransformSpec,
    synthesizer: &dyn SpeechSynthesizer,
    codec: &dyn AudioCodec,
    volume_reduction_db: f32,
) -> (AudioClip, Vec<String>) {
    let mut clip = clip;
    let mut applied = Vec::new();

    if let Some(ref trim) = spec.trim {
        let start_ms = (trim.start_secs.unwrap_or(0.0) * 1000.0) as u64;
        let end_ms = trim
            .end_secs
            .map(|secs| (secs * 1000.0) as u64)
            .unwrap_or_else(|| clip.duration_ms());
        clip = clip.slice_ms(start_ms, end_ms);
        applied.push("trimming".to_string());
    }

    if spec.normalize {
        clip = clip.normalized_peak(NORMALIZE_HEADROOM_DB);
        applied.push("normalization".to_string());
    }

    if let Some(ref watermark) = spec.watermark {
        match &watermark.source {
            WatermarkSource::Text(text) => {
                clip = speech_watermark(&clip, text, synthesizer, codec, volume_reduction_db).await;
                applied.push("watermarking".to_string());
            }
            WatermarkSource::Logo(_) => {
                warn!("logo watermarks do not apply to audio, skipping");
            }
        }
    }

    (clip, applied)
}

/// Overlays synthesized speech onto the host clip.
///
/// The speech is attenuated, matched to the host's sample rate and channel
/// count, and repeated at intervals of `max(30 s, 2× speech length)` across
/// the host duration. Speech longer than the host is truncated and overlaid
/// once. Every failure path returns the host unchanged.
pub async fn speech_watermark(
    host: &AudioClip,
    text: &str,
    synthesizer: &dyn SpeechSynthesizer,
    codec: &dyn AudioCodec,
    volume_reduction_db: f32,
) -> AudioClip {
    if host.is_empty() || text.is_empty() {
        return host.clone();
    }

    let encoded = match synthesizer.synthesize(text).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "speech synthesis failed, keeping audio unmodified");
            return host.clone();
        }
    };

    let speech = match codec.decode(&encoded, synthesizer.output_format()).await {
        Ok(clip) => clip,
        Err(e) => {
            warn!(error = %e, "speech decode failed, keeping audio unmodified");
            return host.clone();
        }
    };
    if speech.is_empty() {
        return host.clone();
    }

    let speech = speech
        .resampled(host.sample_rate())
        .remixed(host.channels())
        .gained_db(volume_reduction_db);

    let host_ms = host.duration_ms();
    let speech_ms = speech.duration_ms();

    if speech_ms >= host_ms {
        let truncated = speech.slice_ms(0, host_ms);
        return host.overlaid(&truncated, 0);
    }

    let interval_ms = MIN_REPEAT_INTERVAL_MS.max(speech_ms * 2);
    let mut mixed = host.clone();
    let mut start_ms = 0;
    while start_ms < host_ms {
        mixed = mixed.overlaid(&speech, start_ms);
        start_ms += interval_ms;
    }
    mixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::transform::types::TrimSpec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WavSynthesizer {
        clip: AudioClip,
        fail: bool,
        calls: AtomicUsize,
    }

    impl WavSynthesizer {
        fn speaking(clip: AudioClip) -> Self {
            Self {
                clip,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                clip: AudioClip::silent(1000, 1, 10),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for WavSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, CodecError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CodecError::synthesis_failed("endpoint unavailable"));
            }
            crate::codec::clip_to_wav(&self.clip)
        }

        fn output_format(&self) -> &str {
            "wav"
        }
    }

    struct WavCodec;

    #[async_trait]
    impl AudioCodec for WavCodec {
        fn name(&self) -> &str {
            "wav-test"
        }

        async fn decode(&self, bytes: &[u8], _format: &str) -> Result<AudioClip, CodecError> {
            crate::codec::clip_from_wav(bytes)
        }

        async fn encode(
            &self,
            clip: &AudioClip,
            _format: &str,
            _bitrate: Option<&str>,
        ) -> Result<Vec<u8>, CodecError> {
            crate::codec::clip_to_wav(clip)
        }
    }

    fn host_clip(duration_ms: u64) -> AudioClip {
        AudioClip::new(
            1000,
            1,
            (0..duration_ms).map(|i| (i % 7) as f32 / 100.0).collect(),
        )
    }

    #[tokio::test]
    async fn test_trim_start_past_duration_yields_empty() {
        let spec = TransformSpec {
            trim: Some(TrimSpec {
                start_secs: Some(10.0),
                end_secs: None,
            }),
            ..Default::default()
        };
        let (clip, applied) = apply_audio_transforms(
            host_clip(1000),
            &spec,
            &WavSynthesizer::failing(),
            &WavCodec,
            -6.0,
        )
        .await;
        assert!(clip.is_empty());
        assert_eq!(applied, vec!["trimming"]);
    }

    #[tokio::test]
    async fn test_trim_end_clamped_to_duration() {
        let spec = TransformSpec {
            trim: Some(TrimSpec {
                start_secs: Some(0.2),
                end_secs: Some(99.0),
            }),
            ..Default::default()
        };
        let (clip, _) = apply_audio_transforms(
            host_clip(1000),
            &spec,
            &WavSynthesizer::failing(),
            &WavCodec,
            -6.0,
        )
        .await;
        assert_eq!(clip.duration_ms(), 800);
    }

    #[tokio::test]
    async fn test_normalize_label() {
        let spec = TransformSpec {
            normalize: true,
            ..Default::default()
        };
        let (clip, applied) = apply_audio_transforms(
            host_clip(500),
            &spec,
            &WavSynthesizer::failing(),
            &WavCodec,
            -6.0,
        )
        .await;
        assert_eq!(applied, vec!["normalization"]);
        let target = 10f32.powf(-0.1 / 20.0);
        assert!((clip.peak() - target).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_watermark_failure_degrades_to_original() {
        let host = host_clip(2000);
        let synth = WavSynthesizer::failing();
        let marked = speech_watermark(&host, "brand", &synth, &WavCodec, -6.0).await;
        assert_eq!(marked, host);
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_watermark_longer_than_host_truncates() {
        let host = host_clip(500);
        let speech = AudioClip::new(1000, 1, vec![0.4; 2000]); // 2 s
        let synth = WavSynthesizer::speaking(speech);
        let marked = speech_watermark(&host, "brand", &synth, &WavCodec, -6.0).await;
        assert_eq!(marked.duration_ms(), host.duration_ms());
        assert_ne!(marked, host);
    }

    #[tokio::test]
    async fn test_watermark_repeats_at_interval() {
        // 1 s of speech against a 65 s host: repetitions at 0 s, 30 s, 60 s.
        let host = AudioClip::silent(100, 1, 65_000);
        let speech = AudioClip::new(100, 1, vec![0.5; 100]);
        let synth = WavSynthesizer::speaking(speech);
        let marked = speech_watermark(&host, "brand", &synth, &WavCodec, 0.0).await;

        let samples = marked.samples();
        let at = |ms: u64| samples[(ms / 10) as usize];
        assert!(at(100).abs() > 0.1);
        assert!(at(30_100).abs() > 0.1);
        assert!(at(60_100).abs() > 0.1);
        // Quiet between repetitions.
        assert_eq!(at(15_000), 0.0);
        assert_eq!(at(45_000), 0.0);
    }

    #[tokio::test]
    async fn test_watermark_attenuation_applied() {
        let host = AudioClip::silent(1000, 1, 1000);
        let speech = AudioClip::new(1000, 1, vec![0.8; 500]);
        let synth = WavSynthesizer::speaking(speech);
        let marked = speech_watermark(&host, "brand", &synth, &WavCodec, -6.0).await;
        let expected = 0.8 * 10f32.powf(-6.0 / 20.0);
        assert!((marked.peak() - expected).abs() < 1e-2);
    }
}
