//! Mock audio codec for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::codec::{AudioClip, AudioCodec, CodecError};

/// A recorded codec call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCodecCall {
    /// `"decode"` or `"encode"`.
    pub operation: &'static str,
    /// Format passed by the caller.
    pub format: String,
    /// Bitrate requested on encode.
    pub bitrate: Option<String>,
}

/// Mock implementation of [`AudioCodec`].
///
/// Decodes everything to a configurable clip and encodes clips as 16-bit
/// WAV so round trips stay meaningful. The next operation can be made to
/// fail with an injected error.
#[derive(Debug, Clone)]
pub struct MockAudioCodec {
    calls: Arc<RwLock<Vec<RecordedCodecCall>>>,
    decode_result: Arc<RwLock<AudioClip>>,
    next_error: Arc<RwLock<Option<CodecError>>>,
}

impl Default for MockAudioCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAudioCodec {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            decode_result: Arc::new(RwLock::new(AudioClip::silent(44100, 2, 3000))),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the clip returned by every following decode.
    pub async fn set_decode_result(&self, clip: AudioClip) {
        *self.decode_result.write().await = clip;
    }

    /// Configures the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CodecError) {
        *self.next_error.write().await = Some(error);
    }

    /// All recorded calls, in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCodecCall> {
        self.calls.read().await.clone()
    }

    async fn take_error(&self) -> Option<CodecError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl AudioCodec for MockAudioCodec {
    fn name(&self) -> &str {
        "mock"
    }

    async fn decode(&self, bytes: &[u8], format: &str) -> Result<AudioClip, CodecError> {
        self.calls.write().await.push(RecordedCodecCall {
            operation: "decode",
            format: format.to_string(),
            bitrate: None,
        });
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        // WAV payloads decode for real so speech watermark tests can feed
        // synthesized clips through.
        if format == "wav" {
            if let Ok(clip) = crate::codec::clip_from_wav(bytes) {
                return Ok(clip);
            }
        }
        Ok(self.decode_result.read().await.clone())
    }

    async fn encode(
        &self,
        clip: &AudioClip,
        format: &str,
        bitrate: Option<&str>,
    ) -> Result<Vec<u8>, CodecError> {
        self.calls.write().await.push(RecordedCodecCall {
            operation: "encode",
            format: format.to_string(),
            bitrate: bitrate.map(String::from),
        });
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        crate::codec::clip_to_wav(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decode_returns_configured_clip() {
        let codec = MockAudioCodec::new();
        codec
            .set_decode_result(AudioClip::silent(8000, 1, 1500))
            .await;
        let clip = codec.decode(b"whatever", "mp3").await.unwrap();
        assert_eq!(clip.duration_ms(), 1500);
    }

    #[tokio::test]
    async fn test_error_injection_consumed_once() {
        let codec = MockAudioCodec::new();
        codec
            .set_next_error(CodecError::decode_failed("boom"))
            .await;
        assert!(codec.decode(b"x", "mp3").await.is_err());
        assert!(codec.decode(b"x", "mp3").await.is_ok());
    }

    #[tokio::test]
    async fn test_encode_round_trips_as_wav() {
        let codec = MockAudioCodec::new();
        let clip = AudioClip::silent(8000, 1, 500);
        let bytes = codec.encode(&clip, "mp3", Some("128k")).await.unwrap();
        let back = codec.decode(&bytes, "wav").await.unwrap();
        assert_eq!(back.duration_ms(), 500);

        let calls = codec.recorded_calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, "encode");
        assert_eq!(calls[0].bitrate.as_deref(), Some("128k"));
    }
}
