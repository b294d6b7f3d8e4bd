//! Mock speech synthesizer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::codec::{AudioClip, CodecError, SpeechSynthesizer};

/// Mock implementation of [`SpeechSynthesizer`].
///
/// Returns a WAV rendition of a configurable clip, so a `MockAudioCodec`
/// can decode the result; synthesis can be made to fail.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    clip: Arc<RwLock<AudioClip>>,
    fail: Arc<RwLock<bool>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            clip: Arc::new(RwLock::new(AudioClip::silent(22050, 1, 800))),
            fail: Arc::new(RwLock::new(false)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Sets the clip spoken for every following request.
    pub async fn set_speech(&self, clip: AudioClip) {
        *self.clip.write().await = clip;
    }

    /// Makes every following request fail.
    pub async fn set_failing(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// The texts synthesized so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        self.requests.write().await.push(text.to_string());
        if *self.fail.read().await {
            return Err(CodecError::synthesis_failed("mock synthesizer failure"));
        }
        crate::codec::clip_to_wav(&self.clip.read().await.clone())
    }

    fn output_format(&self) -> &str {
        "wav"
    }
}
