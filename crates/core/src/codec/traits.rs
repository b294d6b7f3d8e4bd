//! Trait definitions for the codec collaborators.

use async_trait::async_trait;

use super::error::CodecError;
use super::types::AudioClip;

/// Decodes and encodes audio between container bytes and PCM clips.
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Returns the name of this codec implementation.
    fn name(&self) -> &str;

    /// Decodes encoded audio bytes of the declared format into a clip.
    async fn decode(&self, bytes: &[u8], format: &str) -> Result<AudioClip, CodecError>;

    /// Encodes a clip to the target format, with an optional bitrate such
    /// as `"128k"`.
    async fn encode(
        &self,
        clip: &AudioClip,
        format: &str,
        bitrate: Option<&str>,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Synthesizes speech audio from text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns encoded audio bytes for the spoken text.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CodecError>;

    /// Container format of the synthesized bytes (e.g. `"mp3"`).
    fn output_format(&self) -> &str {
        "mp3"
    }
}

/// General-purpose markup converter capable of most document format pairs.
#[async_trait]
pub trait UniversalConverter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts document bytes from one format to another.
    async fn convert(
        &self,
        input: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, CodecError>;
}
