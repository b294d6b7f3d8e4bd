//! HTTP text-to-speech collaborator.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::config::SpeechConfig;
use super::error::CodecError;
use super::traits::SpeechSynthesizer;

/// Speech synthesizer backed by an HTTP service.
///
/// The text is sent URL-encoded as a query parameter; the response body is
/// expected to be encoded audio.
pub struct HttpSynthesizer {
    config: SpeechConfig,
    client: reqwest::Client,
}

impl HttpSynthesizer {
    /// Creates a synthesizer for the configured endpoint.
    pub fn new(config: SpeechConfig) -> Result<Self, CodecError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CodecError::synthesis_failed(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let url = format!(
            "{}?text={}&lang={}",
            self.config.endpoint,
            urlencoding::encode(text),
            urlencoding::encode(&self.config.language),
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                CodecError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                }
            } else {
                CodecError::synthesis_failed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(CodecError::synthesis_failed(format!(
                "synthesis endpoint returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CodecError::synthesis_failed(e.to_string()))?;
        debug!(chars = text.len(), bytes = bytes.len(), "synthesized speech");
        Ok(bytes.to_vec())
    }
}
