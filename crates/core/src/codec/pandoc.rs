//! Pandoc-backed universal document converter.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::config::CodecConfig;
use super::error::CodecError;
use super::process::{run_tool, stderr_tail};
use super::traits::UniversalConverter;

/// Pandoc subprocess implementation of [`UniversalConverter`].
///
/// Input and output formats are communicated through file extensions, which
/// pandoc uses to pick its readers and writers. Pairs pandoc cannot handle
/// fail with a typed error, which advances the caller's fallback chain.
pub struct PandocConverter {
    config: CodecConfig,
}

impl PandocConverter {
    /// Creates a new converter with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CodecConfig::default())
    }
}

#[async_trait]
impl UniversalConverter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    async fn convert(
        &self,
        input: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, CodecError> {
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;

        let input_file = tempfile::Builder::new()
            .prefix("doc-in-")
            .suffix(&format!(".{}", sanitize(input_format)))
            .tempfile_in(&self.config.temp_dir)?;
        std::fs::write(input_file.path(), input)?;

        let output_path = self
            .config
            .temp_dir
            .join(format!("doc-out-{}.{}", Uuid::new_v4(), sanitize(output_format)));

        let args = vec![
            input_file.path().to_string_lossy().to_string(),
            "--standalone".to_string(),
            "--wrap=none".to_string(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
        ];

        let output = run_tool(&self.config.pandoc_path, &args, self.config.timeout_secs).await?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(CodecError::convert_failed(
                format!("pandoc could not convert {input_format} to {output_format}"),
                stderr_tail(&output),
            ));
        }

        let bytes = tokio::fs::read(&output_path).await?;
        let _ = tokio::fs::remove_file(&output_path).await;
        debug!(input_format, output_format, bytes = bytes.len(), "pandoc conversion done");
        Ok(bytes)
    }
}

fn sanitize(format: &str) -> String {
    format
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
