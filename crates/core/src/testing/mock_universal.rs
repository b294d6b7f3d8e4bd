//! Mock universal converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::codec::{CodecError, UniversalConverter};

/// A recorded conversion request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    pub input_format: String,
    pub output_format: String,
}

/// Mock implementation of [`UniversalConverter`].
///
/// By default succeeds, returning the input prefixed with a conversion
/// marker; can be switched to fail every call to drive fallback chains.
#[derive(Debug, Clone)]
pub struct MockUniversalConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    always_fail: Arc<RwLock<bool>>,
}

impl Default for MockUniversalConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUniversalConverter {
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            always_fail: Arc::new(RwLock::new(false)),
        }
    }

    /// A converter that fails every call.
    pub fn failing() -> Self {
        let converter = Self::new();
        if let Ok(mut flag) = converter.always_fail.try_write() {
            *flag = true;
        }
        converter
    }

    /// Makes every following call fail.
    pub async fn set_always_fail(&self, fail: bool) {
        *self.always_fail.write().await = fail;
    }

    /// All recorded conversions, in order.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }
}

#[async_trait]
impl UniversalConverter for MockUniversalConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        input: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, CodecError> {
        self.conversions.write().await.push(RecordedConversion {
            input_format: input_format.to_string(),
            output_format: output_format.to_string(),
        });
        if *self.always_fail.read().await {
            return Err(CodecError::convert_failed(
                format!("mock cannot convert {input_format} to {output_format}"),
                None,
            ));
        }
        let mut output = format!("[{input_format}->{output_format}]\n").into_bytes();
        output.extend_from_slice(input);
        Ok(output)
    }
}
