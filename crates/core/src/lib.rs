pub mod batch;
pub mod codec;
pub mod compose;
pub mod config;
pub mod document;
pub mod family;
pub mod pipeline;
pub mod strategy;
pub mod testing;
pub mod transform;
pub mod video;

pub use batch::{build_archive, BatchError, BatchOutcome, BatchProcessor};
pub use codec::{
    AudioClip, AudioCodec, CodecConfig, CodecError, FfmpegAudioCodec, HttpSynthesizer,
    PandocConverter, SpeechConfig, SpeechSynthesizer, UniversalConverter,
};
pub use compose::{ComposeError, MergeEngine, SplitEngine, SplitSpec};
pub use config::{load_config, load_config_from_str, ConfigError, GatewayConfig, WatermarkConfig};
pub use family::{
    classify, supported_formats, validate_output, CapabilityReport, FormatError, MediaFamily,
    MediaKind,
};
pub use pipeline::{
    ConversionError, ConversionRequest, ConversionResult, ExportOptions, MediaItem,
    PipelineError, PipelineExecutor,
};
pub use strategy::{ConversionMethod, StrategyError, StrategySelector};
pub use transform::{
    CropSpec, ResizeSpec, TransformError, TransformSpec, TrimSpec, WatermarkAnchor,
    WatermarkSource, WatermarkSpec,
};
pub use video::{VideoQuality, VideoTranscoder};
