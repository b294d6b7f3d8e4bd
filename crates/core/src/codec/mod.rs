//! External codec collaborators.
//!
//! The conversion core never implements audio codecs, markup conversion or
//! speech synthesis itself; it consumes them through the traits in this
//! module. Concrete implementations shell out to ffmpeg and pandoc or call
//! an HTTP text-to-speech service; deterministic mocks live under
//! `crate::testing`.

mod config;
mod error;
mod ffmpeg;
mod pandoc;
mod process;
mod speech;
mod traits;
mod types;

pub use config::{CodecConfig, SpeechConfig};
pub use error::CodecError;
pub use ffmpeg::FfmpegAudioCodec;
pub(crate) use ffmpeg::{clip_from_wav, clip_to_wav};
pub(crate) use process::{run_tool, stderr_tail};
pub use pandoc::PandocConverter;
pub use speech::HttpSynthesizer;
pub use traits::{AudioCodec, SpeechSynthesizer, UniversalConverter};
pub use types::AudioClip;
