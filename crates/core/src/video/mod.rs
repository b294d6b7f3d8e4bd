//! Filter-graph based video processing.
//!
//! Video is never decoded in memory: requests are staged to temp files and
//! executed as a single ffmpeg filter graph (scale, drawtext watermark,
//! trim) plus codec/bitrate selection.

mod transcoder;
mod types;

pub use transcoder::VideoTranscoder;
pub use types::{video_codec_for, VideoQuality};
