//! Mock collaborators for testing.
//!
//! Deterministic implementations of the codec traits with call recording
//! and error injection, used by unit and integration tests.

mod mock_audio_codec;
mod mock_synthesizer;
mod mock_universal;

pub use mock_audio_codec::MockAudioCodec;
pub use mock_synthesizer::MockSynthesizer;
pub use mock_universal::MockUniversalConverter;
