//! Format classification.
//!
//! Maps file extensions to media families, validates requested output
//! formats against the declared supported sets, and exposes a serializable
//! capability report listing what the gateway can produce.

mod types;

pub use types::{
    classify, classify_extension, extension_of, supported_formats, validate_output,
    CapabilityReport, FormatError, MediaFamily, MediaKind,
};
