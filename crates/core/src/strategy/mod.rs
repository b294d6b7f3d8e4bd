//! Conversion strategy selection.
//!
//! Cross-family document conversions are best effort: an ordered chain of
//! methods is evaluated fresh for every request and advanced on typed
//! failure only. Graceful degradation down to a plain-text recreation
//! preserves user content even when structure cannot be, and presentation
//! targets terminate in an error artifact that cannot fail.

mod selector;

pub use selector::{plan, ConversionMethod, StrategyError, StrategySelector};
