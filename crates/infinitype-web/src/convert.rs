#![forbid(unsafe_code)]

//! Conversions between JS numbers and bridge values.

use infinitype_bridge::BridgeError;
use infinitype_bridge::channel::CORPUS_CHANGED_PORT;

/// Convert a JS number carried by `corpusChanged` into a corpus index.
///
/// Rejects non-finite, fractional, and out-of-range values instead of
/// truncating them.
pub fn corpus_index_from_f64(n: f64) -> Result<i64, BridgeError> {
    if !n.is_finite() {
        return Err(BridgeError::port(CORPUS_CHANGED_PORT, "index must be finite"));
    }
    if n.fract() != 0.0 {
        return Err(BridgeError::port(CORPUS_CHANGED_PORT, "index must be an integer"));
    }
    if n < (i64::MIN as f64) || n >= (i64::MAX as f64) {
        return Err(BridgeError::port(CORPUS_CHANGED_PORT, "index out of range"));
    }
    Ok(n as i64)
}

/// Corpus indices cross into JS as numbers; values beyond 2^53 lose
/// precision there, which is the core's concern, not ours.
#[must_use]
pub fn corpus_index_to_f64(index: i64) -> f64 {
    index as f64
}
