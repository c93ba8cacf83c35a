//! Base64 transport encoding for binary data
//!
//! Sealed boxes and keys are raw bytes; APIs that carry them (such as the
//! GitHub secrets API the original workflow targets) expect base64 text.
//! This module uses the standard alphabet with padding. Encoding and
//! decoding are deterministic and exact inverses.

use crate::error::{ErrorCategory, ErrorKind, Result, SealboxError};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Encode bytes as a base64 string (standard alphabet, padded)
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 string back into bytes
///
/// Fails with [`ErrorKind::InvalidEncoding`] on non-alphabet characters or
/// incorrect padding.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD.decode(encoded).map_err(|e| {
        SealboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidEncoding,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
