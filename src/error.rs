//! This module defines the single, unified error type for the entire complab
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    // =========================================================================
    // === Recoverable Caller Errors
    // =========================================================================
    /// The caller-supplied destination buffer cannot hold the compressed
    /// output. Carries the true required size so the caller can retry.
    #[error("destination buffer too small: need {required} bytes, have {available}")]
    DestinationTooSmall { required: usize, available: usize },

    // =========================================================================
    // === Fatal Per-Call Errors
    // =========================================================================
    /// Scratch allocation for a compress/decompress call failed.
    #[error("scratch allocation failed: {0}")]
    Allocation(String),

    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === Kernel Errors
    // =========================================================================
    #[error("Range coding failed: {0}")]
    RangeError(String),

    #[error("Token stream encoding/decoding failed: {0}")]
    TokenError(String),

    #[error("E8 lattice coding failed: {0}")]
    LatticeError(String),

    /// A decode-side stream failed validation (truncated header, impossible
    /// offset, length mismatch, ...).
    #[error("Truncated or corrupt stream: {0}")]
    CorruptStream(String),

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while serializing a
    /// result row for the benchmarking harness.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
