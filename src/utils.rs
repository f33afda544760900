//! This module provides a set of shared, low-level utility functions used
//! throughout the complab core.
//!
//! Its primary responsibilities are:
//! 1.  Safe, validated conversions between raw byte buffers and typed slices
//!     for the wire formats.
//! 2.  Little-endian header field readers with explicit truncation errors, so
//!     decode paths never index out of bounds.

use crate::error::CodecError;

//==================================================================================
// 1. Typed Slice Conversions
//==================================================================================

/// Converts a slice of plain-old-data values into a `Vec<u8>`.
///
/// This performs a memory copy. `bytemuck` respects native endianness; the
/// wire formats assume little-endian, matching every platform the original
/// system targeted.
pub fn typed_slice_to_bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

/// Copies a byte slice into an owned `Vec<T>`.
///
/// Unlike a zero-copy cast this tolerates arbitrary alignment, which decode
/// paths need because typed payloads sit at odd offsets inside a stream.
pub fn bytes_to_typed_vec<T: bytemuck::Pod>(bytes: &[u8]) -> Result<Vec<T>, CodecError> {
    if bytes.len() % std::mem::size_of::<T>() != 0 {
        return Err(CodecError::CorruptStream(format!(
            "payload length {} is not a multiple of element size {}",
            bytes.len(),
            std::mem::size_of::<T>()
        )));
    }
    Ok(bytemuck::pod_collect_to_vec(bytes))
}

//==================================================================================
// 2. Header Field Readers
//==================================================================================

/// Reads a little-endian `u32` at `offset`, or fails with a truncation error.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32, CodecError> {
    let field: [u8; 4] = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| {
            CodecError::CorruptStream(format!("truncated header: cannot read u32 at {}", offset))
        })?
        .try_into()
        .map_err(|_| CodecError::Internal("u32 slice length mismatch".to_string()))?;
    Ok(u32::from_le_bytes(field))
}

/// Reads a little-endian `u64` at `offset`, or fails with a truncation error.
pub fn read_u64_le(bytes: &[u8], offset: usize) -> Result<u64, CodecError> {
    let field: [u8; 8] = bytes
        .get(offset..offset + 8)
        .ok_or_else(|| {
            CodecError::CorruptStream(format!("truncated header: cannot read u64 at {}", offset))
        })?
        .try_into()
        .map_err(|_| CodecError::Internal("u64 slice length mismatch".to_string()))?;
    Ok(u64::from_le_bytes(field))
}
