//! This module contains the LZ77 token-stream kernels: the greedy token
//! emitter and its validating decoder.
//!
//! Each token is one fixed-width little-endian u32 word:
//!
//! ```text
//! bit 31      : 1 = match token, 0 = literal
//! bits 30..16 : match length - 3
//! bits 15..0  : match offset (1..=32768)
//! ```
//!
//! A literal token carries the byte value in its low 8 bits. The greedy scan
//! is a single-worker sequential pass: every emission decision depends on the
//! cursor position the previous token produced.

use crate::error::CodecError;
use crate::kernels::match_finder::{MatchRecord, MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

/// High bit distinguishing match tokens from literals.
const MATCH_FLAG: u32 = 1 << 31;
const LENGTH_SHIFT: u32 = 16;
const OFFSET_MASK: u32 = 0xFFFF;
const LENGTH_MASK: u32 = 0x7FFF;

// The 15-bit length field must hold MAX_MATCH - MIN_MATCH, and the 16-bit
// offset field caps the window. Widening either is a wire-format break.
const _: () = assert!(MAX_MATCH - MIN_MATCH <= LENGTH_MASK as usize);
const _: () = assert!(WINDOW_SIZE <= OFFSET_MASK as usize + 1);

#[inline]
fn pack_match(length: usize, offset: usize) -> u32 {
    MATCH_FLAG | (((length - MIN_MATCH) as u32) << LENGTH_SHIFT) | offset as u32
}

#[inline]
fn pack_literal(byte: u8) -> u32 {
    byte as u32
}

/// Greedy single-pass token emission over the per-position match records.
///
/// A chosen match advances the cursor by its whole length, so matches never
/// overlap in the token stream; positions without a qualifying match emit
/// literals. There is no lazy matching.
pub fn emit_tokens(input: &[u8], matches: &[MatchRecord]) -> Vec<u32> {
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut pos = 0;
    while pos < input.len() {
        let m = matches[pos];
        if m.is_match() {
            tokens.push(pack_match(m.length as usize, m.offset as usize));
            pos += m.length as usize;
        } else {
            tokens.push(pack_literal(input[pos]));
            pos += 1;
        }
    }
    tokens
}

/// Replays a token stream back into the original bytes.
///
/// Copies run byte by byte so an overlapping match (`offset < length`, down
/// to offset 1) repeats the window content exactly as the encoder saw it.
pub fn decode_tokens(tokens: &[u32], original_len: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(original_len);
    for &token in tokens {
        if token & MATCH_FLAG != 0 {
            let length = ((token >> LENGTH_SHIFT) & LENGTH_MASK) as usize + MIN_MATCH;
            let offset = (token & OFFSET_MASK) as usize;
            if offset == 0 || offset > out.len() {
                return Err(CodecError::TokenError(format!(
                    "match offset {} reaches before the decoded window at {}",
                    offset,
                    out.len()
                )));
            }
            for _ in 0..length {
                out.push(out[out.len() - offset]);
            }
        } else {
            if token > u8::MAX as u32 {
                return Err(CodecError::TokenError(format!(
                    "literal token 0x{:08X} has bits above the byte value",
                    token
                )));
            }
            out.push(token as u8);
        }
        if out.len() > original_len {
            return Err(CodecError::TokenError(format!(
                "token stream decodes past the original length {}",
                original_len
            )));
        }
    }
    if out.len() != original_len {
        return Err(CodecError::TokenError(format!(
            "token stream decoded {} bytes, expected {}",
            out.len(),
            original_len
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::match_finder::{build_chain_index, find_matches};

    fn roundtrip(input: &[u8]) -> (Vec<u32>, Vec<u8>) {
        let index = build_chain_index(input);
        let matches = find_matches(input, &index);
        let tokens = emit_tokens(input, &matches);
        let decoded = decode_tokens(&tokens, input.len()).unwrap();
        (tokens, decoded)
    }

    #[test]
    fn test_roundtrip_literals_only() {
        let input = b"ab";
        let (tokens, decoded) = roundtrip(input);
        assert_eq!(tokens.len(), 2);
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_roundtrip_empty() {
        let (tokens, decoded) = roundtrip(&[]);
        assert!(tokens.is_empty());
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_roundtrip_repeated_pattern_compresses() {
        let input: Vec<u8> = b"ABCD".repeat(1000);
        let (tokens, decoded) = roundtrip(&input);
        assert_eq!(decoded, input);
        // 4 literals plus a handful of long match tokens.
        assert!(tokens.len() * 4 < input.len() / 4);
    }

    #[test]
    fn test_roundtrip_overlapping_offset_one() {
        let mut input = vec![b'x'];
        input.extend(std::iter::repeat(b'x').take(500));
        input.extend_from_slice(b"tail");
        let (_, decoded) = roundtrip(&input);
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_roundtrip_abutting_matches() {
        // Two different repeated phrases force back-to-back match tokens.
        let mut input = Vec::new();
        for _ in 0..8 {
            input.extend_from_slice(b"first phrase ");
            input.extend_from_slice(b"second phrase ");
        }
        let (_, decoded) = roundtrip(&input);
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_roundtrip_mixed_binary() {
        let input: Vec<u8> = (0..10_000usize)
            .map(|i| ((i * i) % 253) as u8)
            .collect();
        let (_, decoded) = roundtrip(&input);
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_decode_rejects_offset_before_window() {
        let tokens = vec![pack_literal(b'a'), pack_match(3, 5)];
        let result = decode_tokens(&tokens, 4);
        assert!(matches!(result, Err(CodecError::TokenError(_))));
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let tokens = vec![pack_literal(b'a')];
        let result = decode_tokens(&tokens, 2);
        assert!(matches!(result, Err(CodecError::TokenError(_))));
    }

    #[test]
    fn test_decode_rejects_overlong_stream() {
        let tokens = vec![pack_literal(b'a'), pack_literal(b'b')];
        let result = decode_tokens(&tokens, 1);
        assert!(matches!(result, Err(CodecError::TokenError(_))));
    }
}
