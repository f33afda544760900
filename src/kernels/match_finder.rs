//! This module contains the hash-chain match-finding kernels for the LZ77
//! codec.
//!
//! Index construction is logically sequential (every insertion links the
//! previous chain head), but once the index is built the longest-match
//! lookups are independent per position and run fully in parallel.

use rayon::prelude::*;

/// Sliding-window size in bytes. This is a hard wire-format invariant: the
/// token word stores offsets in 16 bits (see `kernels::token`).
pub const WINDOW_SIZE: usize = 32768;

/// Shortest back-reference worth encoding.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference a single token can describe.
pub const MAX_MATCH: usize = 258;

/// Hash table size for the 3-byte-prefix hash (power of two).
pub const HASH_SIZE: usize = 1 << 15;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Maximum chain links followed per position, capping worst-case cost.
pub const MAX_CHAIN: usize = 64;

/// Sentinel for "no previous occurrence" in the chain index.
const NO_POS: i32 = -1;

/// Fibonacci-multiplicative hash of a 3-byte prefix into the chain table.
#[inline]
fn hash3(bytes: &[u8]) -> usize {
    let prefix =
        (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32;
    (prefix.wrapping_mul(2654435761) >> 17) as usize & HASH_MASK
}

/// The best prior match found for one input position.
///
/// A `length` below `MIN_MATCH` means no qualifying match exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchRecord {
    /// Distance back to the match start; 1 <= offset <= WINDOW_SIZE when set.
    pub offset: u16,
    pub length: u16,
}

impl MatchRecord {
    pub const NONE: MatchRecord = MatchRecord { offset: 0, length: 0 };

    #[inline]
    pub fn is_match(&self) -> bool {
        self.length as usize >= MIN_MATCH
    }
}

/// Hash-chain position index over a byte buffer.
///
/// `prev[p]` links position `p` to the previous position sharing its 3-byte
/// prefix hash. Following back-links always yields strictly decreasing
/// positions ending at the sentinel. The per-hash head table is only needed
/// while inserting; lookups start from a position's own back-link.
pub struct ChainIndex {
    prev: Vec<i32>,
}

/// Builds the chain index with one sequential insertion pass: each position
/// becomes the new head of its hash's chain, linking the previous head.
pub fn build_chain_index(input: &[u8]) -> ChainIndex {
    let mut head = vec![NO_POS; HASH_SIZE];
    let mut prev = vec![NO_POS; input.len()];

    if input.len() >= MIN_MATCH {
        for pos in 0..=input.len() - MIN_MATCH {
            let h = hash3(&input[pos..]);
            prev[pos] = head[h];
            head[h] = pos as i32;
        }
    }
    ChainIndex { prev }
}

/// Finds the best prior match for every position, in parallel.
pub fn find_matches(input: &[u8], index: &ChainIndex) -> Vec<MatchRecord> {
    (0..input.len())
        .into_par_iter()
        .map(|pos| best_match_at(input, index, pos))
        .collect()
}

/// Walks one position's hash chain (bounded to `MAX_CHAIN` hops) and keeps
/// the longest in-window match. Ties keep the first candidate found, which
/// is the nearest, most recent occurrence.
fn best_match_at(input: &[u8], index: &ChainIndex, pos: usize) -> MatchRecord {
    let remaining = input.len() - pos;
    if remaining < MIN_MATCH {
        return MatchRecord::NONE;
    }

    let max_len = remaining.min(MAX_MATCH);
    let window_start = pos.saturating_sub(WINDOW_SIZE);
    let mut best = MatchRecord::NONE;

    // `pos` sits in its own chain, so its back-link is the most recent
    // strictly-earlier occurrence of the same 3-byte hash.
    let mut candidate = index.prev[pos];
    let mut hops = 0;
    while candidate != NO_POS && hops < MAX_CHAIN {
        let cand = candidate as usize;
        if cand < window_start {
            break;
        }

        let len = common_prefix_len(input, cand, pos, max_len);
        if len >= MIN_MATCH && len > best.length as usize {
            best = MatchRecord {
                offset: (pos - cand) as u16,
                length: len as u16,
            };
            if len == max_len {
                break;
            }
        }

        candidate = index.prev[cand];
        hops += 1;
    }
    best
}

/// Length of the common run between `input[a..]` and `input[b..]`, capped.
#[inline]
fn common_prefix_len(input: &[u8], a: usize, b: usize, cap: usize) -> usize {
    let mut len = 0;
    while len < cap && input[a + len] == input[b + len] {
        len += 1;
    }
    len
}
