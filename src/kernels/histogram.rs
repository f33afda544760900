//! This module contains the kernels that build the symbol statistics for the
//! range coder: a parallel byte-frequency histogram and its exclusive-prefix
//! cumulative distribution table.
//!
//! The histogram is an exact count. Workers accumulate private 256-entry
//! tables over disjoint slices of the input and the tables are merged
//! associatively, so the final counts equal a sequential count for every
//! symbol regardless of merge order.

use rayon::prelude::*;

/// Number of distinct byte symbols.
pub const NUM_SYMBOLS: usize = 256;

/// Input bytes handled by one histogram worker before merging.
const HISTOGRAM_GRAIN: usize = 64 * 1024;

/// Counts per-symbol frequencies over the whole buffer.
pub fn count_frequencies(input: &[u8]) -> [u32; NUM_SYMBOLS] {
    input
        .par_chunks(HISTOGRAM_GRAIN)
        .map(|chunk| {
            let mut local = [0u32; NUM_SYMBOLS];
            for &byte in chunk {
                local[byte as usize] += 1;
            }
            local
        })
        .reduce(
            || [0u32; NUM_SYMBOLS],
            |mut acc, local| {
                for (a, l) in acc.iter_mut().zip(local.iter()) {
                    *a += l;
                }
                acc
            },
        )
}

/// Builds the cumulative distribution table via an exclusive prefix sum.
///
/// Invariants: `cdf[0] == 0`, `cdf[NUM_SYMBOLS] == sum(freq)`, and the table
/// is monotonically non-decreasing. The 256-entry scan is not worth
/// parallelizing; a sequential pass is deterministic by construction.
pub fn build_cdf(freq: &[u32; NUM_SYMBOLS]) -> [u32; NUM_SYMBOLS + 1] {
    let mut cdf = [0u32; NUM_SYMBOLS + 1];
    let mut running = 0u32;
    for (symbol, &count) in freq.iter().enumerate() {
        cdf[symbol] = running;
        running += count;
    }
    cdf[NUM_SYMBOLS] = running;
    cdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_count_matches_sequential() {
        // Large enough to span several histogram grains.
        let input: Vec<u8> = (0..200_000usize).map(|i| (i * 31 % 251) as u8).collect();

        let mut expected = [0u32; NUM_SYMBOLS];
        for &byte in &input {
            expected[byte as usize] += 1;
        }

        assert_eq!(count_frequencies(&input), expected);
    }

    #[test]
    fn test_count_empty_input() {
        assert_eq!(count_frequencies(&[]), [0u32; NUM_SYMBOLS]);
    }

    #[test]
    fn test_all_zero_bytes_scenario() {
        let input = vec![0u8; 4096];
        let freq = count_frequencies(&input);
        assert_eq!(freq[0], 4096);
        assert!(freq[1..].iter().all(|&c| c == 0));

        let cdf = build_cdf(&freq);
        assert_eq!(cdf[0], 0);
        for symbol in 1..=NUM_SYMBOLS {
            assert_eq!(cdf[symbol], 4096);
        }
    }

    #[test]
    fn test_cdf_invariants() {
        let input = b"the quick brown fox jumps over the lazy dog";
        let freq = count_frequencies(input);
        let cdf = build_cdf(&freq);

        assert_eq!(cdf[0], 0);
        assert_eq!(cdf[NUM_SYMBOLS] as usize, input.len());
        for symbol in 0..NUM_SYMBOLS {
            assert!(cdf[symbol] <= cdf[symbol + 1]);
            assert_eq!(cdf[symbol + 1] - cdf[symbol], freq[symbol]);
        }
    }
}
