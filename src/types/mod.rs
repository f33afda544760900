//! Shared value types exchanged with the benchmarking harness.
//!
//! `CompressionResult` is the one record every codec driver returns alongside
//! its output bytes; the harness persists these rows to its results store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::CodecError;

/// Identifies one of the three compression algorithms in the suite.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Range (arithmetic) entropy coder.
    Range,
    /// Hash-chain LZ77 with greedy token emission.
    Lz77,
    /// Experimental lossy E8 root-lattice vector quantizer.
    E8Lattice,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Range => "range",
            Algorithm::Lz77 => "lz77",
            Algorithm::E8Lattice => "e8_lattice",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-invocation metrics computed once by a codec driver.
///
/// `ratio` and `throughput_gbps` are zero-guarded: a zero compressed size or
/// a zero elapsed interval yields 0.0 rather than a division error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CompressionResult {
    pub algorithm: Algorithm,
    /// Size of the caller's input in bytes. Never includes codec padding.
    pub original_size: u64,
    pub compressed_size: u64,
    /// Wall-clock time of the compute stages only, in milliseconds.
    pub elapsed_ms: f64,
    pub throughput_gbps: f64,
    pub ratio: f64,
}

impl CompressionResult {
    /// Builds the metrics record from the measured compute interval.
    pub fn measure(
        algorithm: Algorithm,
        original_size: u64,
        compressed_size: u64,
        elapsed: Duration,
    ) -> Self {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let ratio = if compressed_size > 0 {
            original_size as f64 / compressed_size as f64
        } else {
            0.0
        };
        let throughput_gbps = if elapsed_ms > 0.0 {
            (original_size as f64 / 1e9) / (elapsed_ms / 1000.0)
        } else {
            0.0
        };
        Self {
            algorithm,
            original_size,
            compressed_size,
            elapsed_ms,
            throughput_gbps,
            ratio,
        }
    }

    /// Serializes the record as a JSON row for the results store.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_computes_ratio_and_throughput() {
        let result = CompressionResult::measure(
            Algorithm::Range,
            1_000_000,
            250_000,
            Duration::from_millis(10),
        );
        assert!((result.ratio - 4.0).abs() < 1e-9);
        // 1 MB in 10 ms = 0.1 GB/s
        assert!((result.throughput_gbps - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_measure_zero_guards() {
        let result = CompressionResult::measure(Algorithm::Lz77, 0, 0, Duration::ZERO);
        assert_eq!(result.ratio, 0.0);
        assert_eq!(result.throughput_gbps, 0.0);
    }

    #[test]
    fn test_json_row_contains_algorithm_name() {
        let result =
            CompressionResult::measure(Algorithm::E8Lattice, 64, 32, Duration::from_millis(1));
        let row = result.to_json().unwrap();
        assert!(row.contains("\"e8_lattice\""));
        assert!(row.contains("\"original_size\":64"));
    }
}
