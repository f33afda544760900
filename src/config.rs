//! The single source of truth for complab runtime configuration.
//!
//! `CodecConfig` is created once at the application boundary (the
//! benchmarking harness) and passed to the per-codec drivers. Only execution
//! knobs live here; the on-wire format parameters (LZ77 window and match
//! bounds, hash-table size, E8 block size) are format invariants and stay as
//! compile-time constants inside their kernels.

use serde::{Deserialize, Serialize};

/// Runtime configuration shared by all three codec drivers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Number of worker threads for the data-parallel stages.
    /// 0 = auto (use all available cores), 1 = single-threaded.
    #[serde(default)]
    pub threads: usize,

    /// Range-coder chunk size in bytes. Each chunk is encoded independently
    /// with its own coder state, so this is the unit of parallelism. The
    /// value is recorded in the stream header and may vary between calls.
    #[serde(default = "default_range_chunk_size")]
    pub range_chunk_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            range_chunk_size: default_range_chunk_size(),
        }
    }
}

/// Helper for `serde` to default the range-coder chunk size.
fn default_range_chunk_size() -> usize {
    4096
}
