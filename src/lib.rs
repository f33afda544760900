//! This file is the root of the `complab` Rust crate.
//!
//! The crate is the compute core of the compression-lab benchmark suite:
//! three parallel block compressors (a range coder, a hash-chain LZ77, and
//! an experimental E8 lattice vector quantizer) behind one driver API. The
//! benchmarking harness is an external caller; its whole contract with this
//! crate is the `(output bytes, CompressionResult)` return shape.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod config;
pub mod kernels;
pub mod pipeline;
pub mod types;

mod error;
mod utils;

pub use config::CodecConfig;
pub use error::CodecError;
pub use pipeline::driver::{E8Codec, Lz77Codec, RangeCodec};
pub use types::{Algorithm, CompressionResult};

//==================================================================================
// 2. Stateless Convenience API
//==================================================================================

/// Compresses a buffer with the named algorithm under the default
/// configuration. This is the one-call entry point for the harness.
pub fn compress(
    algorithm: Algorithm,
    input: &[u8],
) -> Result<(Vec<u8>, CompressionResult), CodecError> {
    match algorithm {
        Algorithm::Range => RangeCodec::new().compress(input),
        Algorithm::Lz77 => Lz77Codec::new().compress(input),
        Algorithm::E8Lattice => E8Codec::new().compress(input),
    }
}

/// Decompresses a stream produced by [`compress`].
///
/// Range and LZ77 streams decode losslessly; an E8 stream reconstructs the
/// quantized approximation the lossy coder committed to.
pub fn decompress(algorithm: Algorithm, stream: &[u8]) -> Result<Vec<u8>, CodecError> {
    match algorithm {
        Algorithm::Range => RangeCodec::new().decompress(stream),
        Algorithm::Lz77 => Lz77Codec::new().decompress(stream),
        Algorithm::E8Lattice => E8Codec::new().decompress(stream),
    }
}
