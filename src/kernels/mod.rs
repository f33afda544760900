//! This module is the collection of pure, stateless compression kernels.
//!
//! Every kernel is a plain function over slices and buffers with no device
//! or driver state; the `pipeline` drivers own all sequencing, scratch
//! allocation, and timing around them.

/// Symbol statistics for the range coder.
pub mod histogram;

/// Range (arithmetic) entropy coding.
pub mod range;

/// LZ77 hash-chain match finding.
pub mod match_finder;

/// LZ77 token emission and replay.
pub mod token;

/// E8 root-system generation.
pub mod lattice;

/// E8 vector quantization.
pub mod vq;
