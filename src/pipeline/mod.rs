//! Orchestration layer: one driver per codec, sequencing the kernels,
//! owning all per-call scratch, and computing the result metrics.

pub mod driver;
