//! This module contains the E8 vector-quantization kernels: block-to-vector
//! reduction, parallel nearest-root assignment, and residual quantization.
//!
//! This coder is intentionally lossy. A block reconstructs to its chosen
//! root plus a quantization-bounded residual, never the exact input bytes;
//! that trade is acceptable for the structured payloads it targets.

use rayon::prelude::*;

use crate::kernels::lattice::{self, Root, LATTICE_DIM, NUM_ROOTS};

/// Bytes per quantization block: 8 consecutive bytes average into each of
/// the 8 vector coordinates.
pub const BLOCK_SIZE: usize = 64;

/// Bytes folded into one vector coordinate.
const BYTES_PER_COORD: usize = BLOCK_SIZE / LATTICE_DIM;

/// Quantized per-block output: chosen root index plus the residual
/// coordinates mapped to u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedBlock {
    pub root_index: u8,
    pub residual: [u16; LATTICE_DIM],
}

/// Reduces a 64-byte block to an 8-dimensional vector: coordinate `d` is the
/// mean of bytes `[8d, 8d+8)` rescaled from `[0, 255]` to `[-1, 1]`.
pub fn block_to_vector(block: &[u8; BLOCK_SIZE]) -> [f32; LATTICE_DIM] {
    let mut vector = [0.0f32; LATTICE_DIM];
    for (d, coord) in vector.iter_mut().enumerate() {
        let sum: u32 = block[d * BYTES_PER_COORD..(d + 1) * BYTES_PER_COORD]
            .iter()
            .map(|&b| b as u32)
            .sum();
        let mean = sum as f32 / BYTES_PER_COORD as f32;
        *coord = mean / 127.5 - 1.0;
    }
    vector
}

/// Index of the root closest to `vector` in squared Euclidean distance.
/// Ties break to the lowest root index (first in generation order).
pub fn nearest_root(vector: &[f32; LATTICE_DIM], roots: &[Root; NUM_ROOTS]) -> u8 {
    let mut best_index = 0usize;
    let mut best_dist = f32::INFINITY;
    for (index, root) in roots.iter().enumerate() {
        let mut dist = 0.0f32;
        for d in 0..LATTICE_DIM {
            let diff = vector[d] - root[d];
            dist += diff * diff;
        }
        if dist < best_dist {
            best_dist = dist;
            best_index = index;
        }
    }
    best_index as u8
}

/// Quantizes a residual coordinate-wise by the affine map
/// `[-1, 1] -> [0, 65535]`, clamped at the boundaries.
pub fn quantize_residual(
    vector: &[f32; LATTICE_DIM],
    root: &Root,
) -> [u16; LATTICE_DIM] {
    let mut quantized = [0u16; LATTICE_DIM];
    for d in 0..LATTICE_DIM {
        let residual = vector[d] - root[d];
        let mapped = (residual + 1.0) * 0.5 * 65535.0;
        quantized[d] = mapped.round().clamp(0.0, 65535.0) as u16;
    }
    quantized
}

/// Inverse of `quantize_residual`, up to quantization error.
pub fn dequantize_residual(quantized: &[u16; LATTICE_DIM]) -> [f32; LATTICE_DIM] {
    let mut residual = [0.0f32; LATTICE_DIM];
    for d in 0..LATTICE_DIM {
        residual[d] = quantized[d] as f32 / 65535.0 * 2.0 - 1.0;
    }
    residual
}

/// Quantizes a whole buffer: zero-pads to a multiple of the block size and
/// maps every block to its nearest root and quantized residual, in parallel.
pub fn quantize_blocks(input: &[u8]) -> Vec<QuantizedBlock> {
    let roots = lattice::roots();
    let full_blocks = input.len() / BLOCK_SIZE;
    let has_tail = input.len() % BLOCK_SIZE != 0;
    let num_blocks = full_blocks + has_tail as usize;

    (0..num_blocks)
        .into_par_iter()
        .map(|block_index| {
            let start = block_index * BLOCK_SIZE;
            let mut block = [0u8; BLOCK_SIZE];
            let end = (start + BLOCK_SIZE).min(input.len());
            block[..end - start].copy_from_slice(&input[start..end]);

            let vector = block_to_vector(&block);
            let root_index = nearest_root(&vector, roots);
            let residual = quantize_residual(&vector, &roots[root_index as usize]);
            QuantizedBlock {
                root_index,
                residual,
            }
        })
        .collect()
}

/// Lossy reconstruction of one block: root plus dequantized residual, each
/// coordinate value replicated across its 8 source bytes.
pub fn reconstruct_block(block: &QuantizedBlock, out: &mut Vec<u8>) {
    let root = &lattice::roots()[block.root_index as usize];
    let residual = dequantize_residual(&block.residual);
    for d in 0..LATTICE_DIM {
        let value = root[d] + residual[d];
        let byte = ((value + 1.0) * 127.5).round().clamp(0.0, 255.0) as u8;
        for _ in 0..BYTES_PER_COORD {
            out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::lattice::NUM_TYPE_A;

    #[test]
    fn test_block_of_ff_maps_to_unit_vector() {
        let block = [0xFFu8; BLOCK_SIZE];
        let vector = block_to_vector(&block);
        for &coord in &vector {
            assert!((coord - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ff_block_quantizes_to_all_plus_type_b_root() {
        // Distance from [1; 8] to the all-plus type-B root is 8 * 0.25 = 2,
        // smaller than any type-A root (>= 6). The winner is the first
        // type-B root in generation order.
        let blocks = quantize_blocks(&[0xFFu8; BLOCK_SIZE]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].root_index as usize, NUM_TYPE_A);

        let again = quantize_blocks(&[0xFFu8; BLOCK_SIZE]);
        assert_eq!(blocks, again);
    }

    #[test]
    fn test_residual_clamps_at_boundaries() {
        // Residuals beyond +/-1 (possible because root coordinates reach
        // +/-1 while the vector spans [-1, 1]) must clamp, not wrap.
        let vector = [1.0f32; LATTICE_DIM];
        let minus_root: Root = [-1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let quantized = quantize_residual(&vector, &minus_root);
        assert_eq!(quantized[0], 65535);
        assert_eq!(quantized[1], 65535);

        let vector = [-1.0f32; LATTICE_DIM];
        let plus_root: Root = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let quantized = quantize_residual(&vector, &plus_root);
        assert_eq!(quantized[0], 0);
        assert_eq!(quantized[1], 0);
    }

    #[test]
    fn test_residual_quantization_roundtrip_error_bound() {
        let vector = [0.3f32, -0.7, 0.0, 1.0, -1.0, 0.11, -0.42, 0.9];
        let root = &lattice::roots()[0];
        let quantized = quantize_residual(&vector, root);
        let residual = dequantize_residual(&quantized);
        for d in 0..LATTICE_DIM {
            let true_residual = (vector[d] - root[d]).clamp(-1.0, 1.0);
            assert!((residual[d] - true_residual).abs() < 1.0 / 32767.0);
        }
    }

    #[test]
    fn test_partial_block_is_zero_padded() {
        // 65 bytes: one full block plus a 1-byte tail padded with zeros.
        let mut input = vec![0x80u8; BLOCK_SIZE];
        input.push(0x80);
        let blocks = quantize_blocks(&input);
        assert_eq!(blocks.len(), 2);

        let mut padded_tail = [0u8; BLOCK_SIZE];
        padded_tail[0] = 0x80;
        let expected = block_to_vector(&padded_tail);
        let root = nearest_root(&expected, lattice::roots());
        assert_eq!(blocks[1].root_index, root);
    }

    #[test]
    fn test_reconstruction_stays_near_input_mean() {
        let input = vec![200u8; BLOCK_SIZE];
        let blocks = quantize_blocks(&input);
        let mut out = Vec::new();
        reconstruct_block(&blocks[0], &mut out);
        assert_eq!(out.len(), BLOCK_SIZE);
        for &byte in &out {
            assert!((byte as i32 - 200).abs() <= 2, "byte {} drifted", byte);
        }
    }

    #[test]
    fn test_empty_input_has_no_blocks() {
        assert!(quantize_blocks(&[]).is_empty());
    }
}
