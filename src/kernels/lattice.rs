//! This module generates the 240-vector root system of the E8 lattice used
//! as the vector-quantization codebook.
//!
//! The root set is fixed for the process lifetime: it is generated lazily on
//! first use behind a one-time gate and read-only afterwards, so the parallel
//! quantization workers share it without locking.
//!
//! Generation order is part of the codec contract (root indices are stored
//! on the wire): 112 type-A roots first, then 128 type-B roots, each family
//! in a fixed deterministic order.

use std::sync::OnceLock;

/// Dimensionality of the lattice.
pub const LATTICE_DIM: usize = 8;

/// Total number of E8 roots.
pub const NUM_ROOTS: usize = 240;

/// Type-A roots: two non-zero entries of +/-1 among eight positions.
pub const NUM_TYPE_A: usize = 112;

/// Type-B roots: all coordinates +/-1/2 with an even number of minus signs.
pub const NUM_TYPE_B: usize = 128;

/// One lattice root.
pub type Root = [f32; LATTICE_DIM];

static ROOTS: OnceLock<[Root; NUM_ROOTS]> = OnceLock::new();

/// Returns the process-wide root table, generating it on first use.
pub fn roots() -> &'static [Root; NUM_ROOTS] {
    ROOTS.get_or_init(generate_roots)
}

/// Deterministic construction of the 240 roots.
///
/// Type A iterates index pairs `i < j` with sign order (+,+), (+,-), (-,+),
/// (-,-); type B iterates sign bitmasks ascending, keeping masks with an
/// even popcount (bit set = negative coordinate).
fn generate_roots() -> [Root; NUM_ROOTS] {
    let mut table = [[0.0f32; LATTICE_DIM]; NUM_ROOTS];
    let mut next = 0;

    for i in 0..LATTICE_DIM {
        for j in i + 1..LATTICE_DIM {
            for &sign_i in &[1.0f32, -1.0] {
                for &sign_j in &[1.0f32, -1.0] {
                    table[next][i] = sign_i;
                    table[next][j] = sign_j;
                    next += 1;
                }
            }
        }
    }
    debug_assert_eq!(next, NUM_TYPE_A);

    for mask in 0u32..(1 << LATTICE_DIM) {
        if mask.count_ones() % 2 != 0 {
            continue;
        }
        for d in 0..LATTICE_DIM {
            table[next][d] = if mask & (1 << d) != 0 { -0.5 } else { 0.5 };
        }
        next += 1;
    }
    debug_assert_eq!(next, NUM_ROOTS);

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_counts() {
        let table = generate_roots();

        let type_a = table[..NUM_TYPE_A]
            .iter()
            .filter(|root| root.iter().all(|&c| c == 0.0 || c.abs() == 1.0))
            .count();
        assert_eq!(type_a, NUM_TYPE_A);

        let type_b = table[NUM_TYPE_A..]
            .iter()
            .filter(|root| root.iter().all(|&c| c.abs() == 0.5))
            .count();
        assert_eq!(type_b, NUM_TYPE_B);
    }

    #[test]
    fn test_all_roots_have_squared_norm_two() {
        for root in roots().iter() {
            let norm_sq: f32 = root.iter().map(|&c| c * c).sum();
            assert!((norm_sq - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_type_b_minus_sign_parity() {
        for root in roots()[NUM_TYPE_A..].iter() {
            let minus_count = root.iter().filter(|&&c| c < 0.0).count();
            assert_eq!(minus_count % 2, 0);
        }
    }

    #[test]
    fn test_roots_are_distinct() {
        let table = roots();
        for a in 0..NUM_ROOTS {
            for b in a + 1..NUM_ROOTS {
                assert_ne!(table[a], table[b], "roots {} and {} collide", a, b);
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        // Bit-for-bit identical on repeated runs.
        let first = generate_roots();
        let second = generate_roots();
        for (a, b) in first.iter().zip(second.iter()) {
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_first_type_b_root_is_all_plus() {
        // Mask 0 comes first: every coordinate +1/2.
        let root = roots()[NUM_TYPE_A];
        assert!(root.iter().all(|&c| c == 0.5));
    }
}
