//! Dense indexing of variable pairs and triples.
//!
//! Pairs `(i, j)` with `i < j` and triples `(i, j, k)` with `i < j < k` are mapped to
//! offsets of flat arrays using the triangular and tetrahedral number formulas. All
//! arithmetic is done in `u64`, which is wide enough for `C(n, 3)` at any variable
//! count this solver can hold in memory.

fn triangle(j: u64) -> u64 {
    if j < 2 {
        0
    } else {
        j * (j - 1) / 2
    }
}

fn tetrahedron(k: u64) -> u64 {
    if k < 3 {
        0
    } else {
        k * (k - 1) * (k - 2) / 6
    }
}

/// Number of pairs `(i, j)` with `i < j < n`.
pub fn pair_count(n: u64) -> u64 {
    triangle(n)
}

/// Number of triples `(i, j, k)` with `i < j < k < n`.
pub fn triple_count(n: u64) -> u64 {
    tetrahedron(n)
}

/// Maps a pair of indices `(i, j)` with `i < j` to a dense array offset.
pub fn pair_index(i: u64, j: u64) -> u64 {
    debug_assert!(i < j);
    triangle(j) + i
}

/// Maps a triple of indices `(i, j, k)` with `i < j < k` to a dense array offset.
pub fn triple_index(i: u64, j: u64, k: u64) -> u64 {
    debug_assert!(i < j && j < k);
    tetrahedron(k) + triangle(j) + i
}

/// Inverse of [`pair_index`].
///
/// The closed-form root is computed in floating point and may be off by one, so it is
/// corrected by a constant number of integer steps.
pub fn pair_from_index(index: u64) -> (u64, u64) {
    let approx = (1.0 + (1.0 + 8.0 * index as f64).sqrt()) / 2.0;
    let mut j = approx as u64;

    while triangle(j) > index {
        j -= 1;
    }
    while triangle(j + 1) <= index {
        j += 1;
    }

    (index - triangle(j), j)
}

/// Inverse of [`triple_index`].
pub fn triple_from_index(index: u64) -> (u64, u64, u64) {
    let approx = (6.0 * index as f64).cbrt();
    let mut k = approx as u64;

    while tetrahedron(k) > index {
        k -= 1;
    }
    while tetrahedron(k + 1) <= index {
        k += 1;
    }

    let (i, j) = pair_from_index(index - tetrahedron(k));
    (i, j, k)
}
