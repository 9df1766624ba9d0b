//! Canonical triangle ordering, vertex relabeling and the index delta predictor.
//!
//! Both compressed methods renumber the mesh before prediction: each triangle is rotated so its
//! smallest vertex index comes first (a cyclic rotation, so winding survives), triangles are
//! sorted by their index triple, and vertices are relabeled in the order the sorted index stream
//! first references them. The result is a nearly monotone index stream whose deltas are small,
//! and vertex data whose neighbours in memory are neighbours in the mesh.
//!
//! Relabeling changes the indices the sort ordered on, so a single pass is not a fixed point.
//! [`canonicalize`] therefore repeats the pass until the ordering stabilizes, which makes it
//! idempotent: feeding its output back in reproduces it exactly.

use crate::error::{Error, Result};

/// Ordering passes converge after a handful of rounds; the cap only guards degenerate cycles.
const MAX_PASSES: usize = 32;

const UNSET: u32 = u32::MAX;

/// Rotates a triangle so its smallest index comes first, preserving winding.
#[inline]
pub(crate) fn rotate_min_first(triangle: &mut [u32; 3]) {
    if triangle[1] < triangle[0] && triangle[1] <= triangle[2] {
        triangle.rotate_left(1);
    } else if triangle[2] < triangle[0] && triangle[2] < triangle[1] {
        triangle.rotate_left(2);
    }
}

/// Assigns new vertex labels in the order the triangle stream first references them.
///
/// Vertices no triangle references keep their relative order after all referenced ones, so
/// nothing is dropped. Returns the old-to-new permutation.
pub(crate) fn first_use_relabel(triangles: &[[u32; 3]], vertex_count: usize) -> Vec<u32> {
    let mut remap = vec![UNSET; vertex_count];
    let mut next = 0u32;
    for triangle in triangles {
        for &vertex in triangle {
            if remap[vertex as usize] == UNSET {
                remap[vertex as usize] = next;
                next += 1;
            }
        }
    }
    for label in &mut remap {
        if *label == UNSET {
            *label = next;
            next += 1;
        }
    }
    remap
}

/// Computes the canonical triangle order and vertex relabeling for a mesh.
///
/// Returns the reordered index array and the old-to-new vertex permutation. Per-vertex arrays
/// must be reordered with [`permute`] using that permutation.
pub(crate) fn canonicalize(indices: &[u32], vertex_count: usize) -> (Vec<u32>, Vec<u32>) {
    let mut triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();
    let mut permutation: Vec<u32> = (0..vertex_count as u32).collect();

    for _ in 0..MAX_PASSES {
        let before = triangles.clone();

        for triangle in &mut triangles {
            rotate_min_first(triangle);
        }
        triangles.sort_unstable();

        let remap = first_use_relabel(&triangles, vertex_count);
        for triangle in &mut triangles {
            for vertex in triangle {
                *vertex = remap[*vertex as usize];
            }
        }
        for label in &mut permutation {
            *label = remap[*label as usize];
        }

        if triangles == before {
            break;
        }
    }

    (triangles.into_iter().flatten().collect(), permutation)
}

/// Sorts triangles by a per-vertex bucket of their first index, then the usual index triple, and
/// relabels vertices in first-use order. This is the MG2 ordering, where the bucket is the
/// spatial grid cell of the rotated triangle's first vertex.
pub(crate) fn canonicalize_bucketed(
    indices: &[u32],
    vertex_count: usize,
    bucket: &[u32],
) -> (Vec<u32>, Vec<u32>) {
    let mut triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    for triangle in &mut triangles {
        rotate_min_first(triangle);
    }
    triangles.sort_unstable_by_key(|t| (bucket[t[0] as usize], *t));

    let permutation = first_use_relabel(&triangles, vertex_count);
    for triangle in &mut triangles {
        for vertex in triangle {
            *vertex = permutation[*vertex as usize];
        }
    }

    (triangles.into_iter().flatten().collect(), permutation)
}

/// Reorders per-vertex data by an old-to-new permutation, `stride` values per vertex.
pub(crate) fn permute<T: Copy + Default>(data: &[T], stride: usize, permutation: &[u32]) -> Vec<T> {
    let mut out = vec![T::default(); data.len()];
    for (old, &new) in permutation.iter().enumerate() {
        let src = old * stride;
        let dst = new as usize * stride;
        out[dst..dst + stride].copy_from_slice(&data[src..src + stride]);
    }
    out
}

/// Delta-encodes an index stream against its predictor.
///
/// The first index of a triangle is predicted by the largest index seen in any earlier triangle
/// (zero at the start); the second and third are predicted by the index before them in the same
/// triangle. Deltas are stored as two's-complement words.
pub(crate) fn delta_encode_indices(indices: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(indices.len());
    let mut max_seen = 0u32;
    for triangle in indices.chunks_exact(3) {
        out.push(triangle[0].wrapping_sub(max_seen));
        out.push(triangle[1].wrapping_sub(triangle[0]));
        out.push(triangle[2].wrapping_sub(triangle[1]));
        max_seen = max_seen.max(triangle[0]).max(triangle[1]).max(triangle[2]);
    }
    out
}

/// Inverts [`delta_encode_indices`].
///
/// # Errors
/// Returns [`Format`](Error::Format) if a delta walks the stream outside the vertex range.
pub(crate) fn delta_decode_indices(deltas: &[u32], vertex_count: u32) -> Result<Vec<u32>> {
    let mut out = Vec::with_capacity(deltas.len());
    let mut max_seen = 0u32;
    for triangle in deltas.chunks_exact(3) {
        let first = max_seen.wrapping_add(triangle[0]);
        let second = first.wrapping_add(triangle[1]);
        let third = second.wrapping_add(triangle[2]);
        if first >= vertex_count || second >= vertex_count || third >= vertex_count {
            return Err(Error::Format { reason: "triangle index out of range" });
        }
        out.push(first);
        out.push(second);
        out.push(third);
        max_seen = max_seen.max(first).max(second).max(third);
    }
    Ok(out)
}
