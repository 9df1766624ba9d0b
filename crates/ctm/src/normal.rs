//! Smooth-basis normal prediction and the spherical coordinate coding built on it.
//!
//! MG2 does not store normals directly. Both sides derive a predicted normal per vertex from the
//! mesh itself — the area-weighted average of the normals of the triangles touching the vertex —
//! and the true normal is stored as `(rho, theta, phi)` relative to the orthonormal frame built
//! around that prediction. A well-behaved normal sits at `rho = 1, theta = 0`, so the quantized
//! residuals are tiny.
//!
//! The prediction must agree bit-for-bit between encoder and decoder, so it is always computed
//! from the *decoded* (dequantized) positions and the reindexed triangle list, and every
//! tie-break below is deterministic.

use crate::mesh::VERTEX_STRIDE;

/// Predicted bases shorter than this fall back to the unit Z frame.
const DEGENERATE: f64 = 1.0e-20;

/// Vertex-to-triangle incidence in compact CSR form: `offsets[v]..offsets[v + 1]` indexes the
/// flat `triangles` list. Built once per encode or decode call and dropped with it.
pub(crate) struct VertexTriangles {
    offsets: Vec<u32>,
    triangles: Vec<u32>,
}

impl VertexTriangles {
    pub(crate) fn build(indices: &[u32], vertex_count: usize) -> Self {
        let mut offsets = vec![0u32; vertex_count + 1];
        for &vertex in indices {
            offsets[vertex as usize + 1] += 1;
        }
        for v in 0..vertex_count {
            offsets[v + 1] += offsets[v];
        }

        let mut cursor = offsets.clone();
        let mut triangles = vec![0u32; indices.len()];
        for (i, &vertex) in indices.iter().enumerate() {
            let slot = cursor[vertex as usize];
            triangles[slot as usize] = (i / 3) as u32;
            cursor[vertex as usize] += 1;
        }

        Self { offsets, triangles }
    }

    #[inline]
    pub(crate) fn incident(&self, vertex: usize) -> &[u32] {
        let start = self.offsets[vertex] as usize;
        let end = self.offsets[vertex + 1] as usize;
        &self.triangles[start..end]
    }
}

#[inline]
fn vertex(positions: &[f32], index: u32) -> [f64; 3] {
    let at = index as usize * VERTEX_STRIDE;
    [
        positions[at] as f64,
        positions[at + 1] as f64,
        positions[at + 2] as f64,
    ]
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn length(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn normalize_or_z(a: [f64; 3]) -> [f64; 3] {
    let len = length(a);
    if len < DEGENERATE {
        [0.0, 0.0, 1.0]
    } else {
        [a[0] / len, a[1] / len, a[2] / len]
    }
}

/// Computes the predicted (smooth) normal for every vertex: the sum of the cross products of the
/// incident triangles' edges, which weights each face normal by its area, normalized at the end.
/// Degenerate sums predict the unit Z axis.
pub(crate) fn predicted_normals(
    positions: &[f32],
    indices: &[u32],
    adjacency: &VertexTriangles,
) -> Vec<[f64; 3]> {
    let face_normals: Vec<[f64; 3]> = indices
        .chunks_exact(3)
        .map(|t| {
            let a = vertex(positions, t[0]);
            let b = vertex(positions, t[1]);
            let c = vertex(positions, t[2]);
            cross(sub(b, a), sub(c, a))
        })
        .collect();

    let vertex_count = positions.len() / VERTEX_STRIDE;
    (0..vertex_count)
        .map(|v| {
            let mut sum = [0.0f64; 3];
            for &triangle in adjacency.incident(v) {
                let n = face_normals[triangle as usize];
                sum[0] += n[0];
                sum[1] += n[1];
                sum[2] += n[2];
            }
            normalize_or_z(sum)
        })
        .collect()
}

/// Builds the right-handed orthonormal frame `(u, v)` completing a unit normal `n`, anchored on
/// the world axis least aligned with `n` so the choice is stable.
fn frame(n: [f64; 3]) -> ([f64; 3], [f64; 3]) {
    let magnitudes = [n[0].abs(), n[1].abs(), n[2].abs()];
    let mut smallest = 0;
    for axis in 1..3 {
        if magnitudes[axis] < magnitudes[smallest] {
            smallest = axis;
        }
    }
    let mut anchor = [0.0f64; 3];
    anchor[smallest] = 1.0;

    let u = normalize_or_z(cross(anchor, n));
    let v = cross(n, u);
    (u, v)
}

/// Encodes normals as quantized spherical residuals `(rho, theta, phi)` against the per-vertex
/// predicted frames. One precision step covers the magnitude and both angles (in radians).
pub(crate) fn spherical_encode(
    normals: &[f32],
    predicted: &[[f64; 3]],
    step: f32,
) -> Vec<i32> {
    let step = step as f64;
    let mut out = Vec::with_capacity(normals.len());
    for (v, normal) in normals.chunks_exact(VERTEX_STRIDE).enumerate() {
        let n = [normal[0] as f64, normal[1] as f64, normal[2] as f64];
        let rho = length(n);

        let (theta, phi) = if rho < DEGENERATE {
            (0.0, 0.0)
        } else {
            let direction = [n[0] / rho, n[1] / rho, n[2] / rho];
            let basis = predicted[v];
            let (u, w) = frame(basis);
            let theta = dot(direction, basis).clamp(-1.0, 1.0).acos();
            let phi = f64::atan2(dot(direction, w), dot(direction, u));
            (theta, phi)
        };

        out.push((rho / step).round() as i32);
        out.push((theta / step).round() as i32);
        out.push((phi / step).round() as i32);
    }
    out
}

/// Inverts [`spherical_encode`] against the same predicted frames.
pub(crate) fn spherical_decode(
    quantized: &[i32],
    predicted: &[[f64; 3]],
    step: f32,
) -> Vec<f32> {
    let step = step as f64;
    let mut out = Vec::with_capacity(quantized.len());
    for (v, residual) in quantized.chunks_exact(VERTEX_STRIDE).enumerate() {
        let rho = residual[0] as f64 * step;
        let theta = residual[1] as f64 * step;
        let phi = residual[2] as f64 * step;

        let basis = predicted[v];
        let (u, w) = frame(basis);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        for axis in 0..3 {
            let direction =
                cos_theta * basis[axis] + sin_theta * (cos_phi * u[axis] + sin_phi * w[axis]);
            out.push((rho * direction) as f32);
        }
    }
    out
}
