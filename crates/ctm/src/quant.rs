//! Fixed-point quantization and the spatial sort grid used by MG2.
//!
//! Quantization maps a float to the nearest multiple of a precision step, so every decoded value
//! lands within half a step of the input. Vertex coordinates quantize against the per-axis lower
//! bound; texture coordinates and attributes quantize against zero. Quantized streams are then
//! delta-coded per channel, which the byte interleaver and LZMA turn into very little output for
//! spatially coherent data.

use crate::error::{Error, Result};

/// Quantizes a value to multiples of `step` above `origin`.
///
/// # Errors
/// Returns [`InvalidArgument`](Error::InvalidArgument) if the quantized magnitude does not fit
/// in 32 bits, i.e. the precision is too fine for the data's extent.
#[inline]
pub(crate) fn quantize(value: f32, origin: f32, step: f32) -> Result<i32> {
    let scaled = ((value as f64 - origin as f64) / step as f64).round();
    if scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64 {
        Ok(scaled as i32)
    } else {
        Err(Error::InvalidArgument { reason: "precision too fine for the data range" })
    }
}

/// Reconstructs a value quantized by [`quantize`].
#[inline]
pub(crate) fn dequantize(quantized: i32, origin: f32, step: f32) -> f32 {
    (origin as f64 + quantized as f64 * step as f64) as f32
}

/// Quantizes a whole channel-interleaved array against per-channel origins.
pub(crate) fn quantize_array(
    values: &[f32],
    origins: &[f32],
    step: f32,
) -> Result<Vec<i32>> {
    let stride = origins.len();
    let mut out = Vec::with_capacity(values.len());
    for element in values.chunks_exact(stride) {
        for (channel, &value) in element.iter().enumerate() {
            out.push(quantize(value, origins[channel], step)?);
        }
    }
    Ok(out)
}

/// Reconstructs a whole channel-interleaved array quantized by [`quantize_array`].
pub(crate) fn dequantize_array(quantized: &[i32], origins: &[f32], step: f32) -> Vec<f32> {
    let stride = origins.len();
    quantized
        .chunks_exact(stride)
        .flat_map(|element| {
            element
                .iter()
                .enumerate()
                .map(|(channel, &q)| dequantize(q, origins[channel], step))
        })
        .collect()
}

/// Rewrites each element as its difference from the previous element, per channel, in place.
/// The first element stays absolute. Wrapping arithmetic keeps the transform exact.
pub(crate) fn delta_encode(values: &mut [i32], stride: usize) {
    for i in (stride..values.len()).rev() {
        values[i] = values[i].wrapping_sub(values[i - stride]);
    }
}

/// Inverts [`delta_encode`] in place.
pub(crate) fn delta_decode(values: &mut [i32], stride: usize) {
    for i in stride..values.len() {
        values[i] = values[i].wrapping_add(values[i - stride]);
    }
}

/// A uniform grid over the mesh's bounding box, sized for about one vertex per cell.
///
/// Only the encoder consults the grid (to sort triangles by the cell of their first vertex), so
/// its exact shape never reaches the wire; it just has to be deterministic for one encode call.
pub(crate) struct Grid {
    origin: [f32; 3],
    cell_size: [f32; 3],
    divisions: u32,
}

impl Grid {
    /// Cap on per-axis divisions, keeping cell indices comfortably inside a `u32`.
    const MAX_DIVISIONS: u32 = 64;

    pub(crate) fn new(min: [f32; 3], max: [f32; 3], vertex_count: usize) -> Self {
        let divisions = ((vertex_count as f64).cbrt().ceil() as u32).clamp(1, Self::MAX_DIVISIONS);
        let mut cell_size = [1.0f32; 3];
        for axis in 0..3 {
            let extent = max[axis] - min[axis];
            if extent > 0.0 {
                cell_size[axis] = extent / divisions as f32;
            }
        }
        Self { origin: min, cell_size, divisions }
    }

    /// The cell index of a position, row-major over x, then y, then z.
    pub(crate) fn cell_index(&self, position: &[f32]) -> u32 {
        let mut cell = [0u32; 3];
        for axis in 0..3 {
            let offset = (position[axis] - self.origin[axis]) / self.cell_size[axis];
            cell[axis] = (offset as u32).min(self.divisions - 1);
        }
        (cell[2] * self.divisions + cell[1]) * self.divisions + cell[0]
    }

    /// The cell index of every vertex in a packed position array.
    pub(crate) fn cells(&self, vertices: &[f32]) -> Vec<u32> {
        vertices.chunks_exact(3).map(|v| self.cell_index(v)).collect()
    }
}
