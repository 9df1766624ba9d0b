//! Encoder configuration: compression method, fixed-point precisions, and their defaults.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::header::Method;
use crate::mesh::{MeshRef, MAX_MAPS};

/// Default vertex coordinate precision, 2^-10.
pub const DEFAULT_VERTEX_PRECISION: f32 = 1.0 / 1024.0;
/// Default normal precision, 2^-8.
pub const DEFAULT_NORMAL_PRECISION: f32 = 1.0 / 256.0;
/// Default texture coordinate precision, 2^-12.
pub const DEFAULT_UV_PRECISION: f32 = 1.0 / 4096.0;
/// Default attribute value precision, 2^-8.
pub const DEFAULT_ATTRIB_PRECISION: f32 = 1.0 / 256.0;

/// How the MG2 vertex quantization step is specified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexPrecision {
    /// A fixed quantization step in mesh units.
    Absolute(f32),
    /// A factor of the mean triangle edge length, resolved once at encode time.
    Relative(f32),
}

impl Default for VertexPrecision {
    fn default() -> Self {
        Self::Absolute(DEFAULT_VERTEX_PRECISION)
    }
}

/// Everything the encoder needs to know besides the mesh itself.
///
/// The precisions only matter for [`Method::Mg2`]; RAW and MG1 are lossless and ignore them.
/// Per-map precisions apply by map position, with any map beyond the configured entries falling
/// back to the default.
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    pub method: Method,
    pub vertex_precision: VertexPrecision,
    pub normal_precision: Option<f32>,
    pub uv_precisions: SmallVec<[f32; MAX_MAPS]>,
    pub attrib_precisions: SmallVec<[f32; MAX_MAPS]>,
}

impl EncodeOptions {
    /// Options for the default method (MG1) with default precisions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The precision for the texture map at `index`.
    #[inline]
    #[must_use]
    pub fn uv_precision(&self, index: usize) -> f32 {
        self.uv_precisions.get(index).copied().unwrap_or(DEFAULT_UV_PRECISION)
    }

    /// The precision for the attribute map at `index`.
    #[inline]
    #[must_use]
    pub fn attrib_precision(&self, index: usize) -> f32 {
        self.attrib_precisions.get(index).copied().unwrap_or(DEFAULT_ATTRIB_PRECISION)
    }

    /// The configured normal precision, defaulted.
    #[inline]
    #[must_use]
    pub fn normal_precision(&self) -> f32 {
        self.normal_precision.unwrap_or(DEFAULT_NORMAL_PRECISION)
    }

    /// Resolves the vertex precision to an absolute step, scaling a relative precision by the
    /// mesh's mean edge length. This resolution happens exactly once per encode.
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) if the resolved step is not a
    /// positive finite number (e.g. a relative precision against a degenerate mesh).
    pub(crate) fn resolve_vertex_precision(&self, mesh: &MeshRef<'_>) -> Result<f32> {
        let step = match self.vertex_precision {
            VertexPrecision::Absolute(step) => step,
            VertexPrecision::Relative(factor) => (factor as f64 * mesh.mean_edge_length()) as f32,
        };
        ensure_precision(step)?;
        Ok(step)
    }

    /// Checks that every configured precision is a positive finite number.
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) for any non-positive or non-finite
    /// precision.
    pub fn validate(&self) -> Result<()> {
        match self.vertex_precision {
            VertexPrecision::Absolute(step) | VertexPrecision::Relative(step) => {
                ensure_precision(step)?;
            }
        }
        ensure_precision(self.normal_precision())?;
        for &step in self.uv_precisions.iter().chain(self.attrib_precisions.iter()) {
            ensure_precision(step)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_precision(step: f32) -> Result<()> {
    if step > 0.0 && step.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidArgument { reason: "precision must be a positive finite number" })
    }
}
