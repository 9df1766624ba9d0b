//! In-memory triangle meshes, owned and borrowed.
//!
//! [`Mesh`] owns its arrays and is what decoding produces. [`MeshRef`] borrows the caller's
//! arrays for the duration of an encode call, so defining a mesh never copies vertex data.
//! Both views share the same invariants, checked by [`MeshRef::validate`] before encoding and
//! again (against [`Format`](crate::error::Error::Format)) after decoding:
//!
//! * at least one vertex and one triangle, arrays a whole number of elements long,
//! * every index inside the vertex range, every float finite,
//! * at most [`MAX_MAPS`] texture and attribute maps, with unique non-empty names.

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Maximum number of texture coordinate maps and of custom attribute maps.
pub const MAX_MAPS: usize = 8;

/// Floats per vertex position or normal.
pub(crate) const VERTEX_STRIDE: usize = 3;
/// Floats per texture coordinate.
pub(crate) const UV_STRIDE: usize = 2;
/// Floats per custom attribute value.
pub(crate) const ATTRIB_STRIDE: usize = 4;

/// An owned texture coordinate map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UvMap {
    /// Unique human readable name, e.g. "Pigment".
    pub name: String,
    /// Reference to a texture image file, empty when there is none.
    pub file_name: String,
    /// Two floats per vertex.
    pub coords: Vec<f32>,
}

/// An owned custom attribute map (color, weight, occlusion, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttribMap {
    /// Unique human readable name, e.g. "Color".
    pub name: String,
    /// Four floats per vertex.
    pub values: Vec<f32>,
}

/// An owned triangle mesh, the result of decoding a CTM file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Three floats per vertex.
    pub vertices: Vec<f32>,
    /// Three vertex indices per triangle.
    pub indices: Vec<u32>,
    /// Three floats per vertex, if the mesh has normals.
    pub normals: Option<Vec<f32>>,
    /// Up to [`MAX_MAPS`] texture coordinate maps.
    pub uv_maps: SmallVec<[UvMap; MAX_MAPS]>,
    /// Up to [`MAX_MAPS`] custom attribute maps.
    pub attrib_maps: SmallVec<[AttribMap; MAX_MAPS]>,
    /// Free-form file comment, may be empty.
    pub comment: String,
}

/// A borrowed texture coordinate map, used when encoding.
#[derive(Clone, Copy, Debug)]
pub struct UvMapRef<'a> {
    pub name: &'a str,
    pub file_name: &'a str,
    pub coords: &'a [f32],
}

/// A borrowed custom attribute map, used when encoding.
#[derive(Clone, Copy, Debug)]
pub struct AttribMapRef<'a> {
    pub name: &'a str,
    pub values: &'a [f32],
}

/// A borrowed view of a triangle mesh, the input to encoding.
#[derive(Clone, Debug, Default)]
pub struct MeshRef<'a> {
    pub vertices: &'a [f32],
    pub indices: &'a [u32],
    pub normals: Option<&'a [f32]>,
    pub uv_maps: SmallVec<[UvMapRef<'a>; MAX_MAPS]>,
    pub attrib_maps: SmallVec<[AttribMapRef<'a>; MAX_MAPS]>,
    pub comment: &'a str,
}

impl Mesh {
    /// Borrows this mesh as the view the encoder consumes.
    #[must_use]
    pub fn as_ref(&self) -> MeshRef<'_> {
        MeshRef {
            vertices: &self.vertices,
            indices: &self.indices,
            normals: self.normals.as_deref(),
            uv_maps: self
                .uv_maps
                .iter()
                .map(|map| UvMapRef {
                    name: &map.name,
                    file_name: &map.file_name,
                    coords: &map.coords,
                })
                .collect(),
            attrib_maps: self
                .attrib_maps
                .iter()
                .map(|map| AttribMapRef { name: &map.name, values: &map.values })
                .collect(),
            comment: &self.comment,
        }
    }

    /// Returns the number of vertices in the mesh.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / VERTEX_STRIDE) as u32
    }

    /// Returns the number of triangles in the mesh.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / VERTEX_STRIDE) as u32
    }

    /// Resolves a texture map name to its index.
    #[must_use]
    pub fn named_uv_map(&self, name: &str) -> Option<usize> {
        self.uv_maps.iter().position(|map| map.name == name)
    }

    /// Resolves an attribute map name to its index.
    #[must_use]
    pub fn named_attrib_map(&self, name: &str) -> Option<usize> {
        self.attrib_maps.iter().position(|map| map.name == name)
    }

    /// Checks every mesh invariant, reporting violations as [`InvalidMesh`](Error::InvalidMesh).
    ///
    /// # Errors
    /// See [`MeshRef::validate`].
    pub fn validate(&self) -> Result<()> {
        self.as_ref().validate()
    }
}

impl MeshRef<'_> {
    /// Returns the number of vertices in the mesh.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / VERTEX_STRIDE) as u32
    }

    /// Returns the number of triangles in the mesh.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / VERTEX_STRIDE) as u32
    }

    /// Checks every mesh invariant, reporting violations as [`InvalidMesh`](Error::InvalidMesh).
    ///
    /// # Errors
    /// Returns [`InvalidMesh`](Error::InvalidMesh) with the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        check(self).map_err(|reason| Error::InvalidMesh { reason })
    }

    /// Mean length of all triangle edges, counting shared edges once per triangle.
    ///
    /// This is the scale a relative vertex precision is resolved against.
    #[must_use]
    pub fn mean_edge_length(&self) -> f64 {
        let mut total = 0.0_f64;
        let mut edges = 0_u64;
        for triangle in self.indices.chunks_exact(3) {
            for corner in 0..3 {
                let a = triangle[corner] as usize * VERTEX_STRIDE;
                let b = triangle[(corner + 1) % 3] as usize * VERTEX_STRIDE;
                let dx = (self.vertices[a] - self.vertices[b]) as f64;
                let dy = (self.vertices[a + 1] - self.vertices[b + 1]) as f64;
                let dz = (self.vertices[a + 2] - self.vertices[b + 2]) as f64;
                total += (dx * dx + dy * dy + dz * dz).sqrt();
                edges += 1;
            }
        }
        total / edges as f64
    }

    /// Per-axis lower and upper bounds over all vertex positions.
    #[must_use]
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for vertex in self.vertices.chunks_exact(VERTEX_STRIDE) {
            for axis in 0..3 {
                min[axis] = min[axis].min(vertex[axis]);
                max[axis] = max[axis].max(vertex[axis]);
            }
        }
        (min, max)
    }
}

/// The shared invariant checker. The encode path reports violations as `InvalidMesh`, the decode
/// path as `Format`, so this returns only the reason.
pub(crate) fn check(mesh: &MeshRef<'_>) -> core::result::Result<(), &'static str> {
    if mesh.vertices.is_empty() || mesh.vertices.len() % VERTEX_STRIDE != 0 {
        return Err("vertex array must hold at least one three-float vertex");
    }
    if mesh.indices.is_empty() || mesh.indices.len() % 3 != 0 {
        return Err("index array must hold at least one three-index triangle");
    }

    let vertex_count = mesh.vertices.len() / VERTEX_STRIDE;
    if mesh.indices.iter().any(|&index| index as usize >= vertex_count) {
        return Err("triangle index out of range");
    }
    if !mesh.vertices.iter().all(|v| v.is_finite()) {
        return Err("vertex coordinates must be finite");
    }

    if let Some(normals) = mesh.normals {
        if normals.len() != mesh.vertices.len() {
            return Err("normal array must hold one normal per vertex");
        }
        if !normals.iter().all(|v| v.is_finite()) {
            return Err("normals must be finite");
        }
    }

    if mesh.uv_maps.len() > MAX_MAPS || mesh.attrib_maps.len() > MAX_MAPS {
        return Err("too many maps");
    }
    for (i, map) in mesh.uv_maps.iter().enumerate() {
        if map.name.is_empty() {
            return Err("texture map name must not be empty");
        }
        if mesh.uv_maps[..i].iter().any(|other| other.name == map.name) {
            return Err("texture map names must be unique");
        }
        if map.coords.len() != vertex_count * UV_STRIDE {
            return Err("texture map must hold two floats per vertex");
        }
        if !map.coords.iter().all(|v| v.is_finite()) {
            return Err("texture coordinates must be finite");
        }
    }
    for (i, map) in mesh.attrib_maps.iter().enumerate() {
        if map.name.is_empty() {
            return Err("attribute map name must not be empty");
        }
        if mesh.attrib_maps[..i].iter().any(|other| other.name == map.name) {
            return Err("attribute map names must be unique");
        }
        if map.values.len() != vertex_count * ATTRIB_STRIDE {
            return Err("attribute map must hold four floats per vertex");
        }
        if !map.values.iter().all(|v| v.is_finite()) {
            return Err("attribute values must be finite");
        }
    }

    Ok(())
}
