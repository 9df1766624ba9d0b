//! Stateful import/export contexts in the spirit of the classic OpenCTM API.
//!
//! The original library hands out opaque context handles with one sticky error slot per handle.
//! Here each context is an owned value: [`Exporter`] accumulates a mesh definition and
//! configuration, then saves it; [`Importer`] loads a file and answers queries about it. Every
//! failing operation records its [`ErrorKind`] in the sticky slot *and* returns it as a normal
//! `Result`; a later success does not clear the slot, only [`take_error`](Exporter::take_error)
//! does. Failing operations never change context state.
//!
//! The exporter walks `Empty -> MeshDefined -> MapsDefined* -> Saved`: maps can only be added
//! between defining a mesh and saving, and a new [`define_mesh`](Exporter::define_mesh) starts
//! the cycle over. The importer is simply `Empty -> Loaded`, where a failed load leaves it
//! empty and a later load replaces the contents wholesale (the borrow checker enforces that old
//! array views die with it).

use std::io::{Read, Write};
use std::path::Path;

use smallvec::SmallVec;

use crate::container::{read_mesh, write_mesh, write_mesh_to_path};
use crate::error::{Error, ErrorKind, Result};
use crate::header::Method;
use crate::mesh::{AttribMapRef, Mesh, MeshRef, UvMap, UvMapRef, MAX_MAPS};
use crate::options::{
    ensure_precision, EncodeOptions, VertexPrecision, DEFAULT_ATTRIB_PRECISION,
    DEFAULT_UV_PRECISION,
};

/// An export context: define a mesh, add maps, configure, save.
///
/// The exporter borrows every caller array for its own lifetime and never copies them; the
/// caller keeps ownership.
#[derive(Debug, Default)]
pub struct Exporter<'a> {
    method: Method,
    vertex_precision: VertexPrecision,
    normal_precision: Option<f32>,
    comment: String,

    vertices: &'a [f32],
    indices: &'a [u32],
    normals: Option<&'a [f32]>,
    uv_maps: SmallVec<[UvMapRef<'a>; MAX_MAPS]>,
    uv_precisions: SmallVec<[f32; MAX_MAPS]>,
    attrib_maps: SmallVec<[AttribMapRef<'a>; MAX_MAPS]>,
    attrib_precisions: SmallVec<[f32; MAX_MAPS]>,

    mesh_defined: bool,
    saved: bool,
    sticky: Option<ErrorKind>,
}

impl<'a> Exporter<'a> {
    /// Creates an empty export context with default configuration (MG1, default precisions).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.sticky = Some(error.kind());
        }
        result
    }

    /// Returns and clears the sticky error, the only way to reset it.
    pub fn take_error(&mut self) -> Option<ErrorKind> {
        self.sticky.take()
    }

    /// Selects the compression method used by the next save.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// Sets an absolute vertex coordinate precision (MG2 only).
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) unless `step` is positive and finite.
    pub fn set_vertex_precision(&mut self, step: f32) -> Result<()> {
        let result = ensure_precision(step);
        let result = self.record(result);
        if result.is_ok() {
            self.vertex_precision = VertexPrecision::Absolute(step);
        }
        result
    }

    /// Sets the vertex precision as a factor of the mean edge length, resolved at save time.
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) unless `factor` is positive and
    /// finite.
    pub fn set_vertex_precision_relative(&mut self, factor: f32) -> Result<()> {
        let result = ensure_precision(factor);
        let result = self.record(result);
        if result.is_ok() {
            self.vertex_precision = VertexPrecision::Relative(factor);
        }
        result
    }

    /// Sets the normal precision (MG2 only).
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) unless `step` is positive and finite.
    pub fn set_normal_precision(&mut self, step: f32) -> Result<()> {
        let result = ensure_precision(step);
        let result = self.record(result);
        if result.is_ok() {
            self.normal_precision = Some(step);
        }
        result
    }

    /// Sets the precision of an already added texture map (MG2 only).
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) for an unknown map index or a
    /// non-positive step.
    pub fn set_uv_precision(&mut self, map: usize, step: f32) -> Result<()> {
        let result = (|| {
            if map >= self.uv_maps.len() {
                return Err(Error::InvalidArgument { reason: "no texture map at this index" });
            }
            ensure_precision(step)
        })();
        let result = self.record(result);
        if result.is_ok() {
            self.uv_precisions[map] = step;
        }
        result
    }

    /// Sets the precision of an already added attribute map (MG2 only).
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) for an unknown map index or a
    /// non-positive step.
    pub fn set_attrib_precision(&mut self, map: usize, step: f32) -> Result<()> {
        let result = (|| {
            if map >= self.attrib_maps.len() {
                return Err(Error::InvalidArgument { reason: "no attribute map at this index" });
            }
            ensure_precision(step)
        })();
        let result = self.record(result);
        if result.is_ok() {
            self.attrib_precisions[map] = step;
        }
        result
    }

    /// Sets the file comment stored in the header.
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_owned();
    }

    /// Defines the triangle mesh to encode, replacing any previous definition and its maps.
    ///
    /// # Errors
    /// Returns [`InvalidArgument`](Error::InvalidArgument) for empty or misaligned arrays; the
    /// full mesh invariants are checked at save time.
    pub fn define_mesh(
        &mut self,
        vertices: &'a [f32],
        indices: &'a [u32],
        normals: Option<&'a [f32]>,
    ) -> Result<()> {
        let result = (|| {
            if vertices.is_empty() || vertices.len() % 3 != 0 {
                return Err(Error::InvalidArgument {
                    reason: "vertex array must hold at least one three-float vertex",
                });
            }
            if indices.is_empty() || indices.len() % 3 != 0 {
                return Err(Error::InvalidArgument {
                    reason: "index array must hold at least one three-index triangle",
                });
            }
            if let Some(normals) = normals {
                if normals.len() != vertices.len() {
                    return Err(Error::InvalidArgument {
                        reason: "normal array must hold one normal per vertex",
                    });
                }
            }
            Ok(())
        })();
        let result = self.record(result);
        if result.is_ok() {
            self.vertices = vertices;
            self.indices = indices;
            self.normals = normals;
            self.uv_maps.clear();
            self.uv_precisions.clear();
            self.attrib_maps.clear();
            self.attrib_precisions.clear();
            self.mesh_defined = true;
            self.saved = false;
        }
        result
    }

    /// Adds a texture coordinate map (two floats per vertex), returning its index.
    ///
    /// # Errors
    /// Returns [`InvalidOperation`](Error::InvalidOperation) before
    /// [`define_mesh`](Self::define_mesh) or after a save, and
    /// [`InvalidArgument`](Error::InvalidArgument) for a bad name or array length.
    pub fn add_uv_map(
        &mut self,
        coords: &'a [f32],
        name: &'a str,
        file_name: Option<&'a str>,
    ) -> Result<usize> {
        let result = (|| {
            self.ensure_maps_addable()?;
            if name.is_empty() {
                return Err(Error::InvalidArgument { reason: "texture map name must not be empty" });
            }
            if self.uv_maps.iter().any(|map| map.name == name) {
                return Err(Error::InvalidArgument { reason: "texture map names must be unique" });
            }
            if self.uv_maps.len() == MAX_MAPS {
                return Err(Error::InvalidOperation { reason: "all eight texture map slots are taken" });
            }
            if coords.len() != self.vertices.len() / 3 * 2 {
                return Err(Error::InvalidArgument {
                    reason: "texture map must hold two floats per vertex",
                });
            }
            Ok(())
        })();
        let result = self.record(result);
        result.map(|()| {
            self.uv_maps.push(UvMapRef { name, file_name: file_name.unwrap_or(""), coords });
            self.uv_precisions.push(DEFAULT_UV_PRECISION);
            self.uv_maps.len() - 1
        })
    }

    /// Adds a custom attribute map (four floats per vertex), returning its index.
    ///
    /// # Errors
    /// Returns [`InvalidOperation`](Error::InvalidOperation) before
    /// [`define_mesh`](Self::define_mesh) or after a save, and
    /// [`InvalidArgument`](Error::InvalidArgument) for a bad name or array length.
    pub fn add_attrib_map(&mut self, values: &'a [f32], name: &'a str) -> Result<usize> {
        let result = (|| {
            self.ensure_maps_addable()?;
            if name.is_empty() {
                return Err(Error::InvalidArgument {
                    reason: "attribute map name must not be empty",
                });
            }
            if self.attrib_maps.iter().any(|map| map.name == name) {
                return Err(Error::InvalidArgument {
                    reason: "attribute map names must be unique",
                });
            }
            if self.attrib_maps.len() == MAX_MAPS {
                return Err(Error::InvalidOperation {
                    reason: "all eight attribute map slots are taken",
                });
            }
            if values.len() != self.vertices.len() / 3 * 4 {
                return Err(Error::InvalidArgument {
                    reason: "attribute map must hold four floats per vertex",
                });
            }
            Ok(())
        })();
        let result = self.record(result);
        result.map(|()| {
            self.attrib_maps.push(AttribMapRef { name, values });
            self.attrib_precisions.push(DEFAULT_ATTRIB_PRECISION);
            self.attrib_maps.len() - 1
        })
    }

    fn ensure_maps_addable(&self) -> Result<()> {
        if !self.mesh_defined {
            return Err(Error::InvalidOperation { reason: "define a mesh before adding maps" });
        }
        if self.saved {
            return Err(Error::InvalidOperation {
                reason: "define a new mesh before adding maps to a saved context",
            });
        }
        Ok(())
    }

    fn build_options(&self) -> EncodeOptions {
        EncodeOptions {
            method: self.method,
            vertex_precision: self.vertex_precision,
            normal_precision: self.normal_precision,
            uv_precisions: self.uv_precisions.clone(),
            attrib_precisions: self.attrib_precisions.clone(),
        }
    }

    fn build_mesh(&self) -> MeshRef<'_> {
        MeshRef {
            vertices: self.vertices,
            indices: self.indices,
            normals: self.normals,
            uv_maps: self
                .uv_maps
                .iter()
                .map(|map| UvMapRef {
                    name: map.name,
                    file_name: map.file_name,
                    coords: map.coords,
                })
                .collect(),
            attrib_maps: self
                .attrib_maps
                .iter()
                .map(|map| AttribMapRef { name: map.name, values: map.values })
                .collect(),
            comment: &self.comment,
        }
    }

    /// Encodes the defined mesh into a writer. A failure leaves the context intact for retry.
    ///
    /// # Errors
    /// Returns [`InvalidOperation`](Error::InvalidOperation) while no mesh is defined, plus all
    /// [`write_mesh`] errors.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let result = if self.mesh_defined {
            write_mesh(&self.build_mesh(), &self.build_options(), writer)
        } else {
            Err(Error::InvalidOperation { reason: "no mesh defined" })
        };
        let result = self.record(result);
        if result.is_ok() {
            self.saved = true;
        }
        result
    }

    /// Encodes the defined mesh into a file. A failure leaves the context intact for retry.
    ///
    /// # Errors
    /// See [`save_to`](Self::save_to); additionally returns [`File`](Error::File) if the file
    /// cannot be created.
    pub fn save_to_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let result = if self.mesh_defined {
            write_mesh_to_path(&self.build_mesh(), &self.build_options(), path)
        } else {
            Err(Error::InvalidOperation { reason: "no mesh defined" })
        };
        let result = self.record(result);
        if result.is_ok() {
            self.saved = true;
        }
        result
    }
}

/// An import context: load a file, then query the decoded mesh.
#[derive(Debug, Default)]
pub struct Importer {
    mesh: Option<Mesh>,
    sticky: Option<ErrorKind>,
}

impl Importer {
    /// Creates an empty import context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the sticky error, the only way to reset it.
    pub fn take_error(&mut self) -> Option<ErrorKind> {
        self.sticky.take()
    }

    /// Decodes a mesh from a reader, replacing the current contents. On failure the context
    /// reverts to empty.
    ///
    /// # Errors
    /// All [`read_mesh`] errors.
    pub fn load_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        match read_mesh(reader) {
            Ok(mesh) => {
                self.mesh = Some(mesh);
                Ok(())
            }
            Err(error) => {
                self.mesh = None;
                self.sticky = Some(error.kind());
                Err(error)
            }
        }
    }

    /// Decodes a mesh from a file, replacing the current contents. On failure the context
    /// reverts to empty.
    ///
    /// # Errors
    /// All [`read_mesh`] errors, plus [`File`](Error::File) if the file cannot be opened.
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match crate::container::read_mesh_from_path(path) {
            Ok(mesh) => {
                self.mesh = Some(mesh);
                Ok(())
            }
            Err(error) => {
                self.mesh = None;
                self.sticky = Some(error.kind());
                Err(error)
            }
        }
    }

    /// The loaded mesh, if any. All array views borrow from it.
    #[must_use]
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Number of vertices, zero while empty.
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, Mesh::vertex_count)
    }

    /// Number of triangles, zero while empty.
    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, Mesh::triangle_count)
    }

    /// Whether the loaded mesh carries normals.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        self.mesh.as_ref().is_some_and(|mesh| mesh.normals.is_some())
    }

    /// Number of texture coordinate maps, zero while empty.
    #[must_use]
    pub fn uv_map_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, |mesh| mesh.uv_maps.len() as u32)
    }

    /// Number of custom attribute maps, zero while empty.
    #[must_use]
    pub fn attrib_map_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, |mesh| mesh.attrib_maps.len() as u32)
    }

    /// The file comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.mesh.as_ref().map(|mesh| mesh.comment.as_str())
    }

    /// The triangle index array.
    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.mesh.as_ref().map(|mesh| mesh.indices.as_slice())
    }

    /// The vertex position array.
    #[must_use]
    pub fn vertices(&self) -> Option<&[f32]> {
        self.mesh.as_ref().map(|mesh| mesh.vertices.as_slice())
    }

    /// The normal array, if the mesh has one.
    #[must_use]
    pub fn normals(&self) -> Option<&[f32]> {
        self.mesh.as_ref().and_then(|mesh| mesh.normals.as_deref())
    }

    /// The texture map at `index`.
    #[must_use]
    pub fn uv_map(&self, index: usize) -> Option<&UvMap> {
        self.mesh.as_ref().and_then(|mesh| mesh.uv_maps.get(index))
    }

    /// The attribute map at `index`.
    #[must_use]
    pub fn attrib_map(&self, index: usize) -> Option<&crate::mesh::AttribMap> {
        self.mesh.as_ref().and_then(|mesh| mesh.attrib_maps.get(index))
    }

    /// Resolves a texture map name to its index. A missing name is not an error.
    #[must_use]
    pub fn named_uv_map(&self, name: &str) -> Option<usize> {
        self.mesh.as_ref().and_then(|mesh| mesh.named_uv_map(name))
    }

    /// Resolves an attribute map name to its index. A missing name is not an error.
    #[must_use]
    pub fn named_attrib_map(&self, name: &str) -> Option<usize> {
        self.mesh.as_ref().and_then(|mesh| mesh.named_attrib_map(name))
    }
}
