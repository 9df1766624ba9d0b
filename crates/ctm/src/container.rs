//! The top of the codec: header framing, method dispatch, and the file-level entry points.
//!
//! [`write_mesh`] validates, writes the [header](crate::header) and hands the section sequence
//! to the selected method; [`read_mesh`] parses the header, dispatches on its method tag, and
//! re-checks every mesh invariant on what came back so a damaged file can never hand out a mesh
//! that indexes out of range. Path-based wrappers do buffered file I/O.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::header::{Flags, Header, Method};
use crate::mesh::{check, Mesh, MeshRef};
use crate::options::EncodeOptions;
use crate::{mg1, mg2, raw};

/// Encodes a mesh into a CTM stream.
///
/// # Errors
/// Returns [`InvalidArgument`](Error::InvalidArgument) for bad options,
/// [`InvalidMesh`](Error::InvalidMesh) for a mesh that breaks an invariant, and the method's own
/// errors for anything that fails while writing.
pub fn write_mesh<W: Write>(mesh: &MeshRef<'_>, options: &EncodeOptions, writer: &mut W) -> Result<()> {
    options.validate()?;
    mesh.validate()?;

    let mut flags = Flags::empty();
    if mesh.normals.is_some() {
        flags |= Flags::HAS_NORMALS;
    }
    let header = Header {
        method: options.method,
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        uv_map_count: mesh.uv_maps.len() as u32,
        attrib_map_count: mesh.attrib_maps.len() as u32,
        flags,
        comment: mesh.comment.to_owned(),
    };
    header.write_to(writer)?;

    match options.method {
        Method::Raw => raw::encode(writer, mesh),
        Method::Mg1 => mg1::encode(writer, mesh),
        Method::Mg2 => mg2::encode(writer, mesh, options),
    }
}

/// Decodes a mesh from a CTM stream.
///
/// # Errors
/// Returns [`Format`](Error::Format) (or one of its specific header/section variants) for
/// anything that disagrees with the container layout, including decoded data that breaks a mesh
/// invariant.
pub fn read_mesh<R: Read>(reader: &mut R) -> Result<Mesh> {
    let header = Header::read_from(reader)?;

    let mesh = match header.method {
        Method::Raw => raw::decode(reader, &header),
        Method::Mg1 => mg1::decode(reader, &header),
        Method::Mg2 => mg2::decode(reader, &header),
    }?;

    // A decoded mesh must satisfy the same invariants an encodable one does; a violation here
    // means the file lied, not the caller.
    check(&mesh.as_ref()).map_err(|reason| Error::Format { reason })?;
    debug_assert_eq!(mesh.vertex_count(), header.vertex_count);
    debug_assert_eq!(mesh.triangle_count(), header.triangle_count);

    Ok(mesh)
}

/// Encodes a mesh into a file, creating or truncating it.
///
/// # Errors
/// Returns [`File`](Error::File) if the file cannot be created, plus the [`write_mesh`] errors.
pub fn write_mesh_to_path<P: AsRef<Path>>(
    mesh: &MeshRef<'_>,
    options: &EncodeOptions,
    path: P,
) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| Error::File { source })?;
    let mut writer = BufWriter::new(file);
    write_mesh(mesh, options, &mut writer)?;
    writer.flush().map_err(|source| Error::File { source })
}

/// Decodes a mesh from a file.
///
/// # Errors
/// Returns [`File`](Error::File) if the file cannot be opened, plus the [`read_mesh`] errors.
pub fn read_mesh_from_path<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = std::fs::File::open(path).map_err(|source| Error::File { source })?;
    read_mesh(&mut BufReader::new(file))
}
