//! The RAW method: every array as plain little-endian words, no transformation.
//!
//! RAW exists as the reference point the compressed methods are judged against — it is trivially
//! correct, bit-exact, and preserves the caller's ordering, so the test suites use it as the
//! oracle for MG1/MG2 semantics.

use std::io::{Read, Write};

use ctm_core::prelude::*;
use smallvec::SmallVec;

use crate::error::Result;
use crate::header::{expect_section, section, Header};
use crate::mesh::{AttribMap, Mesh, MeshRef, UvMap, ATTRIB_STRIDE, UV_STRIDE, VERTEX_STRIDE};

pub(crate) fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> Result<()> {
    for &value in values {
        writer.write_f32(value)?;
    }
    Ok(())
}

pub(crate) fn read_f32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f32>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_f32()?);
    }
    Ok(values)
}

/// Writes the section sequence for an already validated mesh.
pub(crate) fn encode<W: Write>(writer: &mut W, mesh: &MeshRef<'_>) -> Result<()> {
    writer.write_tag(section::INDX)?;
    for &index in mesh.indices {
        writer.write_u32(index)?;
    }

    writer.write_tag(section::VERT)?;
    write_f32s(writer, mesh.vertices)?;

    if let Some(normals) = mesh.normals {
        writer.write_tag(section::NORM)?;
        write_f32s(writer, normals)?;
    }

    for map in &mesh.uv_maps {
        writer.write_tag(section::TEXC)?;
        writer.write_string(map.name)?;
        writer.write_string(map.file_name)?;
        write_f32s(writer, map.coords)?;
    }

    for map in &mesh.attrib_maps {
        writer.write_tag(section::ATTR)?;
        writer.write_string(map.name)?;
        write_f32s(writer, map.values)?;
    }

    Ok(())
}

/// Reads the section sequence the header promises. The container layer validates the result.
pub(crate) fn decode<R: Read>(reader: &mut R, header: &Header) -> Result<Mesh> {
    let vertex_count = header.vertex_count as usize;
    let triangle_count = header.triangle_count as usize;

    expect_section(reader, section::INDX)?;
    let mut indices = Vec::with_capacity(triangle_count * 3);
    for _ in 0..triangle_count * 3 {
        indices.push(reader.read_u32()?);
    }

    expect_section(reader, section::VERT)?;
    let vertices = read_f32s(reader, vertex_count * VERTEX_STRIDE)?;

    let normals = if header.flags.contains(crate::header::Flags::HAS_NORMALS) {
        expect_section(reader, section::NORM)?;
        Some(read_f32s(reader, vertex_count * VERTEX_STRIDE)?)
    } else {
        None
    };

    let mut uv_maps = SmallVec::new();
    for _ in 0..header.uv_map_count {
        expect_section(reader, section::TEXC)?;
        let name = reader.read_string(crate::header::MAX_STRING)?;
        let file_name = reader.read_string(crate::header::MAX_STRING)?;
        let coords = read_f32s(reader, vertex_count * UV_STRIDE)?;
        uv_maps.push(UvMap { name, file_name, coords });
    }

    let mut attrib_maps = SmallVec::new();
    for _ in 0..header.attrib_map_count {
        expect_section(reader, section::ATTR)?;
        let name = reader.read_string(crate::header::MAX_STRING)?;
        let values = read_f32s(reader, vertex_count * ATTRIB_STRIDE)?;
        attrib_maps.push(AttribMap { name, values });
    }

    Ok(Mesh {
        vertices,
        indices,
        normals,
        uv_maps,
        attrib_maps,
        comment: header.comment.clone(),
    })
}
