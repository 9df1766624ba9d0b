//! The MG1 method: lossless compression of the exact 32-bit values.
//!
//! MG1 never touches a float's bit pattern. It earns its ratio from ordering alone: the mesh is
//! [canonicalized](crate::reindex), the index stream is delta-coded against its predictor, and
//! every array goes through the byte interleaver and LZMA. Decoding reproduces the canonical
//! mesh exactly — the same floats, the same topology, in the canonical order.

use std::io::{Read, Write};

use ctm_core::prelude::*;
use smallvec::SmallVec;

use crate::error::Result;
use crate::header::{expect_section, section, Flags, Header, MAX_STRING};
use crate::lzma::{read_packed, write_packed};
use crate::mesh::{AttribMap, Mesh, MeshRef, UvMap, ATTRIB_STRIDE, UV_STRIDE, VERTEX_STRIDE};
use crate::reindex::{canonicalize, delta_decode_indices, delta_encode_indices, permute};

fn f32_bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

fn bits_f32(words: Vec<u32>) -> Vec<f32> {
    words.into_iter().map(f32::from_bits).collect()
}

pub(crate) fn encode<W: Write>(writer: &mut W, mesh: &MeshRef<'_>) -> Result<()> {
    let vertex_count = mesh.vertex_count() as usize;
    let (indices, permutation) = canonicalize(mesh.indices, vertex_count);

    writer.write_tag(section::INDX)?;
    write_packed(writer, &delta_encode_indices(&indices))?;

    writer.write_tag(section::VERT)?;
    let vertices = permute(mesh.vertices, VERTEX_STRIDE, &permutation);
    write_packed(writer, &f32_bits(&vertices))?;

    if let Some(normals) = mesh.normals {
        writer.write_tag(section::NORM)?;
        let normals = permute(normals, VERTEX_STRIDE, &permutation);
        write_packed(writer, &f32_bits(&normals))?;
    }

    for map in &mesh.uv_maps {
        writer.write_tag(section::TEXC)?;
        writer.write_string(map.name)?;
        writer.write_string(map.file_name)?;
        let coords = permute(map.coords, UV_STRIDE, &permutation);
        write_packed(writer, &f32_bits(&coords))?;
    }

    for map in &mesh.attrib_maps {
        writer.write_tag(section::ATTR)?;
        writer.write_string(map.name)?;
        let values = permute(map.values, ATTRIB_STRIDE, &permutation);
        write_packed(writer, &f32_bits(&values))?;
    }

    Ok(())
}

pub(crate) fn decode<R: Read>(reader: &mut R, header: &Header) -> Result<Mesh> {
    let vertex_count = header.vertex_count as usize;
    let triangle_count = header.triangle_count as usize;

    expect_section(reader, section::INDX)?;
    let deltas = read_packed(reader, triangle_count * 3)?;
    let indices = delta_decode_indices(&deltas, header.vertex_count)?;

    expect_section(reader, section::VERT)?;
    let vertices = bits_f32(read_packed(reader, vertex_count * VERTEX_STRIDE)?);

    let normals = if header.flags.contains(Flags::HAS_NORMALS) {
        expect_section(reader, section::NORM)?;
        Some(bits_f32(read_packed(reader, vertex_count * VERTEX_STRIDE)?))
    } else {
        None
    };

    let mut uv_maps = SmallVec::new();
    for _ in 0..header.uv_map_count {
        expect_section(reader, section::TEXC)?;
        let name = reader.read_string(MAX_STRING)?;
        let file_name = reader.read_string(MAX_STRING)?;
        let coords = bits_f32(read_packed(reader, vertex_count * UV_STRIDE)?);
        uv_maps.push(UvMap { name, file_name, coords });
    }

    let mut attrib_maps = SmallVec::new();
    for _ in 0..header.attrib_map_count {
        expect_section(reader, section::ATTR)?;
        let name = reader.read_string(MAX_STRING)?;
        let values = bits_f32(read_packed(reader, vertex_count * ATTRIB_STRIDE)?);
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
