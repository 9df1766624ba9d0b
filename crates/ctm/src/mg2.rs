//! The MG2 method: fixed-point compression with spatial reordering.
//!
//! MG2 trades exactness for ratio. Every float stream is quantized to a per-stream precision, so
//! decoded values land within half a step of the input, and the integer streams that remain are
//! made small three ways: triangles are sorted by the grid cell of their first vertex so
//! consecutive vertices are spatial neighbours, positions and per-vertex maps are delta-coded
//! against the previous vertex, and normals are reduced to spherical residuals against the
//! [smooth-basis prediction](crate::normal) both sides derive from the decoded geometry.
//!
//! The `VERT` section carries the resolved precision and the per-axis bounds; `NORM`, `TEXC` and
//! `ATTR` each carry their own precision, so a decoder needs nothing but the file.

use std::io::{Read, Write};

use ctm_core::prelude::*;
use smallvec::SmallVec;
use snafu::prelude::*;

use crate::error::{FormatSnafu, Result};
use crate::header::{expect_section, section, Flags, Header, MAX_STRING};
use crate::lzma::{read_packed, write_packed};
use crate::mesh::{AttribMap, Mesh, MeshRef, UvMap, ATTRIB_STRIDE, UV_STRIDE, VERTEX_STRIDE};
use crate::normal::{predicted_normals, spherical_decode, spherical_encode, VertexTriangles};
use crate::options::EncodeOptions;
use crate::quant::{delta_decode, delta_encode, dequantize_array, quantize_array, Grid};
use crate::reindex::{canonicalize_bucketed, delta_decode_indices, delta_encode_indices, permute};

const UV_ORIGINS: [f32; UV_STRIDE] = [0.0; UV_STRIDE];
const ATTRIB_ORIGINS: [f32; ATTRIB_STRIDE] = [0.0; ATTRIB_STRIDE];

fn as_words(values: &[i32]) -> Vec<u32> {
    values.iter().map(|&v| v as u32).collect()
}

fn as_i32s(words: Vec<u32>) -> Vec<i32> {
    words.into_iter().map(|w| w as i32).collect()
}

fn read_precision<R: Read>(reader: &mut R) -> Result<f32> {
    let step = reader.read_f32()?;
    ensure!(
        step > 0.0 && step.is_finite(),
        FormatSnafu { reason: "non-positive precision" }
    );
    Ok(step)
}

pub(crate) fn encode<W: Write>(
    writer: &mut W,
    mesh: &MeshRef<'_>,
    options: &EncodeOptions,
) -> Result<()> {
    let vertex_count = mesh.vertex_count() as usize;
    let step = options.resolve_vertex_precision(mesh)?;
    let (min, max) = mesh.bounds();

    // Spatial ordering comes first; everything below works on the reindexed mesh.
    let grid = Grid::new(min, max, vertex_count);
    let cells = grid.cells(mesh.vertices);
    let (indices, permutation) = canonicalize_bucketed(mesh.indices, vertex_count, &cells);

    let vertices = permute(mesh.vertices, VERTEX_STRIDE, &permutation);
    let quantized = quantize_array(&vertices, &min, step)?;

    writer.write_tag(section::INDX)?;
    write_packed(writer, &delta_encode_indices(&indices))?;

    writer.write_tag(section::VERT)?;
    writer.write_f32(step)?;
    for axis in 0..3 {
        writer.write_f32(min[axis])?;
    }
    for axis in 0..3 {
        writer.write_f32(max[axis])?;
    }
    let mut deltas = quantized.clone();
    delta_encode(&mut deltas, VERTEX_STRIDE);
    write_packed(writer, &as_words(&deltas))?;

    if let Some(normals) = mesh.normals {
        // Predict from the positions the decoder will actually have.
        let decoded_positions = dequantize_array(&quantized, &min, step);
        let adjacency = VertexTriangles::build(&indices, vertex_count);
        let predicted = predicted_normals(&decoded_positions, &indices, &adjacency);

        let normal_step = options.normal_precision();
        let normals = permute(normals, VERTEX_STRIDE, &permutation);
        let residuals = spherical_encode(&normals, &predicted, normal_step);

        writer.write_tag(section::NORM)?;
        writer.write_f32(normal_step)?;
        write_packed(writer, &as_words(&residuals))?;
    }

    for (i, map) in mesh.uv_maps.iter().enumerate() {
        let map_step = options.uv_precision(i);
        let coords = permute(map.coords, UV_STRIDE, &permutation);
        let mut quantized = quantize_array(&coords, &UV_ORIGINS, map_step)?;
        delta_encode(&mut quantized, UV_STRIDE);

        writer.write_tag(section::TEXC)?;
        writer.write_string(map.name)?;
        writer.write_string(map.file_name)?;
        writer.write_f32(map_step)?;
        write_packed(writer, &as_words(&quantized))?;
    }

    for (i, map) in mesh.attrib_maps.iter().enumerate() {
        let map_step = options.attrib_precision(i);
        let values = permute(map.values, ATTRIB_STRIDE, &permutation);
        let mut quantized = quantize_array(&values, &ATTRIB_ORIGINS, map_step)?;
        delta_encode(&mut quantized, ATTRIB_STRIDE);

        writer.write_tag(section::ATTR)?;
        writer.write_string(map.name)?;
        writer.write_f32(map_step)?;
        write_packed(writer, &as_words(&quantized))?;
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
    let step = read_precision(reader)?;
    let mut min = [0.0f32; 3];
    for axis in &mut min {
        *axis = reader.read_f32()?;
    }
    // The upper bounds are informational; reconstruction only needs the lower ones.
    for _ in 0..3 {
        reader.read_f32()?;
    }
    let mut quantized = as_i32s(read_packed(reader, vertex_count * VERTEX_STRIDE)?);
    delta_decode(&mut quantized, VERTEX_STRIDE);
    let vertices = dequantize_array(&quantized, &min, step);

    let normals = if header.flags.contains(Flags::HAS_NORMALS) {
        expect_section(reader, section::NORM)?;
        let normal_step = read_precision(reader)?;
        let residuals = as_i32s(read_packed(reader, vertex_count * VERTEX_STRIDE)?);

        let adjacency = VertexTriangles::build(&indices, vertex_count);
        let predicted = predicted_normals(&vertices, &indices, &adjacency);
        Some(spherical_decode(&residuals, &predicted, normal_step))
    } else {
        None
    };

    let mut uv_maps = SmallVec::new();
    for _ in 0..header.uv_map_count {
        expect_section(reader, section::TEXC)?;
        let name = reader.read_string(MAX_STRING)?;
        let file_name = reader.read_string(MAX_STRING)?;
        let map_step = read_precision(reader)?;
        let mut quantized = as_i32s(read_packed(reader, vertex_count * UV_STRIDE)?);
        delta_decode(&mut quantized, UV_STRIDE);
        let coords = dequantize_array(&quantized, &UV_ORIGINS, map_step);
        uv_maps.push(UvMap { name, file_name, coords });
    }

    let mut attrib_maps = SmallVec::new();
    for _ in 0..header.attrib_map_count {
        expect_section(reader, section::ATTR)?;
        let name = reader.read_string(MAX_STRING)?;
        let map_step = read_precision(reader)?;
        let mut quantized = as_i32s(read_packed(reader, vertex_count * ATTRIB_STRIDE)?);
        delta_decode(&mut quantized, ATTRIB_STRIDE);
        let values = dequantize_array(&quantized, &ATTRIB_ORIGINS, map_step);
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
