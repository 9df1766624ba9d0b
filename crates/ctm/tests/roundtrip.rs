//! Round-trip guarantees: RAW and MG1 preserve content exactly, MG2 stays within its
//! precision bounds, and every method preserves the triangle set.

mod common;

use approx::assert_abs_diff_eq;
use common::{
    assert_same_topology, decode, encode, max_abs_diff, quad, single_triangle, tetrahedron,
};
use openctm::prelude::*;

fn full_mesh() -> Mesh {
    let mut mesh = tetrahedron();
    mesh.uv_maps.push(UvMap {
        name: String::from("Pigment"),
        file_name: String::from("pigment.png"),
        coords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.5, 0.5],
    });
    mesh.attrib_maps.push(AttribMap {
        name: String::from("Color"),
        values: vec![
            1.0, 0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, 1.0, //
            0.25, 0.75, 0.5, 1.0,
        ],
    });
    mesh.comment = String::from("four faces");
    mesh
}

#[test]
fn raw_round_trip_is_bit_exact() {
    let mesh = full_mesh();
    let decoded = decode(&encode(&mesh, Method::Raw));
    assert_eq!(decoded, mesh);
}

#[test]
fn raw_preserves_non_canonical_ordering() {
    // RAW must not reorder anything, so a deliberately shuffled mesh survives verbatim.
    let mesh = Mesh {
        vertices: vec![
            0.5, 0.5, 0.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0,
        ],
        indices: vec![3, 1, 2, 0, 3, 2],
        ..Default::default()
    };
    let decoded = decode(&encode(&mesh, Method::Raw));
    assert_eq!(decoded, mesh);
}

#[test]
fn mg1_round_trip_is_bit_exact_on_canonical_meshes() {
    for mesh in [single_triangle(), quad(), full_mesh()] {
        let decoded = decode(&encode(&mesh, Method::Mg1));
        assert_eq!(decoded, mesh);
    }
}

#[test]
fn mg1_preserves_content_of_shuffled_meshes() {
    let mesh = Mesh {
        vertices: vec![
            0.25, 0.5, 0.125, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.5,
        ],
        indices: vec![3, 1, 2, 2, 1, 0],
        ..Default::default()
    };
    let decoded = decode(&encode(&mesh, Method::Mg1));

    assert_same_topology(&decoded, &mesh);
    // Same float values, possibly in a different vertex order.
    let mut got: Vec<u32> = decoded.vertices.iter().map(|v| v.to_bits()).collect();
    let mut want: Vec<u32> = mesh.vertices.iter().map(|v| v.to_bits()).collect();
    got.sort_unstable();
    want.sort_unstable();
    assert_eq!(got, want);
}

#[test]
fn mg1_canonical_order_is_stable_across_round_trips() {
    // Whatever order one MG1 round trip produces, a second one reproduces exactly.
    let mesh = Mesh {
        vertices: vec![
            0.25, 0.5, 0.125, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.5, //
            0.5, 0.5, 0.5,
        ],
        indices: vec![4, 1, 2, 2, 1, 0, 3, 4, 2],
        ..Default::default()
    };
    let once = decode(&encode(&mesh, Method::Mg1));
    let twice = decode(&encode(&once, Method::Mg1));
    assert_eq!(twice, once);
}

fn skewed_tetrahedron() -> Mesh {
    // Coordinates chosen to sit off the quantization lattice.
    let mut mesh = tetrahedron();
    mesh.vertices = vec![
        0.013, -0.221, 0.517, //
        0.941, 0.037, 0.441, //
        0.107, 0.893, 0.371, //
        0.289, 0.157, 1.303,
    ];
    mesh
}

#[test]
fn mg2_vertex_error_is_bounded_by_half_a_step() {
    let mesh = skewed_tetrahedron();
    let step = 1.0 / 1024.0;

    let options = EncodeOptions {
        method: Method::Mg2,
        vertex_precision: VertexPrecision::Absolute(step),
        ..Default::default()
    };
    let mut buffer = Vec::new();
    write_mesh(&mesh.as_ref(), &options, &mut buffer).unwrap();
    let decoded = decode(&buffer);

    assert_eq!(decoded.vertex_count(), mesh.vertex_count());
    assert_eq!(decoded.triangle_count(), mesh.triangle_count());

    // The decoder relabels vertices; recover the correspondence by nearest position, which is
    // unambiguous at this precision.
    for vertex in mesh.vertices.chunks_exact(3) {
        let nearest = decoded
            .vertices
            .chunks_exact(3)
            .map(|got| max_abs_diff(got, vertex))
            .fold(f32::INFINITY, f32::min);
        assert!(nearest <= step / 2.0 + f32::EPSILON, "error {nearest}");
    }
}

#[test]
fn mg2_normals_stay_within_angular_bounds() {
    let mesh = skewed_tetrahedron();
    let step = 1.0 / 1024.0;
    let normal_step = 1.0 / 256.0;

    let options = EncodeOptions {
        method: Method::Mg2,
        vertex_precision: VertexPrecision::Absolute(step),
        normal_precision: Some(normal_step),
        ..Default::default()
    };
    let mut buffer = Vec::new();
    write_mesh(&mesh.as_ref(), &options, &mut buffer).unwrap();
    let decoded = decode(&buffer);
    let decoded_normals = decoded.normals.as_ref().unwrap();
    let input_normals = mesh.normals.as_ref().unwrap();

    // Match decoded vertices back to inputs by position, then compare their normals.
    for (vertex, normal) in mesh.vertices.chunks_exact(3).zip(input_normals.chunks_exact(3)) {
        let nearest = decoded
            .vertices
            .chunks_exact(3)
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                max_abs_diff(a, vertex).partial_cmp(&max_abs_diff(b, vertex)).unwrap()
            })
            .map(|(v, _)| v)
            .unwrap();
        let got = &decoded_normals[nearest * 3..nearest * 3 + 3];

        let got_len = (got[0] * got[0] + got[1] * got[1] + got[2] * got[2]).sqrt();
        assert_abs_diff_eq!(got_len, 1.0, epsilon = normal_step / 2.0 + 1.0e-5);

        let dot = (got[0] * normal[0] + got[1] * normal[1] + got[2] * normal[2]) / got_len;
        let angle = dot.clamp(-1.0, 1.0).acos();
        assert!(angle <= 2.0 * normal_step, "angular error {angle}");
    }
}

#[test]
fn mg2_map_errors_are_bounded_per_channel() {
    let mut mesh = skewed_tetrahedron();
    mesh.normals = None;
    mesh.uv_maps.push(UvMap {
        name: String::from("Pigment"),
        file_name: String::new(),
        coords: vec![0.013, 0.987, 0.341, 0.007, 0.499, 0.501, 0.253, 0.747],
    });
    mesh.attrib_maps.push(AttribMap {
        name: String::from("Occlusion"),
        values: vec![
            0.13, 0.87, 0.41, 1.0, //
            0.07, 0.93, 0.19, 1.0, //
            0.29, 0.71, 0.53, 1.0, //
            0.64, 0.36, 0.11, 1.0,
        ],
    });

    let uv_step = 1.0 / 4096.0;
    let attrib_step = 1.0 / 256.0;
    let options = EncodeOptions {
        method: Method::Mg2,
        uv_precisions: [uv_step].into_iter().collect(),
        attrib_precisions: [attrib_step].into_iter().collect(),
        ..Default::default()
    };
    let mut buffer = Vec::new();
    write_mesh(&mesh.as_ref(), &options, &mut buffer).unwrap();
    let decoded = decode(&buffer);

    // UV and attribute values are per-vertex; compare as sorted multisets per channel bound.
    let mut got: Vec<f32> = decoded.uv_maps[0].coords.clone();
    let mut want: Vec<f32> = mesh.uv_maps[0].coords.clone();
    got.sort_by(f32::total_cmp);
    want.sort_by(f32::total_cmp);
    assert!(max_abs_diff(&got, &want) <= uv_step / 2.0 + f32::EPSILON);

    let mut got: Vec<f32> = decoded.attrib_maps[0].values.clone();
    let mut want: Vec<f32> = mesh.attrib_maps[0].values.clone();
    got.sort_by(f32::total_cmp);
    want.sort_by(f32::total_cmp);
    assert!(max_abs_diff(&got, &want) <= attrib_step / 2.0 + f32::EPSILON);
}

#[test]
fn mg2_resolves_relative_precision_against_edge_length() {
    let mesh = skewed_tetrahedron();
    let factor = 0.01f32;
    let resolved = (factor as f64 * mesh.as_ref().mean_edge_length()) as f32;

    let options = EncodeOptions {
        method: Method::Mg2,
        vertex_precision: VertexPrecision::Relative(factor),
        ..Default::default()
    };
    let mut buffer = Vec::new();
    write_mesh(&mesh.as_ref(), &options, &mut buffer).unwrap();
    let decoded = decode(&buffer);

    for vertex in mesh.vertices.chunks_exact(3) {
        let nearest = decoded
            .vertices
            .chunks_exact(3)
            .map(|got| max_abs_diff(got, vertex))
            .fold(f32::INFINITY, f32::min);
        assert!(nearest <= resolved / 2.0 + f32::EPSILON, "error {nearest}");
    }
}

#[test]
fn every_method_preserves_counts_and_comment() {
    let mesh = full_mesh();
    for method in [Method::Raw, Method::Mg1, Method::Mg2] {
        let decoded = decode(&encode(&mesh, method));
        assert_eq!(decoded.vertex_count(), 4);
        assert_eq!(decoded.triangle_count(), 4);
        assert_eq!(decoded.comment, "four faces");
        assert_eq!(decoded.uv_maps[0].name, "Pigment");
        assert_eq!(decoded.uv_maps[0].file_name, "pigment.png");
        assert_eq!(decoded.attrib_maps[0].name, "Color");
        assert!(decoded.normals.is_some());
    }
}

#[test]
fn mg1_compresses_repetitive_meshes() {
    // A flat grid: highly regular indices and positions should shrink well below RAW.
    let side = 24usize;
    let mut vertices = Vec::new();
    for y in 0..=side {
        for x in 0..=side {
            vertices.extend_from_slice(&[x as f32, y as f32, 0.0]);
        }
    }
    let mut indices = Vec::new();
    let stride = (side + 1) as u32;
    for y in 0..side as u32 {
        for x in 0..side as u32 {
            let corner = y * stride + x;
            indices.extend_from_slice(&[corner, corner + 1, corner + stride]);
            indices.extend_from_slice(&[corner + 1, corner + stride + 1, corner + stride]);
        }
    }
    let mesh = Mesh { vertices, indices, ..Default::default() };

    let raw = encode(&mesh, Method::Raw);
    let mg1 = encode(&mesh, Method::Mg1);
    assert!(mg1.len() < raw.len() / 2, "raw {} vs mg1 {}", raw.len(), mg1.len());

    let decoded = decode(&mg1);
    assert_same_topology(&decoded, &mesh);
}
