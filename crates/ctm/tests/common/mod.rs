//! Mesh builders and comparison helpers shared by the integration suites.

use openctm::prelude::*;

/// The single right triangle from the format documentation.
pub fn single_triangle() -> Mesh {
    Mesh {
        vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        indices: vec![0, 1, 2],
        ..Default::default()
    }
}

/// A unit quad split into two triangles, already in canonical order.
pub fn quad() -> Mesh {
    Mesh {
        vertices: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}

/// A tetrahedron with consistent winding and unit per-vertex normals, in canonical order.
pub fn tetrahedron() -> Mesh {
    let inv_sqrt3 = 1.0f32 / 3.0f32.sqrt();
    Mesh {
        vertices: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ],
        indices: vec![0, 1, 2, 0, 2, 3, 0, 3, 1, 1, 3, 2],
        normals: Some(vec![
            -inv_sqrt3, -inv_sqrt3, -inv_sqrt3, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]),
        ..Default::default()
    }
}

/// Encodes a mesh into memory with the given method and default precisions.
pub fn encode(mesh: &Mesh, method: Method) -> Vec<u8> {
    let options = EncodeOptions { method, ..Default::default() };
    let mut buffer = Vec::new();
    write_mesh(&mesh.as_ref(), &options, &mut buffer).expect("encoding a valid mesh");
    buffer
}

/// Decodes a mesh from memory.
pub fn decode(buffer: &[u8]) -> Mesh {
    read_mesh(&mut std::io::Cursor::new(buffer)).expect("decoding a valid file")
}

/// The positions of a triangle's corners, rotated so the smallest corner comes first. Keyed on
/// bit patterns, this is order-insensitive but value-exact.
fn triangle_corners(mesh: &Mesh, triangle: usize) -> [[u32; 3]; 3] {
    let mut corners = [[0u32; 3]; 3];
    for (slot, &index) in mesh.indices[triangle * 3..triangle * 3 + 3].iter().enumerate() {
        let at = index as usize * 3;
        for axis in 0..3 {
            corners[slot][axis] = mesh.vertices[at + axis].to_bits();
        }
    }
    let smallest = (0..3).min_by_key(|&slot| corners[slot]).unwrap();
    corners.rotate_left(smallest);
    corners
}

/// Asserts two meshes describe the same triangle set by position, ignoring ordering.
pub fn assert_same_topology(a: &Mesh, b: &Mesh) {
    assert_eq!(a.triangle_count(), b.triangle_count());
    let mut lhs: Vec<_> = (0..a.triangle_count() as usize).map(|t| triangle_corners(a, t)).collect();
    let mut rhs: Vec<_> = (0..b.triangle_count() as usize).map(|t| triangle_corners(b, t)).collect();
    lhs.sort_unstable();
    rhs.sort_unstable();
    assert_eq!(lhs, rhs);
}

/// The largest absolute difference between two equally long float slices.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
}
