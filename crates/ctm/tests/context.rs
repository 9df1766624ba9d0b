//! The stateful import/export surface: state machine transitions and sticky error semantics.

mod common;

use std::io::Cursor;

use common::{quad, single_triangle};
use openctm::prelude::*;

const QUAD_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

#[test]
fn add_map_before_define_mesh_is_rejected() {
    let mut exporter = Exporter::new();
    let result = exporter.add_uv_map(&QUAD_UVS, "Pigment", None);
    assert!(matches!(result, Err(Error::InvalidOperation { .. })));

    // The failure is latched, reads once, and the context is still empty.
    assert_eq!(exporter.take_error(), Some(ErrorKind::InvalidOperation));
    assert_eq!(exporter.take_error(), None);

    let mut sink = Vec::new();
    assert!(matches!(
        exporter.save_to(&mut sink),
        Err(Error::InvalidOperation { .. })
    ));
}

#[test]
fn sticky_error_survives_later_successes() {
    let mesh = quad();
    let mut exporter = Exporter::new();

    assert!(exporter.set_vertex_precision(-1.0).is_err());
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();

    // The old failure is still latched despite the successful define.
    assert_eq!(exporter.take_error(), Some(ErrorKind::InvalidArgument));
    assert_eq!(exporter.take_error(), None);
}

#[test]
fn empty_map_name_is_an_invalid_argument() {
    let mesh = quad();
    let mut exporter = Exporter::new();
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();

    let result = exporter.add_uv_map(&QUAD_UVS, "", None);
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    assert_eq!(exporter.take_error(), Some(ErrorKind::InvalidArgument));
}

#[test]
fn duplicate_map_names_are_rejected() {
    let mesh = quad();
    let mut exporter = Exporter::new();
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();

    assert_eq!(exporter.add_uv_map(&QUAD_UVS, "Pigment", None).unwrap(), 0);
    assert!(exporter.add_uv_map(&QUAD_UVS, "Pigment", None).is_err());
}

#[test]
fn precision_setters_validate_their_arguments() {
    let mut exporter = Exporter::new();
    assert!(exporter.set_vertex_precision(0.0).is_err());
    assert!(exporter.set_normal_precision(f32::NAN).is_err());
    // No map added yet, so the per-map setter has nothing to configure.
    assert!(exporter.set_uv_precision(0, 0.001).is_err());
    assert_eq!(exporter.take_error(), Some(ErrorKind::InvalidArgument));
}

#[test]
fn export_import_through_memory() {
    let mesh = quad();
    let attribs: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();

    let mut exporter = Exporter::new();
    exporter.set_method(Method::Mg1);
    exporter.set_comment("quad");
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();
    exporter.add_uv_map(&QUAD_UVS, "Pigment", Some("pigment.png")).unwrap();
    exporter.add_attrib_map(&attribs, "Weights").unwrap();

    let mut buffer = Vec::new();
    exporter.save_to(&mut buffer).unwrap();

    let mut importer = Importer::new();
    importer.load_from(&mut Cursor::new(&buffer)).unwrap();
    assert_eq!(importer.vertex_count(), 4);
    assert_eq!(importer.triangle_count(), 2);
    assert!(!importer.has_normals());
    assert_eq!(importer.comment(), Some("quad"));
    assert_eq!(importer.named_uv_map("Pigment"), Some(0));
    assert_eq!(importer.uv_map(0).unwrap().file_name, "pigment.png");
    assert_eq!(importer.named_attrib_map("Weights"), Some(0));
    assert_eq!(importer.attrib_map(0).unwrap().values, attribs);
    assert_eq!(importer.vertices(), Some(mesh.vertices.as_slice()));
    assert_eq!(importer.indices(), Some(mesh.indices.as_slice()));
}

#[test]
fn maps_cannot_be_added_after_a_save() {
    let mesh = quad();
    let mut exporter = Exporter::new();
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();

    let mut buffer = Vec::new();
    exporter.save_to(&mut buffer).unwrap();
    assert!(matches!(
        exporter.add_uv_map(&QUAD_UVS, "Pigment", None),
        Err(Error::InvalidOperation { .. })
    ));

    // Redefining the mesh starts a new cycle, and saving again works.
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();
    exporter.add_uv_map(&QUAD_UVS, "Pigment", None).unwrap();
    let mut second = Vec::new();
    exporter.save_to(&mut second).unwrap();
    assert!(second.len() > buffer.len());
}

#[test]
fn failed_save_keeps_the_context_usable() {
    let mesh = single_triangle();
    // Mesh invariants are checked at save time; this index is out of range.
    let bad_indices = [0u32, 1, 3];
    let mut exporter = Exporter::new();
    exporter.define_mesh(&mesh.vertices, &bad_indices, None).unwrap();

    let mut buffer = Vec::new();
    assert!(matches!(
        exporter.save_to(&mut buffer),
        Err(Error::InvalidMesh { .. })
    ));
    assert_eq!(exporter.take_error(), Some(ErrorKind::InvalidMesh));

    // A corrected definition saves fine afterwards.
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();
    let mut buffer = Vec::new();
    exporter.save_to(&mut buffer).unwrap();
    assert!(exporter.take_error().is_none());
}

#[test]
fn failed_load_reverts_to_empty() {
    let buffer = common::encode(&quad(), Method::Mg1);
    let mut importer = Importer::new();
    importer.load_from(&mut Cursor::new(&buffer)).unwrap();
    assert_eq!(importer.vertex_count(), 4);

    let result = importer.load_from(&mut Cursor::new(b"not a ctm file at all"));
    assert!(result.is_err());
    assert!(importer.mesh().is_none());
    assert_eq!(importer.vertex_count(), 0);
    assert_eq!(importer.take_error(), Some(ErrorKind::Format));
}

#[test]
fn save_and_load_through_files() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("quad.ctm");
    let mesh = quad();

    let mut exporter = Exporter::new();
    exporter.set_method(Method::Mg2);
    exporter.set_vertex_precision(1.0 / 1024.0).unwrap();
    exporter.define_mesh(&mesh.vertices, &mesh.indices, None).unwrap();
    exporter.save_to_path(&path).unwrap();

    let mut importer = Importer::new();
    importer.load_from_path(&path).unwrap();
    assert_eq!(importer.vertex_count(), 4);
    assert_eq!(importer.triangle_count(), 2);

    // Quad corners land exactly on the quantization lattice.
    let mut got = importer.vertices().unwrap().to_vec();
    let mut want = mesh.vertices.clone();
    got.sort_by(f32::total_cmp);
    want.sort_by(f32::total_cmp);
    assert_eq!(got, want);
}

#[test]
fn missing_file_is_a_file_error() {
    let mut importer = Importer::new();
    let result = importer.load_from_path("/nonexistent/definitely/missing.ctm");
    assert!(result.is_err());
    assert_eq!(importer.take_error(), Some(ErrorKind::File));
}
