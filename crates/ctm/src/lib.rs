//! Adds support for the OpenCTM compressed triangle mesh format.
//!
//! A CTM file stores vertices, triangle indices, optional per-vertex normals, up to eight 2D
//! texture coordinate maps, up to eight 4-component custom attribute maps, and a free-form file
//! comment. Three compression methods share one container:
//!
//! * **RAW** — plain little-endian arrays, the bit-exact reference point.
//! * **MG1** — lossless: canonical reindexing, index delta prediction, byte interleaving and
//!   LZMA. Every 32-bit value survives exactly; the mesh comes back in canonical order.
//! * **MG2** — fixed-point: MG1's scaffolding plus per-stream quantization, a spatial vertex
//!   sort, per-vertex deltas and spherical normal residuals against a prediction both sides
//!   derive from the decoded geometry. Decoded values land within half a precision step.
//!
//! See [`header`] for the container layout. The format is little-endian throughout and is
//! processed whole-mesh in memory; there is no incremental streaming.
//!
//! # Usage
//! Whole meshes move through the free functions [`write_mesh`](container::write_mesh) and
//! [`read_mesh`](container::read_mesh) (or their `_path` variants). The [`context`] module
//! offers the classic stateful importer/exporter surface with a sticky error slot, which is the
//! closest match when porting code written against the original C API.

// All public modules
pub mod container;
pub mod context;
pub mod error;
pub mod header;
pub mod mesh;
pub mod options;

// The compression pipeline, internal to the codec
mod interleave;
mod lzma;
mod mg1;
mod mg2;
mod normal;
mod quant;
mod raw;
mod reindex;

// Prelude, for convenience
pub mod prelude;
