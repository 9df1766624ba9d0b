//! Convenient re-exports of commonly used data types, designed to make crate usage painless.
//!
//! The contents of this module can be used by including the following in any module:
//! ```
//! use openctm::prelude::*;
//! ```

#[doc(inline)]
pub use crate::container::{read_mesh, read_mesh_from_path, write_mesh, write_mesh_to_path};
pub use crate::context::{Exporter, Importer};
pub use crate::error::{Error, ErrorKind};
pub use crate::header::{Flags, Header, Method};
pub use crate::mesh::{AttribMap, AttribMapRef, Mesh, MeshRef, UvMap, UvMapRef, MAX_MAPS};
pub use crate::options::{EncodeOptions, VertexPrecision};
