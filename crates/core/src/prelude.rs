//! Convenient re-exports of commonly used data types, designed to make crate usage painless.
//!
//! For example, you can refer to [`ReadLe`], but you have to use [`stream::Error`].
//!
//! The contents of this module can be used by including the following in any module:
//! ```
//! use ctm_core::prelude::*;
//! ```

#[doc(inline)]
pub use crate::stream::{ReadLe, WriteLe};

/// Contains [`stream::Error`], which is used in Results returned by [`ReadLe`] and [`WriteLe`]
pub mod stream {
    pub use crate::stream::Error;
}
