//! This crate is used as a utilities library for common functionality across
//! [OpenCTM](https://crates.io/crates/openctm) crates.
//!
//! The CTM container is little-endian throughout, and every structured value in it is either a
//! fixed-width word or a length-prefixed UTF-8 string. [`stream`] provides those primitives as
//! extension traits over [`std::io::Read`] and [`std::io::Write`].

pub mod prelude;

pub mod stream;
