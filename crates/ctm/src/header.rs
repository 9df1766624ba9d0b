//! The fixed file header and the tags that frame everything after it.
//!
//! # Header
//! Every CTM file starts with the same little-endian layout:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x00 | Magic number | u8\[4\] | Unique identifier ("OCTM") to let us know we're reading a CTM file. |
//! | 0x04 | Version | u32 | Container format version, currently 5. |
//! | 0x08 | Method | u8\[4\] | Compression method tag: "RAW\0", "MG1\0" or "MG2\0". |
//! | 0x0C | Vertex count | u32 | Number of vertices, must be non-zero. |
//! | 0x10 | Triangle count | u32 | Number of triangles, must be non-zero. |
//! | 0x14 | UV map count | u32 | Number of texture coordinate maps (0 to 8). |
//! | 0x18 | Attribute map count | u32 | Number of custom attribute maps (0 to 8). |
//! | 0x1C | Flags | u32 | Bit 0 set means a normal array is present. |
//! | 0x20 | Comment | string | u32 byte length followed by UTF-8 data, no terminator. |
//!
//! The header is followed by one section per array, each introduced by a four-byte tag:
//! [`INDX`](section::INDX), [`VERT`](section::VERT), [`NORM`](section::NORM) (only with the
//! normal flag), then [`TEXC`](section::TEXC) and [`ATTR`](section::ATTR) repeated per map.

use bitflags::bitflags;
use ctm_core::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use snafu::prelude::*;

use crate::error::{
    BadMagicSnafu, BadVersionSnafu, Error, FormatSnafu, OutOfMemorySnafu, Result, SectionTagSnafu,
};
use crate::mesh::MAX_MAPS;

/// Unique identifier that tells us if we're reading a CTM file, "OCTM" as a little-endian word.
pub const MAGIC: u32 = u32::from_le_bytes(*b"OCTM");

/// The container format version this crate reads and writes.
///
/// The reference implementation shipped an API macro claiming 0x04 while writing 5 on disk; the
/// on-disk value is what interop requires, so that is the one modeled here.
pub const FORMAT_VERSION: u32 = 5;

/// Byte length limit for embedded strings (comments, map names, file names).
pub(crate) const MAX_STRING: u32 = 0x0010_0000;

/// Element count limit for the header, high enough for any real mesh while keeping a hostile
/// header from demanding a multi-gigabyte allocation up front.
pub(crate) const MAX_COUNT: u32 = 1 << 28;

/// Section tags, each the `u32` holding the tag's four ASCII bytes in little-endian order.
pub mod section {
    /// Triangle indices.
    pub const INDX: u32 = u32::from_le_bytes(*b"INDX");
    /// Vertex positions.
    pub const VERT: u32 = u32::from_le_bytes(*b"VERT");
    /// Per-vertex normals.
    pub const NORM: u32 = u32::from_le_bytes(*b"NORM");
    /// One texture coordinate map.
    pub const TEXC: u32 = u32::from_le_bytes(*b"TEXC");
    /// One custom attribute map.
    pub const ATTR: u32 = u32::from_le_bytes(*b"ATTR");
}

/// All supported compression methods, with their on-disk tag values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Method {
    /// Arrays stored as plain little-endian words, no transformation.
    Raw = u32::from_le_bytes(*b"RAW\0"),
    /// Lossless: reindexing and delta prediction over the exact 32-bit values.
    #[default]
    Mg1 = u32::from_le_bytes(*b"MG1\0"),
    /// Fixed-point: MG1's scaffolding plus per-stream quantization.
    Mg2 = u32::from_le_bytes(*b"MG2\0"),
}

bitflags! {
    /// Feature bits stored in the header flag word.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// The file carries a per-vertex normal array.
        const HAS_NORMALS = 1 << 0;
    }
}

/// The decoded fixed header. See the module [header](self#header) for more information.
#[derive(Clone, Debug)]
pub struct Header {
    pub method: Method,
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub uv_map_count: u32,
    pub attrib_map_count: u32,
    pub flags: Flags,
    pub comment: String,
}

impl Header {
    /// Reads and validates a header from the stream.
    ///
    /// # Errors
    /// Returns [`BadMagic`](Error::BadMagic), [`BadVersion`](Error::BadVersion) or
    /// [`BadMethod`](Error::BadMethod) for an unrecognized prologue, [`Format`](Error::Format)
    /// for out-of-range counts, and [`OutOfMemory`](Error::OutOfMemory) for counts beyond the
    /// allocation limit.
    pub fn read_from<R: std::io::Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u32()?;
        ensure!(magic == MAGIC, BadMagicSnafu { found: magic });

        let version = reader.read_u32()?;
        ensure!(version == FORMAT_VERSION, BadVersionSnafu { found: version });

        let tag = reader.read_u32()?;
        let method = Method::try_from(tag).map_err(|_| Error::BadMethod { found: tag })?;

        let vertex_count = reader.read_u32()?;
        let triangle_count = reader.read_u32()?;
        let uv_map_count = reader.read_u32()?;
        let attrib_map_count = reader.read_u32()?;
        let flags = Flags::from_bits_truncate(reader.read_u32()?);
        let comment = reader.read_string(MAX_STRING)?;

        ensure!(vertex_count > 0, FormatSnafu { reason: "zero vertex count" });
        ensure!(triangle_count > 0, FormatSnafu { reason: "zero triangle count" });
        ensure!(
            vertex_count <= MAX_COUNT && triangle_count <= MAX_COUNT,
            OutOfMemorySnafu
        );
        ensure!(
            uv_map_count as usize <= MAX_MAPS && attrib_map_count as usize <= MAX_MAPS,
            FormatSnafu { reason: "map count exceeds the format limit" }
        );

        Ok(Self {
            method,
            vertex_count,
            triangle_count,
            uv_map_count,
            attrib_map_count,
            flags,
            comment,
        })
    }

    /// Writes the header to the stream.
    ///
    /// # Errors
    /// Returns [`File`](Error::File) if the underlying stream fails.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32(MAGIC)?;
        writer.write_u32(FORMAT_VERSION)?;
        writer.write_u32(self.method.into())?;
        writer.write_u32(self.vertex_count)?;
        writer.write_u32(self.triangle_count)?;
        writer.write_u32(self.uv_map_count)?;
        writer.write_u32(self.attrib_map_count)?;
        writer.write_u32(self.flags.bits())?;
        writer.write_string(&self.comment)?;
        Ok(())
    }
}

/// Reads a section tag and checks it against the one the header demands next.
///
/// # Errors
/// Returns [`SectionTag`](Error::SectionTag) on a mismatch.
pub(crate) fn expect_section<R: std::io::Read>(reader: &mut R, expected: u32) -> Result<()> {
    let found = reader.read_tag()?;
    ensure!(found == expected, SectionTagSnafu { expected, found });
    Ok(())
}
