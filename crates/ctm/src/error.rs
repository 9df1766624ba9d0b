//! Error conditions shared by every stage of the codec.
//!
//! Each failure belongs to one of the coarse [`ErrorKind`] categories the classic OpenCTM API
//! reports through its sticky error slot; [`Error`] keeps the precise cause for diagnostics and
//! [`Error::kind`] collapses it for the [`context`](crate::context) layer.

use snafu::prelude::*;

/// Error conditions for when encoding/decoding CTM meshes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Thrown when a caller-supplied value is outside its legal range.
    #[snafu(display("Invalid argument: {reason}!"))]
    InvalidArgument { reason: &'static str },
    /// Thrown when an operation is not allowed in the current context state.
    #[snafu(display("Operation not allowed: {reason}!"))]
    InvalidOperation { reason: &'static str },
    /// Thrown when mesh data breaks a mesh invariant (counts, index range, non-finite floats).
    #[snafu(display("Invalid mesh: {reason}!"))]
    InvalidMesh { reason: &'static str },
    /// Thrown when a count in the file would require an unreasonable allocation.
    #[snafu(display("Allocation limit exceeded!"))]
    OutOfMemory,
    /// Thrown when the underlying stream fails for a reason other than truncation.
    #[snafu(display("File I/O failed"))]
    File { source: std::io::Error },
    /// Thrown if the file does not start with the `"OCTM"` magic.
    #[snafu(display("Invalid magic! Expected {:?}.", crate::header::MAGIC.to_le_bytes()))]
    BadMagic { found: u32 },
    /// Thrown if the format version is not the one this crate understands.
    #[snafu(display("Unsupported format version {found}!"))]
    BadVersion { found: u32 },
    /// Thrown if the method tag is not RAW, MG1 or MG2.
    #[snafu(display("Unknown compression method tag {found:#010X}!"))]
    BadMethod { found: u32 },
    /// Thrown if a section opens with a different tag than the header demands.
    #[snafu(display("Unexpected section tag {found:#010X}, expected {expected:#010X}!"))]
    SectionTag { expected: u32, found: u32 },
    /// Thrown if the stream ends in the middle of a structured value.
    #[snafu(display("Truncated stream!"))]
    Truncated,
    /// Thrown if an embedded string is not valid UTF-8.
    #[snafu(display("Invalid UTF-8 string!"))]
    InvalidString,
    /// Thrown if an embedded string declares a length beyond the format limit.
    #[snafu(display("String length {length} exceeds the format limit!"))]
    StringTooLong { length: u32 },
    /// Catch-all for values that disagree with the container layout.
    #[snafu(display("Format error: {reason}!"))]
    Format { reason: &'static str },
    /// Thrown when the LZMA block codec reports a failure.
    #[snafu(display("LZMA codec failed"))]
    Lzma { source: std::io::Error },
    /// Thrown when an LZMA block does not unpack to the expected byte count.
    #[snafu(display("LZMA block unpacked to {actual} bytes, expected {expected}!"))]
    LzmaLength { expected: usize, actual: usize },
    /// Thrown on invariant violations that indicate a bug in this crate.
    #[snafu(display("Internal error: {reason}!"))]
    Internal { reason: &'static str },
}

pub type Result<T> = core::result::Result<T, Error>;

impl From<ctm_core::stream::Error> for Error {
    #[inline]
    fn from(error: ctm_core::stream::Error) -> Self {
        use ctm_core::stream::Error as Stream;
        match error {
            Stream::EndOfFile => Self::Truncated,
            Stream::InvalidUtf8 => Self::InvalidString,
            Stream::StringTooLong { length, .. } => Self::StringTooLong { length },
            Stream::Io { source } => Self::File { source },
            _ => Self::Internal { reason: "unhandled stream error" },
        }
    }
}

/// The coarse error categories of the classic OpenCTM API.
///
/// This is what the sticky error slot of [`Exporter`](crate::context::Exporter) and
/// [`Importer`](crate::context::Importer) records. The reference API also defines
/// `CTM_INVALID_CONTEXT` for null handles, which owned Rust values cannot express.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidArgument,
    InvalidOperation,
    InvalidMesh,
    OutOfMemory,
    File,
    Format,
    Lzma,
    Internal,
}

impl Error {
    /// Collapses this error into its sticky-slot category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            Self::InvalidMesh { .. } => ErrorKind::InvalidMesh,
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::File { .. } => ErrorKind::File,
            Self::BadMagic { .. }
            | Self::BadVersion { .. }
            | Self::BadMethod { .. }
            | Self::SectionTag { .. }
            | Self::Truncated
            | Self::InvalidString
            | Self::StringTooLong { .. }
            | Self::Format { .. } => ErrorKind::Format,
            Self::Lzma { .. } | Self::LzmaLength { .. } => ErrorKind::Lzma,
            _ => ErrorKind::Internal,
        }
    }
}
