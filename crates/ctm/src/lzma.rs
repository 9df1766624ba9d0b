//! The LZMA block adapter and the on-disk framing of compressed payloads.
//!
//! The codec treats LZMA as an opaque block transform: [`pack`] turns raw bytes into a
//! standalone `.lzma` stream (properties header included), [`unpack`] turns such a stream back
//! into exactly the byte count the caller expects. Every packed payload on disk is framed as a
//! `u32` packed length followed by that many bytes; [`write_packed`] and [`read_packed`] combine
//! the framing with the [byte interleaver](crate::interleave) that both MG1 and MG2 apply first.
//!
//! The preset only affects the encoder; any preset decodes identically.

use std::io::{Read, Write};

use ctm_core::prelude::*;
use lzma_rust2::{LzmaOptions, LzmaReader, LzmaWriter};
use snafu::prelude::*;

use crate::error::{Error, LzmaLengthSnafu, LzmaSnafu, Result};
use crate::interleave::{deinterleave_words, interleave_words};

/// Compression preset handed to the encoder, a midpoint between ratio and speed.
const PRESET: u32 = 5;

/// Upper bound on a single packed payload, matching the header's element count limit.
const MAX_PACKED: u32 = 1 << 30;

/// Compresses a raw byte block into a standalone `.lzma` stream.
///
/// # Errors
/// Returns [`Lzma`](Error::Lzma) if the codec reports a failure.
pub(crate) fn pack(raw: &[u8]) -> Result<Vec<u8>> {
    let options = LzmaOptions::with_preset(PRESET);
    let mut packed = Vec::new();
    let mut writer = LzmaWriter::new_use_header(&mut packed, &options, None).context(LzmaSnafu)?;
    writer.write_all(raw).context(LzmaSnafu)?;
    let _ = writer.finish().context(LzmaSnafu)?;
    Ok(packed)
}

/// Decompresses a `.lzma` stream, demanding exactly `expected` bytes back.
///
/// # Errors
/// Returns [`Lzma`](Error::Lzma) if the codec reports a failure, or
/// [`LzmaLength`](Error::LzmaLength) if the output size disagrees with `expected`.
pub(crate) fn unpack(blob: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut reader = LzmaReader::new_mem_limit(blob, u32::MAX, None).context(LzmaSnafu)?;
    let mut raw = Vec::with_capacity(expected);
    reader.read_to_end(&mut raw).context(LzmaSnafu)?;
    ensure!(raw.len() == expected, LzmaLengthSnafu { expected, actual: raw.len() });
    Ok(raw)
}

/// Interleaves, compresses and frames an array of words.
///
/// # Errors
/// Returns [`Lzma`](Error::Lzma) on codec failure or [`File`](Error::File) if the stream fails.
pub(crate) fn write_packed<W: Write>(writer: &mut W, words: &[u32]) -> Result<()> {
    let packed = pack(&interleave_words(words))?;
    let length = u32::try_from(packed.len())
        .ok()
        .filter(|&len| len <= MAX_PACKED)
        .ok_or(Error::Internal { reason: "packed payload exceeds the framing limit" })?;
    writer.write_u32(length)?;
    writer.write_all(&packed).map_err(|source| Error::File { source })?;
    Ok(())
}

/// Reads a framed payload and recovers exactly `count` words from it.
///
/// # Errors
/// Returns [`Truncated`](Error::Truncated) if the stream ends inside the frame,
/// [`OutOfMemory`](Error::OutOfMemory) for an absurd packed length, and the [`unpack`] errors.
pub(crate) fn read_packed<R: Read>(reader: &mut R, count: usize) -> Result<Vec<u32>> {
    let packed_length = reader.read_u32()?;
    ensure!(packed_length <= MAX_PACKED, crate::error::OutOfMemorySnafu);
    let blob = reader.read_bytes(packed_length as usize)?;
    let raw = unpack(&blob, count * 4)?;
    Ok(deinterleave_words(&raw))
}
