//! Byte-plane transposition applied to every array before LZMA.
//!
//! Treating the input as N four-byte little-endian words, [`interleave`] emits all the least
//! significant bytes first, then the next plane, and so on: `out[k * n + j] = in[j * 4 + k]`.
//! Deltas and quantized values mostly wiggle in their low bytes, so grouping planes hands LZMA
//! long runs of identical high bytes. [`deinterleave`] is the exact inverse.

/// Transposes `data` from word-major to byte-plane-major order.
///
/// `data.len()` must be a multiple of four.
pub(crate) fn interleave(data: &[u8]) -> Vec<u8> {
    debug_assert_eq!(data.len() % 4, 0);
    let n = data.len() / 4;
    let mut out = vec![0u8; data.len()];
    for j in 0..n {
        for k in 0..4 {
            out[k * n + j] = data[j * 4 + k];
        }
    }
    out
}

/// Transposes `data` from byte-plane-major order back to word-major order.
///
/// `data.len()` must be a multiple of four.
pub(crate) fn deinterleave(data: &[u8]) -> Vec<u8> {
    debug_assert_eq!(data.len() % 4, 0);
    let n = data.len() / 4;
    let mut out = vec![0u8; data.len()];
    for j in 0..n {
        for k in 0..4 {
            out[j * 4 + k] = data[k * n + j];
        }
    }
    out
}

/// Interleaves an array of words, going through their little-endian byte order.
pub(crate) fn interleave_words(words: &[u32]) -> Vec<u8> {
    let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
    interleave(&bytes)
}

/// Recovers an array of words from their interleaved little-endian bytes.
///
/// `data.len()` must be a multiple of four.
pub(crate) fn deinterleave_words(data: &[u8]) -> Vec<u32> {
    deinterleave(data)
        .chunks_exact(4)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}
