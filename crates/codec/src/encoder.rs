//! Reference encoder, the exact inverse of [`crate::decoder`].
//!
//! The loader never encodes; this exists for tests and for tools that need
//! to produce an image the loader accepts.

use alloc::vec::Vec;

use crate::alphabet::{ALPHABET, GROUP_BYTES, GROUP_SYMBOLS, PAD, SENTINEL};
use crate::error::{CodecError, Result};

/// Encodes `bytes` and appends the sentinel.
///
/// `bytes.len()` must be a multiple of 4.
pub fn encode(bytes: &[u8]) -> Result<Vec<u8>> {
    check_aligned(bytes)?;
    let mut out = Vec::with_capacity(bytes.len() / GROUP_BYTES * GROUP_SYMBOLS + 1);
    for word in bytes.chunks_exact(GROUP_BYTES) {
        push_group(&mut out, word);
    }
    out.push(SENTINEL);
    Ok(out)
}

/// Encodes `bytes` as a run of `chunk_len`-symbol chunks.
///
/// Groups never straddle a chunk boundary; each chunk is filled with whole
/// groups and NUL-padded to `chunk_len`. The sentinel follows the last chunk.
/// This is the layout of an image split across fixed-size string literals.
pub fn encode_chunked(bytes: &[u8], chunk_len: usize) -> Result<Vec<u8>> {
    check_aligned(bytes)?;
    let groups_per_chunk = chunk_len / GROUP_SYMBOLS;
    if groups_per_chunk == 0 {
        return Err(CodecError::ChunkTooShort { chunk_len });
    }

    let mut out = Vec::new();
    for chunk in bytes.chunks(groups_per_chunk * GROUP_BYTES) {
        let start = out.len();
        for word in chunk.chunks_exact(GROUP_BYTES) {
            push_group(&mut out, word);
        }
        out.resize(start + chunk_len, PAD);
    }
    out.push(SENTINEL);
    Ok(out)
}

fn check_aligned(bytes: &[u8]) -> Result<()> {
    if bytes.len() % GROUP_BYTES != 0 {
        return Err(CodecError::UnalignedInput { len: bytes.len() });
    }
    Ok(())
}

fn push_group(out: &mut Vec<u8>, word: &[u8]) {
    let mut value = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    let mut symbols = [0u8; GROUP_SYMBOLS];
    for slot in symbols.iter_mut().rev() {
        *slot = ALPHABET[(value % 85) as usize];
        value /= 85;
    }
    out.extend_from_slice(&symbols);
}
