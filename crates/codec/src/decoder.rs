//! Radix-85 decoding.
//!
//! STREAM SHAPE:
//! ```text
//! [NUL*] group [NUL*] group ... [NUL*] ']' <ignored>
//! group = 5 alphabet symbols, most significant digit first
//! ```
//!
//! Each group accumulates `value = value * 85 + digit` into a 32-bit word.
//! The word is then byte-swapped and stored in little-endian layout, so the
//! first output byte is the word's most significant byte on every host. The
//! swap is written out explicitly instead of relying on native byte order.
//!
//! Every entry point validates as it goes: a symbol outside the alphabet, a
//! group cut short by the sentinel or the end of input, a group above
//! `u32::MAX`, or a missing sentinel is reported as
//! [`CodecError::MalformedStream`] with the byte offset of the problem.

use crate::alphabet::{DecodeTable, GROUP_BYTES, GROUP_SYMBOLS, PAD, SENTINEL};
use crate::error::{malformed, CodecError, MalformedKind, Result};

const RADIX: u64 = 85;

/// Decodes `src` into `dst` and returns the number of bytes written.
///
/// Stops at the first sentinel; anything after it is never read. `dst` must
/// hold at least [`decoded_len`] bytes, otherwise
/// [`CodecError::DestinationTooSmall`] is returned. On error the contents of
/// `dst` are unspecified.
pub fn decode(table: &DecodeTable, dst: &mut [u8], src: &[u8]) -> Result<usize> {
    let capacity = dst.len();
    let mut read = 0;
    let mut written = 0;
    while let Some(word) = next_group(table, src, &mut read)? {
        let Some(out) = dst.get_mut(written..written + GROUP_BYTES) else {
            return Err(CodecError::DestinationTooSmall {
                needed: decoded_len(table, src).unwrap_or(written + GROUP_BYTES),
                capacity,
            });
        };
        out.copy_from_slice(&word_bytes(word));
        written += GROUP_BYTES;
    }
    Ok(written)
}

/// Decodes the stream held in `buf` over itself and returns the decoded length.
///
/// Each 5-symbol group shrinks to 4 bytes, so the write cursor always trails
/// the read cursor and no symbol is overwritten before it is consumed. The
/// decoded bytes occupy `buf[..len]`; the rest of `buf` is left as it was.
pub fn decode_in_place(table: &DecodeTable, buf: &mut [u8]) -> Result<usize> {
    let mut read = 0;
    let mut written = 0;
    while let Some(word) = next_group(table, buf, &mut read)? {
        debug_assert!(written + GROUP_BYTES <= read);
        buf[written..written + GROUP_BYTES].copy_from_slice(&word_bytes(word));
        written += GROUP_BYTES;
    }
    Ok(written)
}

/// Validates `src` without writing anything and returns its exact decoded length.
pub fn decoded_len(table: &DecodeTable, src: &[u8]) -> Result<usize> {
    let mut read = 0;
    let mut groups = 0;
    while next_group(table, src, &mut read)?.is_some() {
        groups += 1;
    }
    Ok(groups * GROUP_BYTES)
}

/// Upper bound on the decoded length of `src`, usable in constant context.
///
/// Counts the non-NUL bytes in front of the first sentinel (or the end of
/// input) and rounds down to whole groups. It performs no validation, so a
/// well-formed stream gets its exact length and a malformed one gets a bound
/// that [`decode`] will reject anyway.
pub const fn decoded_capacity(src: &[u8]) -> usize {
    let mut symbols = 0;
    let mut i = 0;
    while i < src.len() && src[i] != SENTINEL {
        if src[i] != PAD {
            symbols += 1;
        }
        i += 1;
    }
    symbols / GROUP_SYMBOLS * GROUP_BYTES
}

/// Skips padding and decodes the group at `*pos`.
///
/// Returns `Ok(None)` at the sentinel, leaving `*pos` on it.
fn next_group(table: &DecodeTable, src: &[u8], pos: &mut usize) -> Result<Option<u32>> {
    while src.get(*pos) == Some(&PAD) {
        *pos += 1;
    }
    match src.get(*pos) {
        None => return Err(malformed(*pos, MalformedKind::MissingSentinel)),
        Some(&SENTINEL) => return Ok(None),
        Some(_) => {}
    }

    let start = *pos;
    let Some(group) = src.get(start..start + GROUP_SYMBOLS) else {
        return Err(malformed(start, MalformedKind::TruncatedGroup));
    };

    let mut value: u64 = 0;
    for (i, &symbol) in group.iter().enumerate() {
        let digit = match table.digit(symbol) {
            Some(digit) => digit,
            None if symbol == SENTINEL => {
                return Err(malformed(start, MalformedKind::TruncatedGroup));
            }
            None => return Err(malformed(start + i, MalformedKind::InvalidSymbol(symbol))),
        };
        value = value * RADIX + u64::from(digit);
    }
    let word =
        u32::try_from(value).map_err(|_| malformed(start, MalformedKind::GroupOverflow))?;

    *pos = start + GROUP_SYMBOLS;
    Ok(Some(word))
}

/// Output layout of one group: the explicit swap, then little-endian storage.
#[inline]
fn word_bytes(word: u32) -> [u8; GROUP_BYTES] {
    word.swap_bytes().to_le_bytes()
}
