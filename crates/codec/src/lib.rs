#![no_std]
//! Radix-85 text codec for embedded program images.
//!
//! Every 4 raw bytes travel as 5 printable symbols drawn from an 85-symbol
//! alphabet; a stream ends at the first `]`. NUL bytes in front of a group
//! are inert padding, which lets an image be split into fixed-size,
//! NUL-padded chunks.
//!
//! Only decoding runs at load time. The encoder is the reference inverse used
//! by tests and image tooling.

extern crate alloc;

pub mod alphabet;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use alphabet::{ALPHABET, DECODE_TABLE, DecodeTable, GROUP_BYTES, GROUP_SYMBOLS, PAD, SENTINEL};
pub use decoder::{decode, decode_in_place, decoded_capacity, decoded_len};
pub use encoder::{encode, encode_chunked};
pub use error::{CodecError, MalformedKind, Result};
