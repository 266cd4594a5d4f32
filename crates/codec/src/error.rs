use thiserror::Error;

/// Why a stream could not be decoded (or encoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed stream at offset {offset}: {kind}")]
    MalformedStream { offset: usize, kind: MalformedKind },

    #[error("destination holds {capacity} bytes but the stream decodes to {needed}")]
    DestinationTooSmall { needed: usize, capacity: usize },

    #[error("input length {len} is not a multiple of 4")]
    UnalignedInput { len: usize },

    #[error("chunk length {chunk_len} cannot hold a single group")]
    ChunkTooShort { chunk_len: usize },
}

/// Shape violations found while scanning a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("symbol {0:#04x} is outside the alphabet")]
    InvalidSymbol(u8),

    #[error("group is cut short")]
    TruncatedGroup,

    #[error("group value does not fit in 32 bits")]
    GroupOverflow,

    #[error("stream ends without the `]` sentinel")]
    MissingSentinel,
}

pub type Result<T> = core::result::Result<T, CodecError>;

pub(crate) fn malformed(offset: usize, kind: MalformedKind) -> CodecError {
    CodecError::MalformedStream { offset, kind }
}
