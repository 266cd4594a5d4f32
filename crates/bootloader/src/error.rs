use core::fmt;

use codec::CodecError;
use thiserror::Error;
use types::EXIT_LOADER_INIT_FAILED;

/// Which embedded image a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Stub,
    Payload,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Stub => f.write_str("stub"),
            ImageKind::Payload => f.write_str("payload"),
        }
    }
}

/// Sequencer step that was running when boot failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    StubDecode,
    StubRegion,
    PayloadBuffer,
    PayloadDecode,
}

impl fmt::Display for BootStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            BootStage::StubDecode => "decoding the stub",
            BootStage::StubRegion => "mapping the stub region",
            BootStage::PayloadBuffer => "allocating the payload buffer",
            BootStage::PayloadDecode => "decoding the payload",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("heap allocation of {size} bytes failed")]
    AllocationFailure { size: usize },

    #[error("could not map {size} bytes of executable memory")]
    OutOfExecutableMemory { size: usize },

    #[error("malformed {image} image: {source}")]
    MalformedStream {
        image: ImageKind,
        #[source]
        source: CodecError,
    },

    #[error("loader initialisation failed while {stage}: {source}")]
    LoaderInitFailed {
        stage: BootStage,
        #[source]
        source: Box<LoaderError>,
    },
}

impl LoaderError {
    pub fn init_failed(stage: BootStage, source: LoaderError) -> Self {
        LoaderError::LoaderInitFailed {
            stage,
            source: Box::new(source),
        }
    }

    /// Stage the failure happened in, if it has been attributed to one.
    pub fn stage(&self) -> Option<BootStage> {
        match self {
            LoaderError::LoaderInitFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Process status reported for this failure.
    ///
    /// Every pre-handoff failure is fatal and shares the reserved status.
    pub fn exit_status(&self) -> i32 {
        EXIT_LOADER_INIT_FAILED
    }
}

pub type Result<T> = core::result::Result<T, LoaderError>;
