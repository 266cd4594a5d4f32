//! Two-stage bootstrap loader for radix-85 embedded program images.
//!
//! This crate provides a bootloader that:
//! - builds the service table loaded code calls back into,
//! - decodes a stage-2 stub into fresh executable pages,
//! - decodes the main payload in place,
//! - hands the stub the table, the payload and the entry offset.
//!
//! It performs no symbol resolution and no relocation; that is the stub's job.

pub mod bootloader;

pub mod error;

pub mod memory;

pub mod services;

pub use bootloader::{BootConfig, BootImage, Bootloader, StagedImage};
pub use error::{BootStage, ImageKind, LoaderError, Result};
pub use services::{build_service_table, StdioDescriptor};
