#![no_std]
//! Handoff ABI shared between the host loader and the stage-2 stub.
//!
//! Kept free of `std` so a Rust-written stub can depend on it and agree on
//! the service table layout without linking the host runtime.

pub mod boot;
pub use boot::{EntryOffset, StubEntry, EXIT_LOADER_INIT_FAILED};

pub mod service;
pub use service::ServiceTable;
