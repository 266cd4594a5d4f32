//! Boot-time handoff structures shared between the loader and the stub.

use core::ffi::c_void;

use crate::service::ServiceTable;

/// Exit status the loader reports when it fails before handing off control.
///
/// Chosen from the shell's "found but could not execute" range so it does not
/// collide with the ordinary `0`/`1` statuses a loaded program reports.
pub const EXIT_LOADER_INIT_FAILED: i32 = 126;

/// Byte offset inside the decoded payload where the real program starts.
///
/// The loader never interprets it; it is forwarded to the stub verbatim.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryOffset(pub usize);

impl EntryOffset {
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for EntryOffset {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

/// Signature of the decoded stage-2 stub.
///
/// Arguments are the service table, the decoded payload buffer and the entry
/// offset. The returned pointer is ignored; in practice the stub never
/// returns.
pub type StubEntry =
    unsafe extern "C" fn(services: *const ServiceTable, payload: *mut u8, entry: usize) -> *mut c_void;
