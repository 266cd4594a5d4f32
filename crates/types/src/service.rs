//! Service table layout handed to the stage-2 stub.
//!
//! The stub links against nothing, so every OS primitive it needs reaches it
//! through this table. The layout is `#[repr(C)]`: one data pointer followed
//! by eight function pointers, in the order below. Changing the order breaks
//! every stub ever built.

use core::mem::{offset_of, size_of};

/// `malloc` shaped heap allocation. Null on failure.
pub type AllocFn = unsafe extern "C" fn(size: usize) -> *mut u8;
/// `calloc(1, size)` shaped zeroed allocation. Null on failure.
pub type AllocZeroedFn = unsafe extern "C" fn(size: usize) -> *mut u8;
/// `free` shaped deallocation. Null is a no-op.
pub type DeallocFn = unsafe extern "C" fn(ptr: *mut u8);
/// `realloc` shaped resize. Null on failure, the old block stays valid.
pub type ReallocFn = unsafe extern "C" fn(ptr: *mut u8, size: usize) -> *mut u8;
/// Terminates the process with `status`.
pub type ExitFn = extern "C" fn(status: usize) -> !;
/// Reads up to `count` bytes from descriptor 0, 1 or 2. Returns bytes read.
pub type ReadStdioFn = unsafe extern "C" fn(fd: usize, buf: *mut u8, count: usize) -> usize;
/// Writes up to `count` bytes to descriptor 0, 1 or 2. Returns bytes written.
pub type WriteStdioFn = unsafe extern "C" fn(fd: usize, buf: *const u8, count: usize) -> usize;
/// Maps `size` bytes (page rounded) readable, writable and executable.
pub type AllocRwxFn = unsafe extern "C" fn(size: usize) -> *mut u8;

/// Function-pointer table standing in for a dynamic linker.
///
/// Built once by the host, never mutated afterwards, and kept alive for the
/// rest of the process because the loaded program may call back into it at
/// any time, from any thread.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ServiceTable {
    /// Base address of the loaded image. The host leaves it null; the stub
    /// may record its relocation base here in its own copy.
    pub image_base: *mut u8,
    pub alloc: AllocFn,
    pub alloc_zeroed: AllocZeroedFn,
    pub dealloc: DeallocFn,
    pub realloc: ReallocFn,
    pub exit: ExitFn,
    pub read_stdio: ReadStdioFn,
    pub write_stdio: WriteStdioFn,
    pub alloc_rwx: AllocRwxFn,
}

// SAFETY: the table is immutable after construction and every slot points at
// a thread-safe host primitive. `image_base` is an address, never dereferenced
// by the host.
unsafe impl Send for ServiceTable {}
unsafe impl Sync for ServiceTable {}

impl ServiceTable {
    /// Number of function slots after `image_base`.
    pub const SLOT_COUNT: usize = 8;

    pub const OFFSET_IMAGE_BASE: usize = offset_of!(ServiceTable, image_base);
    pub const OFFSET_ALLOC: usize = offset_of!(ServiceTable, alloc);
    pub const OFFSET_ALLOC_ZEROED: usize = offset_of!(ServiceTable, alloc_zeroed);
    pub const OFFSET_DEALLOC: usize = offset_of!(ServiceTable, dealloc);
    pub const OFFSET_REALLOC: usize = offset_of!(ServiceTable, realloc);
    pub const OFFSET_EXIT: usize = offset_of!(ServiceTable, exit);
    pub const OFFSET_READ_STDIO: usize = offset_of!(ServiceTable, read_stdio);
    pub const OFFSET_WRITE_STDIO: usize = offset_of!(ServiceTable, write_stdio);
    pub const OFFSET_ALLOC_RWX: usize = offset_of!(ServiceTable, alloc_rwx);

    /// Total table size in bytes: one pointer per field, no padding.
    pub const SIZE: usize = size_of::<ServiceTable>();

    pub fn as_ptr(&self) -> *const ServiceTable {
        self as *const ServiceTable
    }
}
