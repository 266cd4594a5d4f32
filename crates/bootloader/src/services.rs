//! Host primitives exposed to the loaded program through the service table.
//!
//! Every `svc_*` function has a C signature because its caller is foreign
//! machine code, not Rust. None of them panic: failures are reported the way
//! the C library would, as null pointers or zero byte counts.

use core::ptr;
use core::slice;

use tracing::trace;
use types::ServiceTable;

use crate::memory::{heap, map_rwx};

/// Builds the table of host primitives.
///
/// Pure: calling it again yields an identical table. The loader calls it once
/// and keeps the result alive for the rest of the process.
pub fn build_service_table() -> ServiceTable {
    ServiceTable {
        image_base: ptr::null_mut(),
        alloc: svc_alloc,
        alloc_zeroed: svc_alloc_zeroed,
        dealloc: svc_dealloc,
        realloc: svc_realloc,
        exit: svc_exit,
        read_stdio: svc_read_stdio,
        write_stdio: svc_write_stdio,
        alloc_rwx: svc_alloc_rwx,
    }
}

/// Builds the table and pins it for the life of the process.
pub(crate) fn install() -> &'static ServiceTable {
    Box::leak(Box::new(build_service_table()))
}

pub extern "C" fn svc_alloc(size: usize) -> *mut u8 {
    heap::allocate(size, false)
}

pub extern "C" fn svc_alloc_zeroed(size: usize) -> *mut u8 {
    heap::allocate(size, true)
}

/// # Safety
/// `ptr` must be null or a live block from this table's allocation slots.
pub unsafe extern "C" fn svc_dealloc(ptr: *mut u8) {
    // SAFETY: upheld by the caller.
    unsafe { heap::release(ptr) }
}

/// # Safety
/// `ptr` must be null or a live block from this table's allocation slots.
pub unsafe extern "C" fn svc_realloc(ptr: *mut u8, size: usize) -> *mut u8 {
    // SAFETY: upheld by the caller.
    unsafe { heap::reallocate(ptr, size) }
}

pub extern "C" fn svc_exit(status: usize) -> ! {
    std::process::exit(status as i32)
}

/// # Safety
/// `buf` must be valid for `count` bytes of writes.
pub unsafe extern "C" fn svc_read_stdio(fd: usize, buf: *mut u8, count: usize) -> usize {
    let Some(descriptor) = StdioDescriptor::from_raw(fd) else {
        trace!(fd, "read from unsupported descriptor");
        return 0;
    };
    if buf.is_null() || count == 0 {
        return 0;
    }
    // SAFETY: upheld by the caller.
    let buf = unsafe { slice::from_raw_parts_mut(buf, count) };
    descriptor.read(buf)
}

/// # Safety
/// `buf` must be valid for `count` bytes of reads.
pub unsafe extern "C" fn svc_write_stdio(fd: usize, buf: *const u8, count: usize) -> usize {
    let Some(descriptor) = StdioDescriptor::from_raw(fd) else {
        trace!(fd, "write to unsupported descriptor");
        return 0;
    };
    if buf.is_null() || count == 0 {
        return 0;
    }
    // SAFETY: upheld by the caller.
    let buf = unsafe { slice::from_raw_parts(buf, count) };
    descriptor.write(buf)
}

/// Maps fresh read/write/execute pages. The mapping is never released.
pub extern "C" fn svc_alloc_rwx(size: usize) -> *mut u8 {
    match map_rwx(size) {
        Some((ptr, _)) => ptr.as_ptr(),
        None => ptr::null_mut(),
    }
}

/// The only descriptors the loaded program may touch.
///
/// Anything else is refused before any OS call is made, which keeps the
/// loaded program away from descriptors the host inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioDescriptor {
    Input,
    Output,
    Error,
}

impl StdioDescriptor {
    pub fn from_raw(fd: usize) -> Option<Self> {
        match fd {
            0 => Some(StdioDescriptor::Input),
            1 => Some(StdioDescriptor::Output),
            2 => Some(StdioDescriptor::Error),
            _ => None,
        }
    }

    /// Reads once. Returns the byte count, or 0 on end of input or error.
    pub fn read(self, buf: &mut [u8]) -> usize {
        os::read(self, buf)
    }

    /// Writes once, unbuffered. Returns the byte count, or 0 on error.
    pub fn write(self, buf: &[u8]) -> usize {
        os::write(self, buf)
    }
}

#[cfg(unix)]
mod os {
    use super::StdioDescriptor;

    fn raw_fd(descriptor: StdioDescriptor) -> libc::c_int {
        match descriptor {
            StdioDescriptor::Input => libc::STDIN_FILENO,
            StdioDescriptor::Output => libc::STDOUT_FILENO,
            StdioDescriptor::Error => libc::STDERR_FILENO,
        }
    }

    pub(super) fn read(descriptor: StdioDescriptor, buf: &mut [u8]) -> usize {
        // SAFETY: `buf` is a valid, exclusively borrowed buffer of `buf.len()` bytes.
        let n = unsafe { libc::read(raw_fd(descriptor), buf.as_mut_ptr().cast(), buf.len()) };
        usize::try_from(n).unwrap_or(0)
    }

    pub(super) fn write(descriptor: StdioDescriptor, buf: &[u8]) -> usize {
        // SAFETY: `buf` is a valid buffer of `buf.len()` bytes.
        let n = unsafe { libc::write(raw_fd(descriptor), buf.as_ptr().cast(), buf.len()) };
        usize::try_from(n).unwrap_or(0)
    }
}

#[cfg(windows)]
mod os {
    use core::ptr;

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::Storage::FileSystem::{ReadFile, WriteFile};
    use windows_sys::Win32::System::Console::{
        GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
    };

    use super::StdioDescriptor;

    /// The process's standard handle, or `None` when it has none attached.
    fn handle(descriptor: StdioDescriptor) -> Option<HANDLE> {
        let which = match descriptor {
            StdioDescriptor::Input => STD_INPUT_HANDLE,
            StdioDescriptor::Output => STD_OUTPUT_HANDLE,
            StdioDescriptor::Error => STD_ERROR_HANDLE,
        };
        // SAFETY: GetStdHandle has no memory-safety preconditions.
        let handle = unsafe { GetStdHandle(which) };
        (!handle.is_null() && handle != INVALID_HANDLE_VALUE).then_some(handle)
    }

    pub(super) fn read(descriptor: StdioDescriptor, buf: &mut [u8]) -> usize {
        let Some(handle) = handle(descriptor) else {
            return 0;
        };
        let count = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let mut done = 0u32;
        // SAFETY: `buf` is valid for `count` bytes of writes; no overlapped I/O.
        let ok = unsafe { ReadFile(handle, buf.as_mut_ptr(), count, &mut done, ptr::null_mut()) };
        if ok == 0 { 0 } else { done as usize }
    }

    pub(super) fn write(descriptor: StdioDescriptor, buf: &[u8]) -> usize {
        let Some(handle) = handle(descriptor) else {
            return 0;
        };
        let count = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let mut done = 0u32;
        // SAFETY: `buf` is valid for `count` bytes of reads; no overlapped I/O.
        let ok = unsafe { WriteFile(handle, buf.as_ptr(), count, &mut done, ptr::null_mut()) };
        if ok == 0 { 0 } else { done as usize }
    }
}

#[cfg(not(any(unix, windows)))]
mod os {
    use std::io::{self, Read, Write};

    use super::StdioDescriptor;

    pub(super) fn read(descriptor: StdioDescriptor, buf: &mut [u8]) -> usize {
        match descriptor {
            StdioDescriptor::Input => io::stdin().lock().read(buf).unwrap_or(0),
            StdioDescriptor::Output | StdioDescriptor::Error => 0,
        }
    }

    pub(super) fn write(descriptor: StdioDescriptor, buf: &[u8]) -> usize {
        fn write_through(mut out: impl Write, buf: &[u8]) -> usize {
            out.write(buf).and_then(|n| out.flush().map(|_| n)).unwrap_or(0)
        }
        match descriptor {
            StdioDescriptor::Input => 0,
            StdioDescriptor::Output => write_through(io::stdout().lock(), buf),
            StdioDescriptor::Error => write_through(io::stderr().lock(), buf),
        }
    }
}
