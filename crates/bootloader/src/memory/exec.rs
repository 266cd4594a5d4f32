use core::fmt;
use core::ptr::NonNull;
use core::slice;

use types::StubEntry;

use crate::error::{LoaderError, Result};

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Size of an OS page on this host.
pub fn page_size() -> usize {
    match os_page_size() {
        Some(size) if size.is_power_of_two() => size,
        _ => FALLBACK_PAGE_SIZE,
    }
}

#[cfg(unix)]
fn os_page_size() -> Option<usize> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).ok()
}

#[cfg(windows)]
fn os_page_size() -> Option<usize> {
    use core::mem::MaybeUninit;
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    let mut info = MaybeUninit::<SYSTEM_INFO>::uninit();
    // SAFETY: GetSystemInfo fills the whole struct and cannot fail.
    let info = unsafe {
        GetSystemInfo(info.as_mut_ptr());
        info.assume_init()
    };
    usize::try_from(info.dwPageSize).ok()
}

#[cfg(not(any(unix, windows)))]
fn os_page_size() -> Option<usize> {
    None
}

/// Rounds `len` up to whole pages. `None` on overflow.
pub fn round_to_pages(len: usize) -> Option<usize> {
    let mask = page_size() - 1;
    len.checked_add(mask).map(|end| end & !mask)
}

/// Maps `len` bytes (page rounded) of private anonymous memory that is
/// readable, writable and executable. Returns the mapping and its real length.
///
/// Uses `mmap` on unix and `VirtualAlloc` on Windows. Zero-length requests,
/// failed mappings and other hosts yield `None`.
pub fn map_rwx(len: usize) -> Option<(NonNull<u8>, usize)> {
    if len == 0 {
        return None;
    }
    let len = round_to_pages(len)?;
    os_map_rwx(len).map(|ptr| (ptr, len))
}

#[cfg(unix)]
fn os_map_rwx(len: usize) -> Option<NonNull<u8>> {
    // SAFETY: a fresh anonymous mapping aliases nothing.
    let addr = unsafe {
        libc::mmap(
            core::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if addr == libc::MAP_FAILED {
        return None;
    }
    NonNull::new(addr.cast::<u8>())
}

#[cfg(windows)]
fn os_map_rwx(len: usize) -> Option<NonNull<u8>> {
    use windows_sys::Win32::System::Memory::{
        VirtualAlloc, MEM_COMMIT, MEM_RESERVE, PAGE_EXECUTE_READWRITE,
    };

    // SAFETY: a fresh reservation at a system-chosen address aliases nothing.
    let addr = unsafe {
        VirtualAlloc(
            core::ptr::null(),
            len,
            MEM_COMMIT | MEM_RESERVE,
            PAGE_EXECUTE_READWRITE,
        )
    };
    NonNull::new(addr.cast::<u8>())
}

#[cfg(not(any(unix, windows)))]
fn os_map_rwx(_len: usize) -> Option<NonNull<u8>> {
    None
}

#[cfg(unix)]
unsafe fn os_unmap(ptr: NonNull<u8>, len: usize) {
    // SAFETY: caller passes a mapping created by `os_map_rwx` with its length.
    unsafe {
        libc::munmap(ptr.as_ptr().cast(), len);
    }
}

#[cfg(windows)]
unsafe fn os_unmap(ptr: NonNull<u8>, _len: usize) {
    use windows_sys::Win32::System::Memory::{VirtualFree, MEM_RELEASE};

    // SAFETY: caller passes the base of a reservation made by `os_map_rwx`;
    // MEM_RELEASE frees the whole reservation and requires a zero size.
    unsafe {
        VirtualFree(ptr.as_ptr().cast(), 0, MEM_RELEASE);
    }
}

#[cfg(not(any(unix, windows)))]
unsafe fn os_unmap(_ptr: NonNull<u8>, _len: usize) {}

/// An owned read/write/execute mapping.
///
/// The stub is decoded straight into it and then called through
/// [`ExecRegion::entry`]. Dropping the region unmaps it, so anything still
/// executing from it must keep the region alive.
pub struct ExecRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl ExecRegion {
    /// Maps a fresh region of at least `len` bytes.
    pub fn map(len: usize) -> Result<Self> {
        let (ptr, len) = map_rwx(len).ok_or(LoaderError::OutOfExecutableMemory { size: len })?;
        Ok(Self { ptr, len })
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the mapping is `len` bytes, readable, and owned by `self`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: the mapping is `len` bytes, writable, and borrowed uniquely.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Reinterprets the start of the region as the stub entry point.
    ///
    /// # Safety
    /// The region must hold machine code for this target that follows the
    /// [`StubEntry`] calling convention.
    pub unsafe fn entry(&self) -> StubEntry {
        // SAFETY: upheld by the caller; a data pointer and a fn pointer have
        // the same size on every supported target.
        unsafe { core::mem::transmute::<*mut u8, StubEntry>(self.ptr.as_ptr()) }
    }
}

impl fmt::Debug for ExecRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecRegion")
            .field("addr", &format_args!("{:#x}", self.ptr.as_ptr() as usize))
            .field("len", &format_args!("{:#x}", self.len))
            .finish()
    }
}

impl Drop for ExecRegion {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` describe the mapping created in `map`.
        unsafe { os_unmap(self.ptr, self.len) }
    }
}

/// Source of executable memory for the stub.
///
/// The sequencer only ever asks for one region; implementations other than
/// [`OsPages`] exist to exercise the failure path.
pub trait ExecAllocator: fmt::Debug {
    fn alloc_exec(&self, len: usize) -> Result<ExecRegion>;
}

/// Executable pages straight from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsPages;

impl ExecAllocator for OsPages {
    fn alloc_exec(&self, len: usize) -> Result<ExecRegion> {
        ExecRegion::map(len)
    }
}
