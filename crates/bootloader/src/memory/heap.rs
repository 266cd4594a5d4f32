//! `malloc`/`free` shaped wrappers over the global allocator.
//!
//! C-style callers free by pointer alone, while `std::alloc` needs the
//! block's layout back. Every block therefore carries a header in front of
//! the returned pointer recording the requested size. Blocks are aligned to
//! `BLOCK_ALIGN`, matching what `malloc` guarantees on 64-bit hosts.

use std::alloc::{self, Layout};
use std::ptr;

const BLOCK_ALIGN: usize = 16;
const HEADER: usize = BLOCK_ALIGN;

fn block_layout(size: usize) -> Option<Layout> {
    let total = size.checked_add(HEADER)?;
    Layout::from_size_align(total, BLOCK_ALIGN).ok()
}

/// Allocates `size` bytes, zeroed if asked. Null on failure.
pub(crate) fn allocate(size: usize, zeroed: bool) -> *mut u8 {
    let Some(layout) = block_layout(size) else {
        return ptr::null_mut();
    };
    // SAFETY: `layout` is never zero-sized because of the header.
    let base = unsafe {
        if zeroed {
            alloc::alloc_zeroed(layout)
        } else {
            alloc::alloc(layout)
        }
    };
    if base.is_null() {
        return ptr::null_mut();
    }
    // SAFETY: the block is at least `HEADER` bytes and aligned for usize.
    unsafe { finish_block(base, size) }
}

/// Frees a block from [`allocate`] or [`reallocate`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a live block returned by this module.
pub(crate) unsafe fn release(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: upheld by the caller.
    unsafe {
        let (base, layout) = block_header(ptr);
        alloc::dealloc(base, layout);
    }
}

/// Resizes a block, keeping its contents up to the smaller size.
///
/// A null `ptr` allocates; a zero `size` frees and returns null. On failure
/// null is returned and the old block stays valid.
///
/// # Safety
/// `ptr` must be null or a live block returned by this module.
pub(crate) unsafe fn reallocate(ptr: *mut u8, size: usize) -> *mut u8 {
    if ptr.is_null() {
        return allocate(size, false);
    }
    if size == 0 {
        // SAFETY: upheld by the caller.
        unsafe { release(ptr) };
        return ptr::null_mut();
    }
    let Some(new_layout) = block_layout(size) else {
        return ptr::null_mut();
    };
    // SAFETY: upheld by the caller; `new_layout` was validated above.
    unsafe {
        let (base, layout) = block_header(ptr);
        let grown = alloc::realloc(base, layout, new_layout.size());
        if grown.is_null() {
            return ptr::null_mut();
        }
        finish_block(grown, size)
    }
}

unsafe fn finish_block(base: *mut u8, size: usize) -> *mut u8 {
    // SAFETY: `base` starts a block of at least `HEADER` bytes.
    unsafe {
        base.cast::<usize>().write(size);
        base.add(HEADER)
    }
}

unsafe fn block_header(ptr: *mut u8) -> (*mut u8, Layout) {
    // SAFETY: the caller guarantees `ptr` came from `finish_block`, so the
    // header sits `HEADER` bytes before it and describes a valid layout.
    unsafe {
        let base = ptr.sub(HEADER);
        let size = base.cast::<usize>().read();
        (base, Layout::from_size_align_unchecked(size + HEADER, BLOCK_ALIGN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn recorded_size(ptr: *const u8) -> usize {
        unsafe { ptr.sub(HEADER).cast::<usize>().read() }
    }

    #[test]
    fn test_blocks_are_aligned_and_sized() {
        for size in [0usize, 1, 15, 16, 17, 4096] {
            let ptr = allocate(size, false);
            assert!(!ptr.is_null());
            assert_eq!(ptr as usize % BLOCK_ALIGN, 0);
            unsafe {
                assert_eq!(recorded_size(ptr), size);
                release(ptr);
            }
        }
    }

    #[test]
    fn test_zeroed_block() {
        let ptr = allocate(64, true);
        let bytes = unsafe { std::slice::from_raw_parts(ptr, 64) };
        assert!(bytes.iter().all(|b| *b == 0));
        unsafe { release(ptr) };
    }

    #[test]
    fn test_reallocate_keeps_prefix() {
        let ptr = allocate(8, false);
        unsafe {
            ptr.copy_from_nonoverlapping([1u8, 2, 3, 4, 5, 6, 7, 8].as_ptr(), 8);
            let grown = reallocate(ptr, 4096);
            assert!(!grown.is_null());
            assert_eq!(recorded_size(grown), 4096);
            assert_eq!(std::slice::from_raw_parts(grown, 8), &[1, 2, 3, 4, 5, 6, 7, 8]);

            let shrunk = reallocate(grown, 3);
            assert_eq!(recorded_size(shrunk), 3);
            assert_eq!(std::slice::from_raw_parts(shrunk, 3), &[1, 2, 3]);
            release(shrunk);
        }
    }

    #[test]
    fn test_reallocate_edge_cases() {
        unsafe {
            let fresh = reallocate(ptr::null_mut(), 32);
            assert!(!fresh.is_null());
            assert_eq!(recorded_size(fresh), 32);
            assert!(reallocate(fresh, 0).is_null());
            release(ptr::null_mut());
        }
    }

    #[test]
    fn test_impossible_sizes_fail_cleanly() {
        assert!(allocate(usize::MAX, false).is_null());
        assert!(allocate(usize::MAX - HEADER + 1, true).is_null());
        let ptr = allocate(8, false);
        unsafe {
            assert!(reallocate(ptr, usize::MAX).is_null());
            // The old block is still live after a failed resize.
            assert_eq!(recorded_size(ptr), 8);
            release(ptr);
        }
    }
}
