//! Memory the loader hands out: executable pages and the C-shaped heap.

mod exec;
pub(crate) mod heap;

pub use exec::{map_rwx, page_size, round_to_pages, ExecAllocator, ExecRegion, OsPages};
