//! Host executable: boots the image embedded at build time.

mod image;

use bootloader::{BootImage, Bootloader};

fn main() {
    let image = BootImage {
        stub: image::STUB,
        payload: image::PAYLOAD,
        entry: image::ENTRY_OFFSET,
    };
    // SAFETY: the stub image is produced for this target alongside the host
    // build and follows the stub calling convention.
    unsafe { Bootloader::new().boot(&image) }
}
