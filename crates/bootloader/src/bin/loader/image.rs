//! Image constants baked in at build time. The packaging step replaces the
//! `.b85` files and `ENTRY_OFFSET` together.

use types::EntryOffset;

/// Sample x86-64 System V stub:
/// `mov rax, [rdi + 0x28]; xor edi, edi; jmp rax`, i.e. `exit(0)` through the
/// service table.
pub const STUB: &[u8] = include_bytes!("stub.b85");

/// Sample payload: `"hello, loader!\n\0"`.
pub const PAYLOAD: &[u8] = include_bytes!("payload.b85");

/// Forwarded to the stub untouched; only the stub knows what it points at.
pub const ENTRY_OFFSET: EntryOffset = EntryOffset::new(0);
