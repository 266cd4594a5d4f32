use core::cmp;
use core::ffi::c_void;
use core::mem::ManuallyDrop;

use codec::{decode, decode_in_place, decoded_len, DECODE_TABLE};
use tracing::{debug, error, info};
use types::{EntryOffset, ServiceTable};

use crate::error::{BootStage, ImageKind, LoaderError, Result};
use crate::memory::{ExecAllocator, ExecRegion, OsPages};
use crate::services;

/// Default size of the stub region, one page on common hosts.
const DEFAULT_STUB_REGION_BYTES: usize = 0x1000;

/// How many decoded stub bytes are traced at debug level.
const STUB_TRACE_BYTES: usize = 16;

/// Boot configuration options consumed by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Print a one-line diagnostic to stderr when boot fails.
    pub debug_console: bool,
    /// Minimum size of the stub's executable region. Grown to fit the
    /// decoded stub and rounded up to whole pages.
    pub stub_region_bytes: usize,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            debug_console: true,
            stub_region_bytes: DEFAULT_STUB_REGION_BYTES,
        }
    }
}

/// The encoded images baked into the host at build time.
#[derive(Debug, Clone, Copy)]
pub struct BootImage<'a> {
    /// Radix-85 text of the stage-2 stub.
    pub stub: &'a [u8],
    /// Radix-85 text of the main payload.
    pub payload: &'a [u8],
    pub entry: EntryOffset,
}

/// Bootloader that decodes the embedded images and hands control to the stub.
#[derive(Debug)]
pub struct Bootloader {
    pub config: BootConfig,
    pages: Box<dyn ExecAllocator>,
}

impl Default for Bootloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootloader {
    pub fn new() -> Self {
        Self::with_allocator(Box::new(OsPages))
    }

    /// Loader drawing its executable region from `pages`.
    pub fn with_allocator(pages: Box<dyn ExecAllocator>) -> Self {
        Self {
            config: BootConfig::default(),
            pages,
        }
    }

    pub fn with_config(mut self, config: BootConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the whole boot sequence and never returns.
    ///
    /// On success control passes to the stub for good. Any failure before
    /// that point terminates the process with
    /// [`types::EXIT_LOADER_INIT_FAILED`]; nothing derived from a failed step
    /// is ever called.
    ///
    /// # Safety
    /// `image.stub` must decode to machine code for this target that follows
    /// the [`types::StubEntry`] convention.
    pub unsafe fn boot(self, image: &BootImage<'_>) -> ! {
        let services = services::install();
        debug!(table = ?services.as_ptr(), "service table built");
        match self.stage(services, image) {
            // SAFETY: forwarded from the caller.
            Ok(staged) => unsafe { staged.launch() },
            Err(err) => self.fail(services, err),
        }
    }

    /// Decodes both images and prepares the handoff without running anything.
    ///
    /// The stub text is validated in full before any executable memory is
    /// requested, so a corrupt image never reaches an executable page.
    pub fn stage(&self, services: &'static ServiceTable, image: &BootImage<'_>) -> Result<StagedImage> {
        let stub_len = decoded_len(&DECODE_TABLE, image.stub).map_err(|source| {
            LoaderError::init_failed(
                BootStage::StubDecode,
                LoaderError::MalformedStream {
                    image: ImageKind::Stub,
                    source,
                },
            )
        })?;

        let region_len = cmp::max(self.config.stub_region_bytes, stub_len);
        let mut stub = self
            .pages
            .alloc_exec(region_len)
            .map_err(|err| LoaderError::init_failed(BootStage::StubRegion, err))?;
        info!(region = ?stub, "stub region mapped");

        decode(&DECODE_TABLE, stub.as_mut_slice(), image.stub).map_err(|source| {
            LoaderError::init_failed(
                BootStage::StubDecode,
                LoaderError::MalformedStream {
                    image: ImageKind::Stub,
                    source,
                },
            )
        })?;
        debug!(
            len = stub_len,
            head = %hex::encode(&stub.as_slice()[..cmp::min(stub_len, STUB_TRACE_BYTES)]),
            "stub decoded"
        );

        let (payload, payload_len) = decode_payload(image.payload)?;
        info!(len = payload_len, buffer = payload.len(), "payload decoded");

        Ok(StagedImage {
            services,
            stub,
            stub_len,
            payload,
            payload_len,
            entry: image.entry,
        })
    }

    fn fail(&self, services: &ServiceTable, err: LoaderError) -> ! {
        error!(error = %err, "boot failed before handoff");
        if self.config.debug_console {
            let line = format!("loader: {err}\n");
            // Best effort: the result is ignored because there is nothing
            // left to report a failed diagnostic to.
            // SAFETY: `line` is valid for `line.len()` bytes.
            unsafe { (services.write_stdio)(2, line.as_ptr(), line.len()) };
        }
        (services.exit)(err.exit_status() as usize)
    }
}

/// Copies the payload text into a buffer of exactly its length and decodes it
/// in place.
///
/// The whole buffer is handed to the stub, so the bytes past the decoded
/// prefix stay available to it as scratch space.
fn decode_payload(text: &[u8]) -> Result<(Box<[u8]>, usize)> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(text.len()).map_err(|_| {
        LoaderError::init_failed(
            BootStage::PayloadBuffer,
            LoaderError::AllocationFailure { size: text.len() },
        )
    })?;
    buf.extend_from_slice(text);

    let len = decode_in_place(&DECODE_TABLE, &mut buf).map_err(|source| {
        LoaderError::init_failed(
            BootStage::PayloadDecode,
            LoaderError::MalformedStream {
                image: ImageKind::Payload,
                source,
            },
        )
    })?;
    Ok((buf.into_boxed_slice(), len))
}

/// Everything the stub needs, decoded and in place, not yet running.
///
/// Dropping it unmaps the stub region and frees the payload buffer.
#[derive(Debug)]
pub struct StagedImage {
    services: &'static ServiceTable,
    stub: ExecRegion,
    stub_len: usize,
    payload: Box<[u8]>,
    payload_len: usize,
    entry: EntryOffset,
}

impl StagedImage {
    pub fn services(&self) -> &'static ServiceTable {
        self.services
    }

    /// Decoded stub bytes at the start of the executable region.
    pub fn stub(&self) -> &[u8] {
        &self.stub.as_slice()[..self.stub_len]
    }

    pub fn stub_region(&self) -> &ExecRegion {
        &self.stub
    }

    /// Decoded payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len]
    }

    /// Full payload buffer handed to the stub, decoded prefix included.
    pub fn payload_buffer_len(&self) -> usize {
        self.payload.len()
    }

    pub fn entry(&self) -> EntryOffset {
        self.entry
    }

    /// Calls the stub and returns whatever it returns.
    ///
    /// # Safety
    /// The decoded stub must be machine code for this target that follows
    /// the [`types::StubEntry`] convention.
    pub unsafe fn invoke(&mut self) -> *mut c_void {
        // SAFETY: forwarded from the caller.
        unsafe {
            let entry = self.stub.entry();
            entry(self.services.as_ptr(), self.payload.as_mut_ptr(), self.entry.get())
        }
    }

    /// Hands control to the stub for good.
    ///
    /// The stub region and the payload buffer are never released after this
    /// point. A stub is not expected to return; if it does, the process exits
    /// with status 0.
    ///
    /// # Safety
    /// Same contract as [`StagedImage::invoke`].
    pub unsafe fn launch(self) -> ! {
        info!(entry = self.entry.get(), "handing off to stub");
        let mut staged = ManuallyDrop::new(self);
        // SAFETY: forwarded from the caller.
        unsafe { staged.invoke() };
        (staged.services.exit)(0)
    }
}
