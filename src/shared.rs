//! Shared state block between the privileged worker and the presentation
//! layer.
//!
//! ```text
//!   worker ──(readings, applied duties)──▶ ┌──────────────────┐
//!                                          │ SharedStateBlock │
//!   presentation ──(exit, mode, target)──▶ └──────────────────┘
//! ```
//!
//! No locks. Every field is an atomic at its natural width and has exactly
//! one writer side:
//!
//! | Field              | Writer        |
//! |--------------------|---------------|
//! | readings, samples  | worker        |
//! | manual_applied     | worker        |
//! | auto_duty          | worker        |
//! | exit, mode, target | presentation  |
//!
//! A [`StateSnapshot`] can be torn across fields (temperature from one
//! cycle, duty from the next). Consumers are advisory only.
//!
//! The block lives in a memory mapping: a file under `/dev/shm` when the
//! presentation layer runs in another process, or an anonymous mapping when
//! both sides are threads of one process.
//!
//! The file is created mode `0666` regardless of umask so an unprivileged
//! presentation layer can attach read-write. Anything in the block may
//! therefore be written by any local user; the worker re-validates every
//! manual target before it reaches the EC.

use core::ops::Deref;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::fs::OpenOptions;
use std::path::Path;

use log::info;
use memmap2::{MmapMut, MmapOptions};

use crate::app::commands::FanCommand;
use crate::ec::ReadingSet;
use crate::error::{Error, Result};

/// Default location of the cross-process block.
pub const SHM_PATH: &str = "/dev/shm/ecfan";

/// Permission bits of the cross-process block file.
pub const SHM_MODE: u32 = 0o666;

const GPU_ABSENT: u16 = u16::MAX;

/// Whether the auto-duty policy or a manual request drives the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlMode {
    /// Zero so a freshly mapped block starts in automatic control.
    Auto = 0,
    Manual = 1,
}

impl ControlMode {
    fn from_u8(raw: u8) -> Self {
        if raw == Self::Manual as u8 {
            Self::Manual
        } else {
            Self::Auto
        }
    }
}

/// Fixed-layout block. All-zero bytes are a valid initial state.
#[repr(C)]
#[derive(Debug, Default)]
pub struct SharedStateBlock {
    // -- presentation → worker --
    exit: AtomicBool,
    mode: AtomicU8,
    /// Requested manual duty; 0 = nothing pending.
    manual_target: AtomicU8,

    // -- worker → presentation --
    /// Last manual duty the worker wrote; 0 = none.
    manual_applied: AtomicU8,
    /// Last duty the auto policy wrote; 0 = none.
    auto_duty: AtomicU8,
    cpu_temp: AtomicU8,
    gpu_temp: AtomicU16,
    fan_duty: AtomicU8,
    fan_rpm: AtomicU32,
    /// Completed samples; 0 means no reading has been published yet.
    samples: AtomicU64,
}

/// Point-in-time copy of the block, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub readings: Option<ReadingSet>,
    pub mode: ControlMode,
    pub manual_target: u8,
    pub auto_duty: u8,
    pub samples: u64,
    pub exit: bool,
}

impl SharedStateBlock {
    // ── Presentation side ─────────────────────────────────────

    /// Apply a pre-validated command.
    pub fn submit(&self, cmd: FanCommand) {
        match cmd {
            FanCommand::Auto => {
                self.mode.store(ControlMode::Auto as u8, Ordering::Release);
                self.manual_target.store(0, Ordering::Release);
            }
            FanCommand::Manual(duty) => {
                self.manual_target.store(duty.percent(), Ordering::Release);
                self.mode.store(ControlMode::Manual as u8, Ordering::Release);
            }
            FanCommand::Exit => self.request_exit(),
        }
    }

    /// Validate and submit a manual duty. Out-of-range values never reach
    /// the block.
    pub fn request_manual(&self, percent: u8) -> Result<()> {
        self.submit(FanCommand::manual(percent)?);
        Ok(())
    }

    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let samples = self.samples.load(Ordering::Acquire);
        let readings = (samples > 0).then(|| {
            let gpu = self.gpu_temp.load(Ordering::Relaxed);
            ReadingSet {
                cpu_temp: self.cpu_temp.load(Ordering::Relaxed),
                gpu_temp: (gpu != GPU_ABSENT).then_some(gpu as u8),
                fan_duty_percent: self.fan_duty.load(Ordering::Relaxed),
                fan_rpm: self.fan_rpm.load(Ordering::Relaxed),
            }
        });
        StateSnapshot {
            readings,
            mode: self.mode(),
            manual_target: self.manual_target(),
            auto_duty: self.auto_duty(),
            samples,
            exit: self.exit_requested(),
        }
    }

    // ── Worker side ───────────────────────────────────────────

    pub fn publish(&self, readings: &ReadingSet) {
        self.cpu_temp.store(readings.cpu_temp, Ordering::Relaxed);
        self.gpu_temp.store(
            readings.gpu_temp.map_or(GPU_ABSENT, u16::from),
            Ordering::Relaxed,
        );
        self.fan_duty.store(readings.fan_duty_percent, Ordering::Relaxed);
        self.fan_rpm.store(readings.fan_rpm, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Release);
    }

    pub fn set_manual_applied(&self, duty: u8) {
        self.manual_applied.store(duty, Ordering::Release);
    }

    pub fn set_auto_duty(&self, duty: u8) {
        self.auto_duty.store(duty, Ordering::Release);
    }

    // ── Readers (both sides) ──────────────────────────────────

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> ControlMode {
        ControlMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn manual_target(&self) -> u8 {
        self.manual_target.load(Ordering::Acquire)
    }

    pub fn manual_applied(&self) -> u8 {
        self.manual_applied.load(Ordering::Acquire)
    }

    pub fn auto_duty(&self) -> u8 {
        self.auto_duty.load(Ordering::Acquire)
    }
}

/// Owner of the mapping that holds a [`SharedStateBlock`].
///
/// Derefs to the block. Share it between threads with `Arc`.
pub struct SharedState {
    block: NonNull<SharedStateBlock>,
    _map: MmapMut,
}

// SAFETY: the mapping outlives `block`, and every access goes through the
// block's atomics.
unsafe impl Send for SharedState {}
unsafe impl Sync for SharedState {}

impl SharedState {
    /// In-process block backed by an anonymous mapping.
    pub fn anonymous() -> Result<Self> {
        let map = MmapOptions::new()
            .len(size_of::<SharedStateBlock>())
            .map_anon()
            .map_err(|_| Error::Init("anonymous shared mapping failed"))?;
        Ok(Self::from_map(map))
    }

    /// Create (or reset) a zeroed block at `path` for a peer process.
    pub fn create(path: &Path) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, SHM_MODE);
        let file = options
            .open(path)
            .map_err(|_| Error::Init("cannot create shared state file"))?;
        // The creation mode is masked by umask and ignored for an existing
        // file; set the bits explicitly.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(SHM_MODE))
                .map_err(|_| Error::Init("cannot set shared state file mode"))?;
        }
        file.set_len(size_of::<SharedStateBlock>() as u64)
            .map_err(|_| Error::Init("cannot size shared state file"))?;
        // SAFETY: the file was just truncated and sized by us; peers only
        // touch it through the same atomic layout.
        let map = unsafe { MmapMut::map_mut(&file) }
            .map_err(|_| Error::Init("cannot map shared state file"))?;
        info!("Shared state block at {}", path.display());
        Ok(Self::from_map(map))
    }

    /// Attach to a block created by [`SharedState::create`].
    pub fn attach(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|_| Error::Init("shared state file not found"))?;
        // SAFETY: as for `create`; the length is checked below.
        let map = unsafe { MmapMut::map_mut(&file) }
            .map_err(|_| Error::Init("cannot map shared state file"))?;
        if map.len() < size_of::<SharedStateBlock>() {
            return Err(Error::Init("shared state file too small"));
        }
        Ok(Self::from_map(map))
    }

    fn from_map(mut map: MmapMut) -> Self {
        // Mappings are page-aligned, which satisfies the block's alignment,
        // and zero-filled bytes are a valid block.
        let block = NonNull::from(&mut map[..]).cast::<SharedStateBlock>();
        Self { block, _map: map }
    }
}

impl Deref for SharedState {
    type Target = SharedStateBlock;

    fn deref(&self) -> &SharedStateBlock {
        // SAFETY: `block` points into `_map`, which lives as long as self.
        unsafe { self.block.as_ref() }
    }
}
