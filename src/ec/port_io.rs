//! Raw x86 I/O port access for the two EC ports.
//!
//! `in`/`out` only work from user space once the kernel has granted the
//! ports through `ioperm(2)`, which needs `CAP_SYS_RAWIO`. Acquisition
//! happens once at startup and is never undone; process exit reclaims it.
//!
//! ## Dual-target design
//!
//! On Linux x86/x86_64 (glibc): real `ioperm` + inline `in`/`out`.
//! Elsewhere: [`RawPortIo::acquire`] always fails with a privilege error,
//! and the rest of the crate runs against [`PortIo`] mocks.

use log::info;

use super::{EC_DATA, EC_SC};
use crate::error::{Error, Result};

/// Byte-wide access to the I/O port space.
///
/// The handshake protocol is written against this trait so it can be driven
/// by a simulated controller in tests.
pub trait PortIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, value: u8);
}

/// Proof that `ioperm` was granted for [`EC_SC`] and [`EC_DATA`].
#[derive(Debug)]
pub struct RawPortIo {
    _granted: (),
}

#[cfg(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
))]
impl RawPortIo {
    /// Request access to both EC ports. Fails fast if either is refused.
    pub fn acquire() -> Result<Self> {
        for port in [EC_DATA, EC_SC] {
            // SAFETY: ioperm only changes this process's I/O permission
            // bitmap; it touches no memory we own.
            let ret = unsafe { libc::ioperm(libc::c_ulong::from(port), 1, 1) };
            if ret != 0 {
                return Err(Error::Privilege("ioperm() failed, run as root"));
            }
        }
        info!("EC ports 0x{:x}/0x{:x} acquired", EC_SC, EC_DATA);
        Ok(Self { _granted: () })
    }
}

#[cfg(not(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
)))]
impl RawPortIo {
    pub fn acquire() -> Result<Self> {
        info!("EC port I/O is only available on Linux x86");
        Err(Error::Privilege("port I/O not supported on this platform"))
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for RawPortIo {
    fn inb(&mut self, port: u16) -> u8 {
        let value: u8;
        // SAFETY: a RawPortIo only exists after ioperm granted the ports,
        // and `&mut self` serialises access within the process.
        unsafe {
            core::arch::asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn outb(&mut self, port: u16, value: u8) {
        // SAFETY: as for `inb`.
        unsafe {
            core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
impl PortIo for RawPortIo {
    // Unreachable: acquire() never succeeds on these targets.
    fn inb(&mut self, _port: u16) -> u8 {
        0xFF
    }

    fn outb(&mut self, _port: u16, _value: u8) {}
}
