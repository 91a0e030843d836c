//! Embedded-controller access: port I/O, the handshake protocol, the
//! register map, and the bulk register-file side channel.
//!
//! ```text
//!  RawPortIo (inb/outb) ──▶ EcTransport (flag-gated handshakes)
//!                                  │
//!  BulkReader (debugfs) ──▶ RegisterBlock ──▶ registers::readings_from ──▶ ReadingSet
//! ```

pub mod bulk;
pub mod port_io;
pub mod registers;
pub mod transport;

pub use port_io::{PortIo, RawPortIo};
pub use registers::{ReadingSet, RegisterBlock};
pub use transport::EcTransport;

/// EC command / status port.
pub const EC_SC: u16 = 0x66;
/// EC data port.
pub const EC_DATA: u16 = 0x62;
