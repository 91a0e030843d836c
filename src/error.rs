//! Unified error types for the fan controller.
//!
//! A single `Error` enum that every subsystem converts into, so the worker
//! loop can decide fatal vs. non-fatal in one place. All variants are `Copy`
//! and cheap to pass through the shared-state and event paths.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An EC handshake flag never reached the expected state.
    Transport(TransportTimeout),
    /// The debugfs register-file side channel failed.
    BulkRead(BulkReadError),
    /// A manual duty request outside the accepted range.
    InvalidCommand(u8),
    /// Port access could not be obtained at startup.
    Privilege(&'static str),
    /// A startup resource (shared block mapping) could not be created.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl Error {
    /// Whether the worker loop must stop on this error.
    ///
    /// Transport timeouts are absorbed; everything else that reaches the
    /// loop ends it.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::BulkRead(e) => write!(f, "bulk read: {e}"),
            Self::InvalidCommand(duty) => {
                write!(f, "invalid fan duty {duty}% (accepted: 60-100)")
            }
            Self::Privilege(msg) => write!(f, "privilege: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Diagnostic for a handshake wait that ran past its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeout {
    /// Port that was polled.
    pub port: u16,
    /// Last status byte observed.
    pub observed: u8,
    /// Bit index that was tested.
    pub flag: u8,
    /// Value the bit was expected to take.
    pub expected: bool,
}

impl fmt::Display for TransportTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wait_ec timeout on port 0x{:x}, data=0x{:x}, flag=0x{:x}, value=0x{:x}",
            self.port,
            self.observed,
            self.flag,
            u8::from(self.expected),
        )
    }
}

impl From<TransportTimeout> for Error {
    fn from(e: TransportTimeout) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Bulk read errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkReadError {
    /// The side channel does not exist or cannot be opened.
    Unavailable,
    /// The side channel was opened but a read failed.
    Unreadable(std::io::ErrorKind),
    /// The side channel returned a block of the wrong size.
    Malformed { len: usize },
}

impl fmt::Display for BulkReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "register file unavailable"),
            Self::Unreadable(kind) => write!(f, "register file unreadable ({kind})"),
            Self::Malformed { len } => {
                write!(f, "register file has {len} bytes, expected 256")
            }
        }
    }
}

impl From<BulkReadError> for Error {
    fn from(e: BulkReadError) -> Self {
        Self::BulkRead(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
