//! Bulk register-file reads through the `ec_sys` debugfs exposure.
//!
//! One `read` returns all 256 registers, replacing five handshakes (and up
//! to twenty bounded waits) per sample. The file only exists when the
//! `ec_sys` module is loaded and debugfs is mounted; absence is normal.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::info;

use super::registers::{REGISTER_FILE_LEN, RegisterBlock};
use crate::error::BulkReadError;

pub struct BulkReader {
    file: File,
    path: PathBuf,
    buf: Vec<u8>,
}

impl BulkReader {
    pub fn open(path: &Path) -> Result<Self, BulkReadError> {
        let file = File::open(path).map_err(|e| {
            info!("Bulk EC read unavailable at {} ({})", path.display(), e);
            BulkReadError::Unavailable
        })?;
        info!("Bulk EC read via {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
            buf: Vec::with_capacity(REGISTER_FILE_LEN + 1),
        })
    }

    /// Read the whole register file from offset 0.
    pub fn read_block(&mut self) -> Result<RegisterBlock, BulkReadError> {
        self.buf.clear();
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| BulkReadError::Unreadable(e.kind()))?;
        // One byte of slack so an oversized file shows up as malformed.
        (&mut self.file)
            .take(REGISTER_FILE_LEN as u64 + 1)
            .read_to_end(&mut self.buf)
            .map_err(|e| BulkReadError::Unreadable(e.kind()))?;
        RegisterBlock::from_bytes(&self.buf)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
