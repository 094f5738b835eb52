// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! One JSON entry per line. Each entry carries a sequence number, a
//! timestamp and a CRC32 checksum of its operation. Replay stops at the
//! first entry that fails to parse or verify; everything after it is
//! treated as a torn tail.

use crate::error::StorageError;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A single entry in the write-ahead log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: u64,
    pub operation: Operation,
    /// CRC32 of the serialized operation
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(sequence: u64, timestamp_micros: u64, operation: Operation) -> Self {
        let checksum = Self::calculate_checksum(&operation);
        Self {
            sequence,
            timestamp_micros,
            operation,
            checksum,
        }
    }

    fn calculate_checksum(operation: &Operation) -> u32 {
        // Operation only holds plain data, so serialization does not fail
        let json = serde_json::to_string(operation).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    /// Whether the checksum matches the operation
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.operation)
    }

    pub fn to_line(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(StorageError::from)
    }

    pub fn from_line(line: &str) -> Result<Self, StorageError> {
        serde_json::from_str(line).map_err(StorageError::from)
    }
}

/// Entries recovered from a log
#[derive(Debug, Default)]
pub struct Replay {
    pub entries: Vec<WalEntry>,
    /// Line number of the first unreadable entry, if replay stopped early
    pub corrupt_at: Option<u64>,
    /// Byte length of the log up to the end of the last valid entry
    pub valid_len: u64,
}

/// Append-only log handle
pub struct Wal {
    path: PathBuf,
    file: File,
    next_sequence: u64,
}

impl Wal {
    /// Open or create a log, continuing after its last valid sequence
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let replay = Self::replay(path)?;
        let next_sequence = replay
            .entries
            .last()
            .map(|entry| entry.sequence + 1)
            .unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        // Drop a torn tail so new entries are not written after garbage
        if let Some(line) = replay.corrupt_at {
            tracing::warn!(line, valid_len = replay.valid_len, "truncating WAL at corruption point");
            file.set_len(replay.valid_len)?;
            file.sync_all()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
        })
    }

    /// Append an operation and fsync before returning its sequence number
    pub fn append(&mut self, operation: Operation, timestamp_micros: u64) -> Result<u64, StorageError> {
        let sequence = self.next_sequence;
        let line = WalEntry::new(sequence, timestamp_micros, operation).to_line()?;

        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.sync_all()?;

        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Sequence number the next append will get
    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid entry. A missing file is an empty log.
    pub fn replay(path: &Path) -> Result<Replay, StorageError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Replay::default()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut replay = Replay::default();
        let mut line = String::new();
        let mut line_number = 0u64;
        let mut position = 0u64;

        loop {
            line.clear();
            let bytes_read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(n) => n as u64,
                Err(e) => {
                    tracing::warn!(line = line_number + 1, error = %e, "unreadable WAL line, stopping replay");
                    replay.corrupt_at = Some(line_number + 1);
                    break;
                }
            };
            line_number += 1;
            position += bytes_read;

            let trimmed = line.trim_end_matches('\n');
            if trimmed.is_empty() {
                replay.valid_len = position;
                continue;
            }
            // A line without its newline is a torn write
            let entry = if line.ends_with('\n') {
                WalEntry::from_line(trimmed).ok()
            } else {
                None
            };
            match entry {
                Some(entry) if entry.verify() => {
                    replay.entries.push(entry);
                    replay.valid_len = position;
                }
                _ => {
                    tracing::warn!(line = line_number, "corrupt WAL entry, stopping replay");
                    replay.corrupt_at = Some(line_number);
                    break;
                }
            }
        }
        Ok(replay)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
