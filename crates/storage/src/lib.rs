// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for projects, pipelines, builds and runners
//!
//! Every write is an [`Operation`] appended to a checksummed JSONL
//! write-ahead log and then applied to the in-memory
//! [`MaterializedState`]. Opening a [`Store`] replays the log.

mod error;
mod operation;
mod state;
mod store;
mod wal;

pub use error::StorageError;
pub use operation::Operation;
pub use state::MaterializedState;
pub use store::{Snapshot, Store};
pub use wal::{Replay, Wal, WalEntry};
