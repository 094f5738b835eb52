// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Plan parsing and build seeding

mod job;
mod parser;
mod seed;

pub use job::{validate_stage_order, BuildDef};
pub use parser::{load_plan, parse_plan, ParseError, Plan, DEFAULT_STAGE, DEFAULT_STAGES};
pub use seed::seed;
