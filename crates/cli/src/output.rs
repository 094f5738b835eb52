// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print one value: its `Display` form as text, pretty JSON otherwise
pub fn print<T: Serialize + Display + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{value}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Print a list, one item per line as text. `empty` replaces an empty
/// text listing; JSON always prints an array.
pub fn print_list<T: Serialize + Display>(
    items: &[T],
    format: OutputFormat,
    empty: &str,
) -> Result<()> {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{empty}"),
        OutputFormat::Text => items.iter().for_each(|item| println!("{item}")),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

/// Print `text` in text mode or `value` as JSON
pub fn print_either<T: Serialize + ?Sized>(
    text: impl Display,
    value: &T,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{text}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
