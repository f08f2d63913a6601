// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render one item: its `Display` form, or pretty JSON
pub fn render<T: Serialize + Display>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => value.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Render items one per line, or as one pretty JSON array
pub fn render_list<T: Serialize + Display>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
    }
}

pub fn print<T: Serialize + Display>(value: &T, format: OutputFormat) {
    println!("{}", render(value, format));
}

/// Print a list of items; an empty list prints nothing in text mode
pub fn print_list<T: Serialize + Display>(items: &[T], format: OutputFormat) {
    let out = render_list(items, format);
    if !out.is_empty() {
        println!("{}", out);
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
