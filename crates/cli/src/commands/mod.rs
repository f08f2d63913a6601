// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod cell;
pub mod fetch;
pub mod seq;

use anyhow::Context;

/// Parse a command-line argument as JSON
pub fn parse_json(raw: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("not valid JSON: {}", raw))
}
