//! Behavioral specifications for the hoard CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, exit codes, and the files left on disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/help.rs"]
mod cli_help;

// cell/
#[path = "specs/cell/values.rs"]
mod cell_values;

// seq/
#[path = "specs/seq/append.rs"]
mod seq_append;
#[path = "specs/seq/reopen.rs"]
mod seq_reopen;
