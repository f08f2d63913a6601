// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cell commands

use super::parse_json;
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use hoard_store::{Cell, JsonCodec, StoreConfig};
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct CellArgs {
    #[command(subcommand)]
    pub command: CellCommand,
}

#[derive(Subcommand)]
pub enum CellCommand {
    /// Print the value held by a cell file
    Show {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Replace the value held by a cell file
    Set {
        path: PathBuf,
        /// New value, as JSON
        value: String,
    },
}

type JsonCell = Cell<JsonCodec<serde_json::Value>>;

pub async fn handle(command: CellCommand) -> anyhow::Result<()> {
    match command {
        CellCommand::Show { path, format } => show(path, format),
        CellCommand::Set { path, value } => set(path, &value).await,
    }
}

fn show(path: PathBuf, format: OutputFormat) -> anyhow::Result<()> {
    let cell: JsonCell = Cell::new(path, JsonCodec::new());
    match cell.read_file()? {
        Some(value) => output::print_list(&[value], format),
        None => println!("(empty)"),
    }
    Ok(())
}

async fn set(path: PathBuf, raw: &str) -> anyhow::Result<()> {
    let value = parse_json(raw)?;
    let cell: JsonCell = Cell::with_config(&path, JsonCodec::new(), StoreConfig::from_env()?);
    cell.open().await?;
    cell.store(value)?;
    cell.close().await?;
    println!("Stored: {}", path.display());
    Ok(())
}
