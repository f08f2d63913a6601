// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence commands

use super::parse_json;
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use hoard_store::{GapPolicy, JsonCodec, Sequence, SequenceConfig, StoreConfig, DEFAULT_PREFIX};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

#[derive(clap::Args)]
pub struct SeqArgs {
    /// Sequence directory
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Chunk file prefix
    #[arg(long, global = true, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Elements per chunk
    #[arg(long, global = true, default_value_t = 1000)]
    capacity: usize,

    /// Fail instead of ignoring chunk files past a missing index
    #[arg(long, global = true)]
    strict: bool,

    #[arg(long, global = true, value_enum, default_value_t)]
    format: OutputFormat,

    #[command(subcommand)]
    command: SeqCommand,
}

#[derive(Subcommand)]
pub enum SeqCommand {
    /// Append values (JSON) to the end of the sequence
    Push {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Print the value at an index
    Get { index: usize },
    /// Print the number of elements and chunks
    Len,
    /// Print every element, one per line
    Dump,
}

#[derive(Serialize)]
struct SeqInfo {
    length: usize,
    chunks: usize,
    ignored: Vec<PathBuf>,
}

impl fmt::Display for SeqInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Length: {}\nChunks: {}", self.length, self.chunks)?;
        for path in &self.ignored {
            write!(f, "\nIgnored: {}", path.display())?;
        }
        Ok(())
    }
}

pub async fn handle(args: SeqArgs) -> anyhow::Result<()> {
    let gap_policy = if args.strict {
        GapPolicy::Reject
    } else {
        GapPolicy::Truncate
    };
    let config = SequenceConfig::new(args.prefix, args.capacity)
        .gap_policy(gap_policy)
        .store(StoreConfig::from_env()?);
    let seq = Sequence::new(&args.dir, JsonCodec::<serde_json::Value>::new(), config);
    seq.open().await?;
    debug!(dir = %args.dir.display(), "sequence ready");

    let result = run(&seq, args.command, args.format).await;
    let closed = seq.close().await;
    result?;
    closed?;
    Ok(())
}

async fn run(
    seq: &Sequence<JsonCodec<serde_json::Value>>,
    command: SeqCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        SeqCommand::Push { values } => {
            let values = values
                .iter()
                .map(|raw| parse_json(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let count = values.len();
            for value in values {
                seq.push(value).await?;
            }
            println!("Pushed {} (length {})", count, seq.len().await?);
        }
        SeqCommand::Get { index } => {
            let value = seq.get(index).await?;
            output::print_list(&[value], format);
        }
        SeqCommand::Len => {
            let info = SeqInfo {
                length: seq.len().await?,
                chunks: seq.chunk_count().await?,
                ignored: seq.ignored_chunks(),
            };
            output::print(&info, format);
        }
        SeqCommand::Dump => {
            let values = seq.to_vec().await?;
            output::print_list(&values, format);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "seq_tests.rs"]
mod tests;
