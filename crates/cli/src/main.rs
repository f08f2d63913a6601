// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hoard - inspect and edit cell files and chunked sequences

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cell, fetch, seq};

#[derive(Parser)]
#[command(
    name = "hoard",
    version,
    about = "Hoard - periodic-flush persistence for values and large arrays"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single-value cell files
    Cell(cell::CellArgs),
    /// Chunked sequences
    Seq(seq::SeqArgs),
    /// Fetch a web page and print its text
    Fetch(fetch::FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    // Flush whatever is open if we are interrupted mid-command
    hoard_store::install_shutdown_handler();

    match cli.command {
        Commands::Cell(args) => cell::handle(args.command).await,
        Commands::Seq(args) => seq::handle(args).await,
        Commands::Fetch(args) => fetch::handle(args).await,
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
