// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hoard-store: embedded persistence for one value or one very large array
//!
//! - [`Cell`]: a single value mirrored to one file, flushed in the background
//! - [`Chunk`]: a cell holding a bounded list of elements
//! - [`Sequence`]: a directory of chunks presented as one 0-based array
//! - [`Codec`]: pluggable value encoding
//!
//! Writes land in memory first. Each open cell runs a tokio task that flushes
//! it every [`StoreConfig::flush_interval`] when dirty, and `close` always
//! writes the final value. Call [`install_shutdown_handler`] once to have
//! SIGINT/SIGTERM close every open cell before the process exits.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cell;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod error;
pub mod registry;
pub mod sequence;

pub use cell::{Cell, FlushErrorHook};
pub use chunk::{chunk_file_name, parse_chunk_index, Chunk};
pub use codec::{ChunkCodec, Codec, JsonCodec, TextCodec};
pub use config::{
    default_flush_interval, set_default_flush_interval, ConfigError, GapPolicy, SequenceConfig,
    StoreConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_PREFIX, FLUSH_INTERVAL_ENV,
};
pub use error::{CodecError, StoreError};
pub use registry::{install_shutdown_handler, Registry, ShutdownReport};
pub use sequence::Sequence;
