// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cells, chunks and sequences

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`Codec`](crate::Codec)
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("element is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("{0}")]
    Message(String),
}

/// Errors from store operations
///
/// Every misuse (closed store, over-full chunk, bad index) is reported
/// here instead of aborting the process.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("path is a directory: {0}")]
    PathIsDirectory(PathBuf),
    #[error("path is not a directory: {0}")]
    PathIsNotDirectory(PathBuf),
    #[error("store is not open: {0}")]
    NotOpen(PathBuf),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("chunk {index} is full (capacity {capacity})")]
    ChunkFull { index: usize, capacity: usize },
    #[error("index {index} out of boundary (length {len})")]
    IndexOutOfBoundary { index: usize, len: usize },
    #[error("chunk {missing} is missing but chunk files exist beyond it: {found:?}")]
    ChunkGap { missing: usize, found: Vec<PathBuf> },
    #[error("encode error: {0}")]
    Encode(#[source] CodecError),
    #[error("decode error: {0}")]
    Decode(#[source] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for errors caused by malformed on-disk content
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::Decode(_) | StoreError::ChunkGap { .. })
    }
}
