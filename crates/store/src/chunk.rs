// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded element lists backed by one cell each

use crate::cell::Cell;
use crate::codec::{ChunkCodec, Codec};
use crate::config::StoreConfig;
use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// File name of chunk `index` for `prefix`
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{}_chunk_{}.txt", prefix, index)
}

/// Inverse of [`chunk_file_name`]
pub fn parse_chunk_index(prefix: &str, file_name: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix("_chunk_")?
        .strip_suffix(".txt")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One segment of a sequence: at most `capacity` elements in one file
pub struct Chunk<C: Codec> {
    cell: Cell<ChunkCodec<C>>,
    index: usize,
    capacity: usize,
}

impl<C: Codec> Chunk<C> {
    pub fn new(
        path: impl Into<PathBuf>,
        codec: C,
        index: usize,
        capacity: usize,
        config: StoreConfig,
    ) -> Self {
        Self {
            cell: Cell::with_config(path, ChunkCodec::new(codec), config),
            index,
            capacity,
        }
    }

    pub async fn open(&self) -> Result<(), StoreError> {
        self.cell.open().await
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.cell.close().await
    }

    /// Write the element list to disk now
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.cell.flush().await
    }

    /// Position among the chunks of the owning sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        self.cell.file_path()
    }

    pub fn is_open(&self) -> bool {
        self.cell.is_open()
    }

    /// Number of elements held.
    ///
    /// A closed chunk is counted straight from its file without starting a
    /// flush task or keeping the file open; a missing file counts as empty.
    pub fn len(&self) -> Result<usize, StoreError> {
        if self.cell.is_open() {
            return self.cell.read(|elems| elems.map_or(0, Vec::len));
        }
        match self.cell.read_file() {
            Ok(elems) => Ok(elems.map_or(0, |e| e.len())),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn is_full(&self) -> Result<bool, StoreError> {
        Ok(self.len()? >= self.capacity)
    }

    /// Append an element in memory; it reaches disk with the next flush
    pub fn push(&self, element: C::Value) -> Result<(), StoreError> {
        let (index, capacity) = (self.index, self.capacity);
        self.cell.update(|slot| {
            let elems = slot.get_or_insert_with(Vec::new);
            if elems.len() >= capacity {
                return Err(StoreError::ChunkFull { index, capacity });
            }
            elems.push(element);
            Ok(())
        })
    }

    /// Element at `local` within this chunk
    pub fn get(&self, local: usize) -> Result<C::Value, StoreError>
    where
        C::Value: Clone,
    {
        self.cell.read(|elems| {
            let elems = elems.map_or(&[][..], Vec::as_slice);
            elems
                .get(local)
                .cloned()
                .ok_or(StoreError::IndexOutOfBoundary {
                    index: local,
                    len: elems.len(),
                })
        })?
    }

    /// Snapshot of every element
    pub fn elements(&self) -> Result<Vec<C::Value>, StoreError>
    where
        C::Value: Clone,
    {
        self.cell.read(|elems| elems.cloned().unwrap_or_default())
    }

    /// Replace the whole element list
    pub fn replace(&self, elements: Vec<C::Value>) -> Result<(), StoreError> {
        if elements.len() > self.capacity {
            return Err(StoreError::InvalidValue(format!(
                "{} elements exceed chunk capacity {}",
                elements.len(),
                self.capacity
            )));
        }
        self.cell.store(elements)
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
