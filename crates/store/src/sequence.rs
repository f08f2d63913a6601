// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A large logical array sharded across chunk files
//!
//! ```text
//! dir/
//!   {prefix}_chunk_0.txt   capacity elements
//!   {prefix}_chunk_1.txt   capacity elements
//!   {prefix}_chunk_2.txt   0 < n <= capacity elements (only the last may be short)
//! ```
//!
//! Chunk files form a contiguous run starting at 0. Opening scans that run
//! and stops at the first missing index; see [`GapPolicy`] for what happens to
//! files found past it.

use crate::chunk::{chunk_file_name, parse_chunk_index, Chunk};
use crate::codec::Codec;
use crate::config::{GapPolicy, SequenceConfig};
use crate::error::StoreError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Ordered collection of chunks with one 0-based index space
pub struct Sequence<C: Codec + Clone> {
    dir: PathBuf,
    codec: C,
    config: SequenceConfig,
    // None while closed. Push holds the write lock across the
    // check-last / allocate / append step.
    chunks: RwLock<Option<Chunks<C>>>,
    opened_once: AtomicBool,
    ignored: Mutex<Vec<PathBuf>>,
    // Chunks whose close failed; retried by the next close or open
    unclosed: tokio::sync::Mutex<Vec<Chunk<C>>>,
}

struct Chunks<C: Codec> {
    list: Vec<Chunk<C>>,
    // Every chunk but the last holds exactly `capacity` elements
    uniform: bool,
}

impl<C: Codec + Clone> Sequence<C> {
    pub fn new(dir: impl Into<PathBuf>, codec: C, config: SequenceConfig) -> Self {
        Self {
            dir: dir.into(),
            codec,
            config,
            chunks: RwLock::new(None),
            opened_once: AtomicBool::new(false),
            ignored: Mutex::new(Vec::new()),
            unclosed: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// Open the sequence, creating its directory if needed and opening every
    /// chunk in the contiguous run starting at index 0.
    ///
    /// Opening an open sequence is a no-op.
    pub async fn open(&self) -> Result<(), StoreError> {
        if self.config.capacity == 0 {
            return Err(StoreError::InvalidValue(
                "chunk capacity must be at least 1".to_string(),
            ));
        }

        let mut guard = self.chunks.write().await;
        if guard.is_some() {
            return Ok(());
        }

        {
            let mut unclosed = self.unclosed.lock().await;
            if !unclosed.is_empty() {
                let (failed, first_err) = close_chunks(std::mem::take(&mut *unclosed)).await;
                *unclosed = failed;
                if let Some(e) = first_err {
                    return Err(e);
                }
            }
        }

        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if !meta.is_dir() => {
                return Err(StoreError::PathIsNotDirectory(self.dir.clone()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&self.dir).await?;
            }
            Err(e) => return Err(e.into()),
        }

        let mut list = Vec::new();
        loop {
            let index = list.len();
            let path = self.chunk_path(index);
            if !tokio::fs::try_exists(&path).await? {
                break;
            }
            let chunk = self.new_chunk(index);
            if let Err(e) = chunk.open().await {
                close_quietly(&list).await;
                return Err(e);
            }
            list.push(chunk);
        }

        let beyond = match self.files_beyond(list.len()).await {
            Ok(beyond) => beyond,
            Err(e) => {
                close_quietly(&list).await;
                return Err(e);
            }
        };
        if !beyond.is_empty() {
            match self.config.gap_policy {
                GapPolicy::Reject => {
                    close_quietly(&list).await;
                    return Err(StoreError::ChunkGap {
                        missing: list.len(),
                        found: beyond,
                    });
                }
                GapPolicy::Truncate => {
                    warn!(
                        dir = %self.dir.display(),
                        missing = list.len(),
                        ignored = beyond.len(),
                        "chunk index missing; ignoring chunk files past the gap"
                    );
                }
            }
        }
        *self.ignored.lock().unwrap_or_else(|e| e.into_inner()) = beyond;

        let uniform = match self.is_uniform(&list) {
            Ok(uniform) => uniform,
            Err(e) => {
                close_quietly(&list).await;
                return Err(e);
            }
        };
        debug!(dir = %self.dir.display(), chunks = list.len(), uniform, "sequence opened");

        *guard = Some(Chunks { list, uniform });
        self.opened_once.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Close every chunk in order and drop the in-memory chunk list.
    ///
    /// All chunks are closed even if one fails; the first failure is returned.
    /// Chunks that fail keep their values and are retried by the next
    /// `close` or `open`.
    pub async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self.chunks.write().await;
        let mut unclosed = self.unclosed.lock().await;
        let list = match guard.take() {
            Some(chunks) => chunks.list,
            None if unclosed.is_empty() => {
                return if self.opened_once.load(Ordering::SeqCst) {
                    Ok(())
                } else {
                    Err(self.not_open())
                };
            }
            None => Vec::new(),
        };

        let pending: Vec<_> = std::mem::take(&mut *unclosed)
            .into_iter()
            .chain(list)
            .collect();
        let count = pending.len();
        let (failed, first_err) = close_chunks(pending).await;
        debug!(
            dir = %self.dir.display(),
            chunks = count,
            failed = failed.len(),
            "sequence closed"
        );
        *unclosed = failed;

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Append a value at the end.
    ///
    /// When the last chunk is full (or there is none) a new chunk file is
    /// created and flushed immediately with the value in it. Otherwise the
    /// value lands in the last chunk's memory and reaches disk with its next
    /// flush or on close.
    pub async fn push(&self, value: C::Value) -> Result<(), StoreError> {
        let mut guard = self.chunks.write().await;
        let chunks = guard.as_mut().ok_or_else(|| self.not_open())?;

        if let Some(last) = chunks.list.last() {
            let last_len = last.len()?;
            if last_len < self.config.capacity {
                return last.push(value);
            }
            if last_len > self.config.capacity {
                chunks.uniform = false;
            }
        }

        let index = chunks.list.len();
        let chunk = self.new_chunk(index);
        chunk.open().await?;
        let filled = match chunk.push(value) {
            Ok(()) => chunk.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = filled {
            if let Err(close_err) = chunk.close().await {
                warn!(path = %chunk.path().display(), error = %close_err, "closing failed chunk");
            }
            return Err(e);
        }

        info!(dir = %self.dir.display(), index, "allocated chunk");
        chunks.list.push(chunk);
        Ok(())
    }

    /// Element at global position `index`
    pub async fn get(&self, index: usize) -> Result<C::Value, StoreError>
    where
        C::Value: Clone,
    {
        let guard = self.chunks.read().await;
        let chunks = guard.as_ref().ok_or_else(|| self.not_open())?;

        match self.locate(chunks, index)? {
            Some((chunk, local)) => chunk.get(local),
            None => Err(StoreError::IndexOutOfBoundary {
                index,
                len: total_len(&chunks.list)?,
            }),
        }
    }

    /// Total number of elements across all chunks
    pub async fn len(&self) -> Result<usize, StoreError> {
        let guard = self.chunks.read().await;
        let chunks = guard.as_ref().ok_or_else(|| self.not_open())?;
        total_len(&chunks.list)
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    pub async fn chunk_count(&self) -> Result<usize, StoreError> {
        let guard = self.chunks.read().await;
        let chunks = guard.as_ref().ok_or_else(|| self.not_open())?;
        Ok(chunks.list.len())
    }

    /// Element count of each chunk, in index order
    pub async fn chunk_lengths(&self) -> Result<Vec<usize>, StoreError> {
        let guard = self.chunks.read().await;
        let chunks = guard.as_ref().ok_or_else(|| self.not_open())?;
        chunks.list.iter().map(Chunk::len).collect()
    }

    /// Every element in order
    pub async fn to_vec(&self) -> Result<Vec<C::Value>, StoreError>
    where
        C::Value: Clone,
    {
        let guard = self.chunks.read().await;
        let chunks = guard.as_ref().ok_or_else(|| self.not_open())?;
        let mut all = Vec::new();
        for chunk in &chunks.list {
            all.extend(chunk.elements()?);
        }
        Ok(all)
    }

    /// Root directory (fails if the sequence was never opened)
    pub fn path(&self) -> Result<&Path, StoreError> {
        if !self.opened_once.load(Ordering::SeqCst) {
            return Err(self.not_open());
        }
        Ok(&self.dir)
    }

    pub async fn is_open(&self) -> bool {
        self.chunks.read().await.is_some()
    }

    /// Chunk files skipped by the last open because they sit past a gap
    pub fn ignored_chunks(&self) -> Vec<PathBuf> {
        self.ignored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    fn not_open(&self) -> StoreError {
        StoreError::NotOpen(self.dir.clone())
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(chunk_file_name(&self.config.prefix, index))
    }

    fn new_chunk(&self, index: usize) -> Chunk<C> {
        Chunk::new(
            self.chunk_path(index),
            self.codec.clone(),
            index,
            self.config.capacity,
            self.config.store.clone(),
        )
    }

    /// Find the chunk holding `index` and the position inside it
    fn locate<'a>(
        &self,
        chunks: &'a Chunks<C>,
        index: usize,
    ) -> Result<Option<(&'a Chunk<C>, usize)>, StoreError> {
        if chunks.uniform {
            let capacity = self.config.capacity;
            let Some(chunk) = chunks.list.get(index / capacity) else {
                return Ok(None);
            };
            let local = index % capacity;
            return Ok((local < chunk.len()?).then_some((chunk, local)));
        }

        let mut remaining = index;
        for chunk in &chunks.list {
            let len = chunk.len()?;
            if remaining < len {
                return Ok(Some((chunk, remaining)));
            }
            remaining -= len;
        }
        Ok(None)
    }

    /// True when every chunk but the last is full and the last does not
    /// exceed capacity, i.e. `index / capacity` finds the owning chunk.
    fn is_uniform(&self, list: &[Chunk<C>]) -> Result<bool, StoreError> {
        let Some((last, init)) = list.split_last() else {
            return Ok(true);
        };
        if last.len()? > self.config.capacity {
            return Ok(false);
        }
        for chunk in init {
            if chunk.len()? != self.config.capacity {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Chunk files for this prefix with an index of `first` or higher
    async fn files_beyond(&self, first: usize) -> Result<Vec<PathBuf>, StoreError> {
        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(index) = name
                .to_str()
                .and_then(|name| parse_chunk_index(&self.config.prefix, name))
            else {
                continue;
            };
            if index >= first {
                found.push((index, entry.path()));
            }
        }
        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }
}

fn total_len<C: Codec>(list: &[Chunk<C>]) -> Result<usize, StoreError> {
    list.iter().map(Chunk::len).sum()
}

/// Close each chunk, returning the ones that failed and the first error
async fn close_chunks<C: Codec>(list: Vec<Chunk<C>>) -> (Vec<Chunk<C>>, Option<StoreError>) {
    let mut failed = Vec::new();
    let mut first_err = None;
    for chunk in list {
        if let Err(e) = chunk.close().await {
            warn!(path = %chunk.path().display(), error = %e, "chunk close failed");
            first_err.get_or_insert(e);
            failed.push(chunk);
        }
    }
    (failed, first_err)
}

async fn close_quietly<C: Codec>(list: &[Chunk<C>]) {
    for chunk in list {
        if let Err(e) = chunk.close().await {
            warn!(path = %chunk.path().display(), error = %e, "chunk close failed");
        }
    }
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
