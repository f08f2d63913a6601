// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-value persistent store with background flushing
//!
//! A [`Cell`] keeps one value in memory and mirrors it to one file. Writes
//! only touch memory and mark the cell dirty; a background task flushes dirty
//! cells every `flush_interval`, and [`Cell::close`] always performs a final
//! flush.
//!
//! ## Durability
//!
//! A successful `store` is NOT on disk yet. It survives a crash only after
//! the next background flush or a `close`. A `store` followed immediately by
//! process termination may be lost.
//!
//! ## Locking
//!
//! - value: `RwLock`, exclusive for `store`/`update`, shared for `peek`/flush
//! - disk writes: one async mutex per cell, so the timer flush and the final
//!   flush from `close` never interleave
//! - lifecycle (`open`/`close`): one async mutex per cell

use crate::codec::Codec;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::registry::{self, RegistrationId, Shutdown};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

/// Shortest period the flush task will tick at
const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Callback invoked when a background flush fails
pub type FlushErrorHook = Arc<dyn Fn(&Path, &StoreError) + Send + Sync>;

/// A single value persisted to one file
pub struct Cell<C: Codec> {
    shared: Arc<Shared<C>>,
}

struct Shared<C: Codec> {
    this: Weak<Shared<C>>,
    path: PathBuf,
    codec: C,
    config: StoreConfig,
    // `open` is only flipped while holding the `value` write lock
    value: RwLock<Option<C::Value>>,
    open: AtomicBool,
    opened_once: AtomicBool,
    dirty: AtomicBool,
    write_lock: tokio::sync::Mutex<()>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    on_flush_error: Mutex<Option<FlushErrorHook>>,
}

#[derive(Default)]
struct Lifecycle {
    flusher: Option<Flusher>,
    registration: Option<RegistrationId>,
}

/// Handle to a running background flush task
struct Flusher {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl<C: Codec> Cell<C> {
    /// Create a closed cell for `path` with the process-wide default config
    pub fn new(path: impl Into<PathBuf>, codec: C) -> Self {
        Self::with_config(path, codec, StoreConfig::default())
    }

    pub fn with_config(path: impl Into<PathBuf>, codec: C, config: StoreConfig) -> Self {
        let path = path.into();
        let shared = Arc::new_cyclic(|this| Shared {
            this: this.clone(),
            path,
            codec,
            config,
            value: RwLock::new(None),
            open: AtomicBool::new(false),
            opened_once: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            write_lock: tokio::sync::Mutex::new(()),
            lifecycle: tokio::sync::Mutex::new(Lifecycle::default()),
            on_flush_error: Mutex::new(None),
        });
        Self { shared }
    }

    /// Open the cell: create the file if absent, load its content and start
    /// the background flush task.
    ///
    /// An empty file loads as no value. Opening an open cell is a no-op.
    pub async fn open(&self) -> Result<(), StoreError> {
        self.shared.open().await
    }

    /// Stop the flush task, write the value one last time and release it.
    ///
    /// Closing a closed cell is a no-op; closing a cell that was never opened
    /// fails with `NotOpen`. If the final write fails the cell stays open so
    /// the caller can retry.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.shared.close().await
    }

    /// Replace the in-memory value and mark the cell dirty
    pub fn store(&self, value: C::Value) -> Result<(), StoreError> {
        self.update(|slot| {
            *slot = Some(value);
            Ok(())
        })
    }

    /// Clone of the current in-memory value
    pub fn peek(&self) -> Result<Option<C::Value>, StoreError>
    where
        C::Value: Clone,
    {
        self.read(|value| value.cloned())
    }

    /// Borrow the current value for the duration of `f`
    pub fn read<R>(&self, f: impl FnOnce(Option<&C::Value>) -> R) -> Result<R, StoreError> {
        let guard = self.shared.value.read().unwrap_or_else(|e| e.into_inner());
        if !self.shared.is_open() {
            return Err(self.shared.not_open());
        }
        Ok(f((*guard).as_ref()))
    }

    /// Mutate the value in place under the exclusive lock.
    ///
    /// The cell is marked dirty only when `f` succeeds.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut Option<C::Value>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut guard = self.shared.value.write().unwrap_or_else(|e| e.into_inner());
        if !self.shared.is_open() {
            return Err(self.shared.not_open());
        }
        let result = f(&mut *guard)?;
        self.shared.dirty.store(true, Ordering::SeqCst);
        Ok(result)
    }

    /// Write the current value to disk now
    pub async fn flush(&self) -> Result<(), StoreError> {
        if !self.shared.is_open() {
            return Err(self.shared.not_open());
        }
        self.shared.flush().await
    }

    /// Register a callback for background flush failures.
    ///
    /// A failed background flush also stops that cell's flush task; the
    /// value is still written by `close`.
    pub fn on_flush_error(&self, hook: impl Fn(&Path, &StoreError) + Send + Sync + 'static) {
        let mut slot = self
            .shared
            .on_flush_error
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(hook));
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open()
    }

    /// True when memory holds changes not yet written
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Backing file path (requires the cell to be open)
    pub fn path(&self) -> Result<&Path, StoreError> {
        if !self.shared.is_open() {
            return Err(self.shared.not_open());
        }
        Ok(&self.shared.path)
    }

    /// Backing file path regardless of state
    pub fn file_path(&self) -> &Path {
        &self.shared.path
    }

    pub fn codec(&self) -> &C {
        &self.shared.codec
    }

    /// Decode the backing file without opening the cell
    pub fn read_file(&self) -> Result<Option<C::Value>, StoreError> {
        let bytes = std::fs::read(&self.shared.path)?;
        self.shared.decode(&bytes)
    }
}

impl<C: Codec> Drop for Cell<C> {
    fn drop(&mut self) {
        if self.shared.is_open() {
            self.shared.abandon();
        }
    }
}

impl<C: Codec> Shared<C> {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn not_open(&self) -> StoreError {
        StoreError::NotOpen(self.path.clone())
    }

    async fn open(&self) -> Result<(), StoreError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if self.is_open() {
            return Ok(());
        }

        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => {
                return Err(StoreError::PathIsDirectory(self.path.clone()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            Err(e) => return Err(e.into()),
        }

        tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        let bytes = tokio::fs::read(&self.path).await?;
        let loaded = self.decode(&bytes)?;

        {
            let mut value = self.value.write().unwrap_or_else(|e| e.into_inner());
            *value = loaded;
            self.dirty.store(false, Ordering::SeqCst);
            self.open.store(true, Ordering::SeqCst);
        }
        self.opened_once.store(true, Ordering::SeqCst);

        lifecycle.flusher = self.spawn_flusher();
        if lifecycle.registration.is_none() {
            let this: Weak<dyn Shutdown> = self.this.clone();
            lifecycle.registration = Some(registry::global().register(this));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "cell opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if !self.is_open() {
            return if self.opened_once.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(self.not_open())
            };
        }

        if let Some(flusher) = lifecycle.flusher.take() {
            flusher.stop().await;
        }

        let _write = self.write_lock.lock().await;
        let value = {
            let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
            self.open.store(false, Ordering::SeqCst);
            guard.take()
        };

        let written = match self.encode(value.as_ref()) {
            Ok(bytes) => tokio::fs::write(&self.path, &bytes)
                .await
                .map(|()| bytes.len())
                .map_err(StoreError::from),
            Err(e) => Err(e),
        };

        match written {
            Ok(len) => {
                self.dirty.store(false, Ordering::SeqCst);
                if let Some(id) = lifecycle.registration.take() {
                    registry::global().deregister(id);
                }
                debug!(path = %self.path.display(), bytes = len, "cell closed");
                Ok(())
            }
            Err(e) => {
                {
                    let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
                    *guard = value;
                    self.open.store(true, Ordering::SeqCst);
                }
                self.dirty.store(true, Ordering::SeqCst);
                lifecycle.flusher = self.spawn_flusher();
                warn!(path = %self.path.display(), error = %e, "final flush failed; cell left open");
                Err(e)
            }
        }
    }

    /// Overwrite the file with the encoded current value
    async fn flush(&self) -> Result<(), StoreError> {
        let _write = self.write_lock.lock().await;

        // Cleared before the snapshot so a concurrent store re-marks it
        self.dirty.store(false, Ordering::SeqCst);
        let encoded = {
            let value = self.value.read().unwrap_or_else(|e| e.into_inner());
            self.encode((*value).as_ref())
        };

        let result = match encoded {
            Ok(bytes) => tokio::fs::write(&self.path, &bytes)
                .await
                .map(|()| bytes.len())
                .map_err(StoreError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(len) => {
                debug!(path = %self.path.display(), bytes = len, "cell flushed");
                Ok(())
            }
            Err(e) => {
                self.dirty.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn encode(&self, value: Option<&C::Value>) -> Result<Vec<u8>, StoreError> {
        match value {
            Some(value) => self.codec.encode(value).map_err(StoreError::Encode),
            None => Ok(Vec::new()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<C::Value>, StoreError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        self.codec
            .decode(bytes)
            .map(Some)
            .map_err(StoreError::Decode)
    }

    fn spawn_flusher(&self) -> Option<Flusher> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "no tokio runtime; background flushing disabled");
                return None;
            }
        };
        let period = self.config.flush_interval.max(MIN_FLUSH_INTERVAL);
        Some(Flusher::spawn(&runtime, self.this.clone(), period))
    }

    fn report_flush_error(&self, err: &StoreError) {
        error!(path = %self.path.display(), error = %err, "background flush failed; flush task stopped");
        let hook = self
            .on_flush_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(hook) = hook {
            hook(&self.path, err);
        }
    }

    /// Best-effort cleanup for a cell dropped while open
    fn abandon(&self) {
        if let Ok(mut lifecycle) = self.lifecycle.try_lock() {
            if let Some(flusher) = lifecycle.flusher.take() {
                flusher.handle.abort();
            }
            if let Some(id) = lifecycle.registration.take() {
                registry::global().deregister(id);
            }
        }

        let value = {
            let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
            self.open.store(false, Ordering::SeqCst);
            guard.take()
        };
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return;
        }

        warn!(path = %self.path.display(), "cell dropped while open; writing pending value");
        let result = self
            .encode(value.as_ref())
            .and_then(|bytes| std::fs::write(&self.path, bytes).map_err(StoreError::from));
        if let Err(e) = result {
            error!(path = %self.path.display(), error = %e, "pending value lost");
        }
    }
}

#[async_trait]
impl<C: Codec> Shutdown for Shared<C> {
    fn describe(&self) -> &Path {
        &self.path
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        self.close().await
    }
}

impl Flusher {
    fn spawn<C: Codec>(
        runtime: &tokio::runtime::Handle,
        cell: Weak<Shared<C>>,
        period: Duration,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    // Closing performs its own final flush
                    _ = &mut shutdown_rx => break,

                    _ = ticker.tick() => {
                        let Some(cell) = cell.upgrade() else {
                            break;
                        };
                        if !cell.dirty.load(Ordering::SeqCst) {
                            continue;
                        }
                        if let Err(e) = cell.flush().await {
                            cell.report_flush_error(&e);
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "flush task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
#[path = "cell_tests.rs"]
mod tests;
