// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide registry of open stores
//!
//! Every open cell registers itself here and deregisters on close. A single
//! shutdown handler, installed once per process, closes everything still
//! registered so pending values reach disk before exit.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tracing::{info, warn};

/// Something the shutdown path can close
#[async_trait]
pub trait Shutdown: Send + Sync {
    /// Backing path, for logs and reports
    fn describe(&self) -> &Path;

    async fn shutdown(&self) -> Result<(), StoreError>;
}

/// Token returned by [`Registry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegistrationId(u64);

/// Outcome of [`Registry::close_all`]
#[derive(Debug, Default)]
pub struct ShutdownReport {
    pub closed: usize,
    pub failed: Vec<(PathBuf, StoreError)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Set of open stores, held weakly
#[derive(Default)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: BTreeMap<RegistrationId, Weak<dyn Shutdown>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, target: Weak<dyn Shutdown>) -> RegistrationId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = RegistrationId(inner.next_id);
        inner.next_id += 1;
        inner.entries.insert(id, target);
        id
    }

    pub fn deregister(&self, id: RegistrationId) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.remove(&id);
    }

    /// Number of registered stores that are still alive
    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if a live store backed by `path` is registered
    pub fn is_registered(&self, path: &Path) -> bool {
        self.live().iter().any(|target| target.describe() == path)
    }

    /// Close every registered store, in registration order.
    ///
    /// Failures are collected rather than stopping the sweep.
    pub async fn close_all(&self) -> ShutdownReport {
        let targets = self.live();
        let mut report = ShutdownReport::default();

        for target in targets {
            match target.shutdown().await {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    warn!(path = %target.describe().display(), error = %e, "close during shutdown failed");
                    report.failed.push((target.describe().to_path_buf(), e));
                }
            }
        }

        report
    }

    /// Upgrade live entries and prune dead ones
    fn live(&self) -> Vec<Arc<dyn Shutdown>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.retain(|_, target| target.strong_count() > 0);
        inner.entries.values().filter_map(Weak::upgrade).collect()
    }
}

/// The registry every cell registers with
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Close all open stores when the process receives SIGINT or SIGTERM, then
/// exit with the conventional `128 + signal` status.
///
/// Must be called from within a tokio runtime. Returns false if a handler was
/// already installed; the handler is process-wide and never re-registered.
pub fn install_shutdown_handler() -> bool {
    if HANDLER_INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    tokio::spawn(async {
        let code = match wait_for_signal().await {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "could not listen for shutdown signals");
                return;
            }
        };

        info!("shutdown signal received, closing open stores");
        let report = global().close_all().await;
        info!(
            closed = report.closed,
            failed = report.failed.len(),
            "open stores closed"
        );
        std::process::exit(code);
    });

    true
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<i32> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok(143),
        _ = sigint.recv() => Ok(130),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<i32> {
    tokio::signal::ctrl_c().await?;
    Ok(130)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
