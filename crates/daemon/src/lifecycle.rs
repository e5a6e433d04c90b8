// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: state layout, startup, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Filesystem layout of one daemon instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Data root the daemon serves; state is keyed by its canonical path.
    pub root: PathBuf,
    /// Directory holding the journal, lock, version, and log files.
    pub state_dir: PathBuf,
    /// Path to the Unix socket
    pub socket_path: PathBuf,
    /// Path to the lock file; doubles as the pid file.
    pub lock_path: PathBuf,
    /// Path to the version file
    pub version_path: PathBuf,
    /// Path to the daemon log file
    pub log_path: PathBuf,
}

impl Config {
    /// Lay out state for a data root. With a data dir everything lives
    /// under that directory, socket included; otherwise state goes to the
    /// per-root XDG directory and the socket to a short `/tmp` path.
    pub fn for_root(root: &Path, data_dir: Option<&Path>) -> Result<Self, LifecycleError> {
        let canonical = root
            .canonicalize()
            .map_err(|e| LifecycleError::RootNotFound(root.to_path_buf(), e))?;

        let (state_dir, socket_path) = match data_dir {
            Some(dir) => (dir.to_path_buf(), dir.join("sluiced.sock")),
            None => {
                let hash = root_hash(&canonical);
                let state_dir = state_dir()?.join(&hash);
                let socket_path = socket_dir()?.join(format!("{}.sock", hash));
                (state_dir, socket_path)
            }
        };

        Ok(Self {
            root: canonical,
            socket_path,
            lock_path: state_dir.join("sluiced.lock"),
            version_path: state_dir.join("sluiced.version"),
            log_path: state_dir.join("sluiced.log"),
            state_dir,
        })
    }

    /// Where the journal backend keeps its file.
    pub fn journal_path(&self, file_name: &str) -> PathBuf {
        self.state_dir.join(file_name)
    }
}

/// Handles the daemon keeps alive while serving.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
}

impl DaemonState {
    /// Remove the state files so the CLI sees a clean stop. The lock
    /// itself releases when the process exits and drops `lock_file`.
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove lock file: {}", e);
            }
        }

        if self.config.version_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.version_path) {
                warn!("Failed to remove version file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Data root not found at {0}: {1}")]
    RootNotFound(PathBuf, std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon: take the lock, write the version file, bind the
/// socket. A failed start cleans up whatever it had created.
pub fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config) {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(config, &e);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure runs if this fails
fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create directories (state dir for the lock, socket dir for the bind)
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Acquire the lock FIRST - prevents startup races
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write our pid into the lock file so the CLI can address us
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Write the version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 4. Remove any stale socket and bind (LAST - only once everything else holds)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("Daemon state at {}", config.state_dir.display());

    Ok(DaemonState { config: config.clone(), lock_file, listener })
}

/// Clean up resources on startup failure. When the failure is a held
/// lock the files belong to the running daemon and must stay.
fn cleanup_on_failure(config: &Config, error: &LifecycleError) {
    if matches!(error, LifecycleError::LockFailed(_)) {
        return;
    }

    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }

    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// State directory for sluice (XDG_STATE_HOME or ~/.local/state)
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("sluice"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/sluice"))
}

/// Socket directory
///
/// Uses /tmp/sluice by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with SLUICE_SOCKET_DIR for testing.
fn socket_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("SLUICE_SOCKET_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(PathBuf::from("/tmp/sluice"))
}

/// Hash of the canonical root, keying the per-root daemon state
fn root_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    // First 16 chars of the hex digest
    hex_encode(&result[..8])
}

// Hex encoding helper
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
