// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use sluice_core::{
    CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference, PartitionType,
    StreamMetadata,
};
use sluice_daemon::lifecycle::{self, LifecycleError};
use sluice_daemon::protocol::{
    self, AdmissionOutcome, Direction, ProtocolError, Request, Response, SubscriptionStatus,
    PROTOCOL_VERSION,
};

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for one request/response exchange
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("SLUICE_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to come up
pub fn timeout_startup() -> Duration {
    parse_duration_ms("SLUICE_TIMEOUT_STARTUP_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for a process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("SLUICE_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("SLUICE_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Daemon speaks protocol {daemon}, this build expects {expected}")]
    ProtocolMismatch { daemon: String, expected: &'static str },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request refused: {0}")]
    Refused(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine data root")]
    NoDataRoot,

    #[error("Could not determine state directory")]
    NoStateDir,
}

impl From<LifecycleError> for ClientError {
    fn from(err: LifecycleError) -> Self {
        // Only layout errors can reach the client; startup errors stay
        // inside the daemon process.
        match err {
            LifecycleError::RootNotFound(..) => ClientError::NoDataRoot,
            _ => ClientError::NoStateDir,
        }
    }
}

/// Verdict of an emit: the appended record, or the admission refusal.
#[derive(Debug)]
pub enum EmitReply {
    Admitted(CloudEventRecord),
    Refused(AdmissionOutcome),
}

/// Daemon client
pub struct DaemonClient {
    layout: lifecycle::Config,
}

impl DaemonClient {
    /// Connect to the daemon, auto-starting it if not running
    pub async fn connect_or_start(
        root: &Path,
        data_dir: Option<&Path>,
    ) -> Result<Self, ClientError> {
        let layout = lifecycle::Config::for_root(root, data_dir)?;

        // Check the version file before connecting - restart the daemon on
        // a version mismatch so the wire shapes always line up
        if let Ok(daemon_version) = std::fs::read_to_string(&layout.version_path) {
            if daemon_version.trim() != env!("CARGO_PKG_VERSION") {
                let _ = daemon_stop(root, data_dir).await;
            }
        }

        match Self::connect(root, data_dir) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                // Start the daemon in the background
                let child = start_daemon_background(root, data_dir)?;
                // Wait for the socket with retry, watching for early exit
                Self::connect_with_retry(layout, timeout_startup(), child).await
            }
            Err(e) => Err(wrap_with_startup_error(e, &layout)),
        }
    }

    /// Connect to an existing daemon (no auto-start)
    pub fn connect(root: &Path, data_dir: Option<&Path>) -> Result<Self, ClientError> {
        let layout = lifecycle::Config::for_root(root, data_dir)?;

        if !layout.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        Ok(Self { layout })
    }

    /// Filesystem layout of the daemon this client addresses.
    pub fn layout(&self) -> &lifecycle::Config {
        &self.layout
    }

    async fn connect_with_retry(
        layout: lifecycle::Config,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Check if the daemon process exited early (startup failure)
            match child.try_wait() {
                Ok(Some(status)) => {
                    // Process exited - startup failed
                    // Poll for the startup error in the log (the filesystem
                    // may need a moment to catch up)
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = read_startup_error(&layout) {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        tokio::time::sleep(poll_interval()).await;
                    }
                    // No error found in the log, return a generic failure
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {}",
                        status
                    )));
                }
                Ok(None) => {
                    // Still running, try to connect
                }
                Err(_) => {
                    // Error checking status, assume still running
                }
            }

            if layout.socket_path.exists() {
                return Ok(Self { layout });
            }
            tokio::time::sleep(poll_interval()).await;
        }

        // Timeout - check the log for startup errors
        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            &layout,
        ))
    }

    /// Send a request and receive a response with specific timeouts
    async fn send_with_timeout(
        &self,
        request: Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.layout.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        // Encode and send the request with the write timeout
        let data = protocol::encode(&request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        // Read the response with the read timeout
        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        let response: Response = protocol::decode(&response_bytes)?;
        Ok(response)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    /// Probe the daemon and verify it speaks our protocol revision
    pub async fn handshake(&self) -> Result<String, ClientError> {
        match self.send(Request::Ping).await? {
            Response::Pong { version } if version == PROTOCOL_VERSION => Ok(version),
            Response::Pong { version } => Err(ClientError::ProtocolMismatch {
                daemon: version,
                expected: PROTOCOL_VERSION,
            }),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Run one event through admission and, if admitted, append it
    pub async fn emit(&self, event: CloudEvent) -> Result<EmitReply, ClientError> {
        match self.send(Request::Ingest { event }).await? {
            Response::Ingested { record } => Ok(EmitReply::Admitted(record)),
            Response::NotAdmitted { outcome } => Ok(EmitReply::Refused(outcome)),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Page through the stream, or one partition of it
    pub async fn read(
        &self,
        partition: Option<PartitionReference>,
        direction: Direction,
        offset: Option<u64>,
        length: u64,
    ) -> Result<Vec<CloudEventRecord>, ClientError> {
        let request = Request::Read {
            partition,
            direction,
            offset,
            length,
        };
        match self.send(request).await? {
            Response::Records { records } => Ok(records),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Shape of the whole stream
    pub async fn stream_meta(&self) -> Result<StreamMetadata, ClientError> {
        match self.send(Request::Meta { partition: None }).await? {
            Response::StreamMeta { meta } => Ok(meta),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Shape of one populated partition
    pub async fn partition_meta(
        &self,
        partition: PartitionReference,
    ) -> Result<PartitionMetadata, ClientError> {
        let request = Request::Meta {
            partition: Some(partition),
        };
        match self.send(request).await? {
            Response::PartitionMeta { meta } => Ok(meta),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Ids of every populated partition of one kind
    pub async fn partitions(&self, kind: PartitionType) -> Result<Vec<String>, ClientError> {
        match self.send(Request::Partitions { kind }).await? {
            Response::PartitionIds { ids } => Ok(ids),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Phase of every subscription the broker knows about
    pub async fn subscriptions(&self) -> Result<Vec<SubscriptionStatus>, ClientError> {
        match self.send(Request::Subscriptions).await? {
            Response::Subscriptions { statuses } => Ok(statuses),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Open a watch connection. The daemon replays from `from` when given,
    /// then streams one `Event` frame per record as appends land.
    pub async fn watch(
        &self,
        partition: Option<PartitionReference>,
        from: Option<u64>,
    ) -> Result<Watch, ClientError> {
        let stream = UnixStream::connect(&self.layout.socket_path).await?;
        let (reader, mut writer) = stream.into_split();

        let data = protocol::encode(&Request::Watch { partition, from })?;
        tokio::time::timeout(timeout_ipc(), protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        Ok(Watch {
            reader,
            _writer: writer,
        })
    }
}

/// A live record stream from a `Watch` connection.
pub struct Watch {
    reader: OwnedReadHalf,
    // Held so the socket stays fully open while we read
    _writer: OwnedWriteHalf,
}

impl Watch {
    /// Next record, or `None` once the daemon closes the stream. Blocks
    /// without a deadline; a watch waits as long as the caller does.
    pub async fn next(&mut self) -> Result<Option<CloudEventRecord>, ClientError> {
        let bytes = match protocol::read_message(&mut self.reader).await {
            Ok(bytes) => bytes,
            Err(ProtocolError::ConnectionClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match protocol::decode::<Response>(&bytes)? {
            Response::Event { record } => Ok(Some(record)),
            Response::Error { message } => Err(ClientError::Refused(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(
    root: &Path,
    data_dir: Option<&Path>,
) -> Result<std::process::Child, ClientError> {
    let sluiced = find_daemon_binary();

    let mut command = Command::new(&sluiced);
    command.arg(root);
    if let Some(dir) = data_dir {
        command.arg("--data-dir").arg(dir);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if the daemon was stopped, false if it wasn't running
pub async fn daemon_stop(root: &Path, data_dir: Option<&Path>) -> Result<bool, ClientError> {
    let layout = lifecycle::Config::for_root(root, data_dir)?;

    let client = match DaemonClient::connect(root, data_dir) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            // Clean up any stale files
            cleanup_stale_files(&layout);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    // Try graceful shutdown (timeout handled by send())
    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(&layout) {
        if shutdown_result.is_ok() {
            // Graceful shutdown succeeded, wait for the process to exit
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    // Clean up whatever the daemon did not get to remove itself
    cleanup_stale_files(&layout);

    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the sluiced binary
pub fn find_daemon_binary() -> PathBuf {
    // Explicit override (used by tests to ensure the right binary)
    if let Ok(path) = std::env::var("SLUICE_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // First check if we're running from cargo (development)
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let dev_path = PathBuf::from(manifest_dir)
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("target/debug/sluiced"));
        if let Some(path) = dev_path {
            if path.exists() {
                return path;
            }
        }
    }

    // Check the current executable's directory
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("sluiced");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("sluiced")
}

/// Remove leftovers of a daemon that is no longer running. The socket in
/// particular lingers after a `kill -9`.
fn cleanup_stale_files(layout: &lifecycle::Config) {
    for path in [
        &layout.socket_path,
        &layout.lock_path,
        &layout.version_path,
    ] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Get the pid from the lock file, if a daemon wrote one
pub fn read_daemon_pid(layout: &lifecycle::Config) -> Option<u32> {
    let content = std::fs::read_to_string(&layout.lock_path).ok()?;
    content.trim().parse::<u32>().ok()
}

/// Check if a process with the given pid exists
pub fn process_exists(pid: u32) -> bool {
    // Use kill -0 to check for the process without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find the data root by walking up from the current directory
///
/// Checks the SLUICE_ROOT env var first, then walks up looking for a
/// `sluice.toml`. Falls back to the current directory so a bare daemon
/// with default settings works anywhere.
pub fn find_project_root() -> Result<PathBuf, ClientError> {
    if let Ok(root) = std::env::var("SLUICE_ROOT") {
        return Ok(PathBuf::from(root));
    }

    let current = std::env::current_dir().map_err(|_| ClientError::NoDataRoot)?;
    Ok(find_root_from(&current))
}

fn find_root_from(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if current.join("sluice.toml").is_file() {
            return current;
        }
        if !current.pop() {
            return start.to_path_buf();
        }
    }
}

/// Startup marker prefix the daemon writes to its log before anything else.
/// Full format: "--- sluiced: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- sluiced: starting (pid: ";

/// Read the daemon log from the last startup marker, looking for errors.
/// Returns the error message if found, None otherwise.
pub fn read_startup_error(layout: &lifecycle::Config) -> Option<String> {
    let content = std::fs::read_to_string(&layout.log_path).ok()?;

    // Find the last startup marker
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    // Look for ERROR lines
    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Extract just the error messages (strip timestamp/level prefix)
    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| {
            // Format: "timestamp LEVEL target: message"
            // Take the message part after the first colon-space
            line.split_once(": ").map(|(_, msg)| msg.to_string())
        })
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Wrap an error with startup log info if available.
/// If the daemon log contains errors, return DaemonStartFailed with that
/// info. Otherwise, return the original error.
fn wrap_with_startup_error(err: ClientError, layout: &lifecycle::Config) -> ClientError {
    // Don't double-wrap
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error(layout) {
        ClientError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
