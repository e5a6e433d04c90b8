//! Shared helpers for CLI specs.
//!
//! Every spec gets its own project root and its own state home, wired
//! through the environment so parallel specs never share a socket, a
//! lock file, or a journal.

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// How long specs wait for asynchronous daemon effects.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Store config that keeps events in memory. Specs never restart a
/// daemon, so nothing needs to survive one.
pub const MEMORY_CONFIG: &str = "[store]\nbackend = \"memory\"\n";

/// A minimal order event document, ready to pipe into `emit -`.
pub fn order_event(id: &str, event_type: &str, subject: &str) -> String {
    serde_json::json!({
        "specversion": "1.0",
        "id": id,
        "source": "https://orders.example/web",
        "type": event_type,
        "subject": subject,
    })
    .to_string()
}

/// An isolated project root plus an isolated state home.
pub struct Project {
    root: TempDir,
    state: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            root: TempDir::new().expect("create project dir"),
            state: TempDir::new().expect("create state dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// The isolated state home (stands in for XDG_STATE_HOME).
    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    /// Write a file under the project root, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write project file");
    }

    /// The state directory the daemon picked for this project, once one
    /// exists. The directory name is a hash of the root, so scan for it.
    pub fn daemon_state_dir(&self) -> Option<PathBuf> {
        let projects = self.state.path().join("sluice");
        std::fs::read_dir(projects)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.is_dir())
    }

    /// The daemon log for this project, if one has been written yet.
    pub fn daemon_log(&self) -> Option<String> {
        let log = self.daemon_state_dir()?.join("sluiced.log");
        std::fs::read_to_string(log).ok()
    }

    /// A `sluice` invocation rooted at this project.
    pub fn sluice(&self) -> SluiceCmd {
        let mut cmd = Command::new(sluice_bin());
        cmd.current_dir(self.root.path())
            .env("SLUICE_ROOT", self.root.path())
            .env("XDG_STATE_HOME", self.state.path())
            .env("SLUICE_SOCKET_DIR", self.state.path())
            .env("SLUICE_DAEMON_BINARY", sluiced_bin());
        SluiceCmd { cmd }
    }

    /// A raw `sluice` process builder for streaming commands that never
    /// exit on their own (`watch`).
    pub fn sluice_raw(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(sluice_bin());
        cmd.current_dir(self.root.path())
            .env("SLUICE_ROOT", self.root.path())
            .env("XDG_STATE_HOME", self.state.path())
            .env("SLUICE_SOCKET_DIR", self.state.path())
            .env("SLUICE_DAEMON_BINARY", sluiced_bin());
        cmd
    }
}

/// Specs leak a daemon when an assertion fails between start and stop.
/// Reap by pid so a red run does not leave processes behind.
impl Drop for Project {
    fn drop(&mut self) {
        let Some(dir) = self.daemon_state_dir() else {
            return;
        };
        let Ok(content) = std::fs::read_to_string(dir.join("sluiced.lock")) else {
            return;
        };
        if let Ok(pid) = content.trim().parse::<u32>() {
            let _ = std::process::Command::new("kill")
                .args(["-TERM", &pid.to_string()])
                .status();
        }
    }
}

fn sluice_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("sluice")
}

fn sluiced_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("sluiced")
}

/// Builder around one CLI invocation.
pub struct SluiceCmd {
    cmd: Command,
}

impl SluiceCmd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn stdin(mut self, input: &str) -> Self {
        self.cmd.write_stdin(input.to_string());
        self
    }

    /// Run and require exit code zero.
    pub fn passes(mut self) -> SpecAssert {
        SpecAssert { assert: self.cmd.assert().success() }
    }

    /// Run and require a nonzero exit code.
    pub fn fails(mut self) -> SpecAssert {
        SpecAssert { assert: self.cmd.assert().failure() }
    }
}

/// Chainable assertions over a finished invocation.
pub struct SpecAssert {
    assert: Assert,
}

impl SpecAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        Self { assert: self.assert.stdout(predicate::str::contains(needle)) }
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        Self { assert: self.assert.stdout(predicate::str::contains(needle).not()) }
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        Self { assert: self.assert.stderr(predicate::str::contains(needle)) }
    }

    pub fn stderr_lacks(self, needle: &str) -> Self {
        Self { assert: self.assert.stderr(predicate::str::contains(needle).not()) }
    }

    /// Raw stdout, for structural assertions.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }
}

/// Poll `check` until it holds or `max_ms` elapses.
pub fn wait_for(max_ms: u64, check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
