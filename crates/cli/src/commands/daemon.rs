// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice daemon` - Manage the background daemon

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::client::{self, DaemonClient};
use sluice_daemon::lifecycle;

#[derive(clap::Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Stop the daemon
    Stop,
    /// Show whether the daemon is running
    Status,
    /// Run the daemon in the foreground (blocks until it exits)
    Run,
    /// Print the tail of the daemon log
    Logs {
        /// Number of lines from the end of the log
        #[arg(long, default_value = "50")]
        lines: usize,
    },
}

pub async fn handle(args: DaemonArgs, root: &Path, data_dir: Option<&Path>) -> Result<()> {
    match args.command {
        DaemonCommand::Start => start(root, data_dir).await,
        DaemonCommand::Stop => stop(root, data_dir).await,
        DaemonCommand::Status => status(root, data_dir).await,
        DaemonCommand::Run => run_foreground(root, data_dir),
        DaemonCommand::Logs { lines } => logs(root, data_dir, lines),
    }
}

async fn start(root: &Path, data_dir: Option<&Path>) -> Result<()> {
    match DaemonClient::connect(root, data_dir) {
        Ok(_) => {
            println!("Daemon already running");
            Ok(())
        }
        Err(client::ClientError::DaemonNotRunning) => {
            DaemonClient::connect_or_start(root, data_dir).await?;
            println!("Daemon started");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn stop(root: &Path, data_dir: Option<&Path>) -> Result<()> {
    if client::daemon_stop(root, data_dir).await? {
        println!("Daemon stopped");
    } else {
        println!("Daemon not running");
    }
    Ok(())
}

async fn status(root: &Path, data_dir: Option<&Path>) -> Result<()> {
    let client = match DaemonClient::connect(root, data_dir) {
        Ok(client) => client,
        Err(client::ClientError::DaemonNotRunning) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let protocol = client.handshake().await?;
    let layout = client.layout();

    println!("Status: running");
    if let Some(pid) = client::read_daemon_pid(layout) {
        println!("Pid: {}", pid);
    }
    if let Ok(version) = std::fs::read_to_string(&layout.version_path) {
        println!("Version: {}", version.trim());
    }
    println!("Protocol: {}", protocol);
    println!("Socket: {}", layout.socket_path.display());
    Ok(())
}

/// Run sluiced in the foreground with inherited stdio. Signals go to the
/// child along with the rest of the foreground process group.
fn run_foreground(root: &Path, data_dir: Option<&Path>) -> Result<()> {
    let sluiced = client::find_daemon_binary();

    let mut command = std::process::Command::new(&sluiced);
    command.arg(root).arg("--foreground");
    if let Some(dir) = data_dir {
        command.arg("--data-dir").arg(dir);
    }

    let status = command
        .status()
        .with_context(|| format!("running {}", sluiced.display()))?;
    if !status.success() {
        anyhow::bail!("sluiced exited with {}", status);
    }
    Ok(())
}

fn logs(root: &Path, data_dir: Option<&Path>, lines: usize) -> Result<()> {
    let layout = lifecycle::Config::for_root(root, data_dir)?;
    let content = std::fs::read_to_string(&layout.log_path)
        .with_context(|| format!("no daemon log at {}", layout.log_path.display()))?;

    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    for line in &all[start..] {
        println!("{}", line);
    }
    Ok(())
}
