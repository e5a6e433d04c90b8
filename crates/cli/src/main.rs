// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice - CloudEvents gateway, event store, and subscription broker

mod client;
mod commands;
mod completions;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::{find_project_root, DaemonClient, EmitReply};
use crate::completions::CompletionsArgs;
use commands::{daemon, emit, meta, partitions, read, watch};
use sluice_core::CloudEventRecord;

#[derive(Parser)]
#[command(
    name = "sluice",
    version,
    about = "Sluice - CloudEvents gateway, partitioned event store, and subscription broker"
)]
struct Cli {
    /// Data root directory (defaults to the nearest ancestor with a sluice.toml)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Keep all daemon state under one directory instead of the XDG layout
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Machine-readable JSON output instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a CloudEvent from a file or stdin
    Emit(emit::EmitArgs),
    /// Page through the stream or one partition
    Read(read::ReadArgs),
    /// Show stream or partition metadata
    Meta(meta::MetaArgs),
    /// List populated partitions of one kind
    Partitions(partitions::PartitionsArgs),
    /// Show subscription phases
    Subs,
    /// Stream records live as they are appended
    Watch(watch::WatchArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Completions need neither a data root nor a daemon
    if let Commands::Completions(args) = cli.command {
        completions::generate_completions::<Cli>(args.shell);
        return Ok(());
    }

    let root = cli.root.map_or_else(find_project_root, Ok)?;

    // Daemon management commands handle the connection lifecycle themselves
    if let Commands::Daemon(args) = cli.command {
        return daemon::handle(args, &root, cli.data_dir.as_deref()).await;
    }

    // Everything else talks to a running daemon, starting one if needed
    let client = DaemonClient::connect_or_start(&root, cli.data_dir.as_deref()).await?;

    match cli.command {
        Commands::Emit(args) => {
            let event = args.load_event()?;
            match client.emit(event).await? {
                EmitReply::Admitted(record) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    } else {
                        println!("Ingested: sequence {}", record.sequence);
                    }
                }
                EmitReply::Refused(outcome) => {
                    if cli.json {
                        eprintln!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        eprintln!("Refused ({}): {}", outcome.code(), outcome);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Read(args) => {
            let direction = args.direction();
            let records = client
                .read(args.partition, direction, args.offset, args.length)
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No events");
            } else {
                print_records(&records);
            }
        }

        Commands::Meta(args) => match args.partition {
            Some(partition) => {
                let meta = client.partition_meta(partition).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&meta)?);
                } else {
                    println!("Partition: {}", meta.partition);
                    println!("  First sequence: {}", meta.first_sequence);
                    println!("  Last sequence: {}", meta.last_sequence);
                    println!("  Length: {}", meta.length);
                }
            }
            None => {
                let meta = client.stream_meta().await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&meta)?);
                } else {
                    println!("Stream:");
                    println!("  First sequence: {}", seq_or_dash(meta.first_sequence));
                    println!("  Last sequence: {}", seq_or_dash(meta.last_sequence));
                    println!("  Length: {}", meta.length);
                }
            }
        },

        Commands::Partitions(args) => {
            let ids = client.partitions(args.kind).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&ids)?);
            } else if ids.is_empty() {
                println!("No partitions");
            } else {
                for id in ids {
                    println!("{}", id);
                }
            }
        }

        Commands::Subs => {
            let statuses = client.subscriptions().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else if statuses.is_empty() {
                println!("No subscriptions");
            } else {
                println!("{:<24} PHASE", "SUBSCRIPTION");
                for status in statuses {
                    println!("{:<24} {}", status.id, status.phase);
                }
            }
        }

        Commands::Watch(args) => {
            let mut stream = client.watch(args.partition, args.from).await?;
            while let Some(record) = stream.next().await? {
                if cli.json {
                    // One JSON document per line, friendly to pipes
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    print_record_line(&record);
                }
            }
        }

        Commands::Daemon(_) | Commands::Completions(_) => unreachable!(),
    }

    Ok(())
}

fn print_records(records: &[CloudEventRecord]) {
    println!("{:<8} {:<28} {:<28} SUBJECT", "SEQ", "TYPE", "SOURCE");
    for record in records {
        print_record_line(record);
    }
}

fn print_record_line(record: &CloudEventRecord) {
    println!(
        "{:<8} {:<28} {:<28} {}",
        record.sequence,
        clip(&record.event.event_type, 28),
        clip(&record.event.source, 28),
        record.event.subject.as_deref().unwrap_or("-")
    );
}

fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn seq_or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
