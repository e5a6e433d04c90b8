// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between the CLI and the daemon.
//!
//! Frames are serde_json documents behind a 4-byte big-endian length
//! prefix. Each connection carries one request and one response, except
//! `Watch`, where the daemon keeps the connection open and streams
//! `Response::Event` frames until the client hangs up.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use sluice_core::{
    CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference, PartitionType,
    StreamMetadata, SubscriptionPhase,
};

// Re-exported so protocol clients can speak the wire shapes without
// depending on the gateway and store crates themselves.
pub use sluice_gateway::AdmissionOutcome;
pub use sluice_store::Direction;

/// Bumped whenever the wire shapes change incompatibly. The CLI checks
/// this against `Pong` before trusting anything else from the socket.
pub const PROTOCOL_VERSION: &str = "1";

/// Per-frame read/write deadline on the daemon side.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for one frame: roomy for an event payload plus a full
/// read page, small enough to refuse a garbage length prefix outright.
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Request {
    /// Liveness and protocol-version probe.
    Ping,
    /// Run one event through admission and, if admitted, append it.
    Ingest { event: CloudEvent },
    /// Page through the stream, or one partition of it.
    Read {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition: Option<PartitionReference>,
        #[serde(default)]
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
        length: u64,
    },
    /// Stream metadata, or one partition's when a reference is given.
    Meta {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition: Option<PartitionReference>,
    },
    /// Ids of every populated partition of one kind.
    Partitions { kind: PartitionType },
    /// Phase of every subscription the broker knows about.
    Subscriptions,
    /// Hold the connection open and stream records as they land.
    Watch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition: Option<PartitionReference>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<u64>,
    },
    /// Acknowledge, then stop the daemon.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Response {
    Pong { version: String },
    Ingested { record: CloudEventRecord },
    NotAdmitted { outcome: AdmissionOutcome },
    Records { records: Vec<CloudEventRecord> },
    StreamMeta { meta: StreamMetadata },
    PartitionMeta { meta: PartitionMetadata },
    PartitionIds { ids: Vec<String> },
    Subscriptions { statuses: Vec<SubscriptionStatus> },
    /// One frame per record on a `Watch` connection.
    Event { record: CloudEventRecord },
    ShuttingDown,
    Error { message: String },
}

/// One row of the `Subscriptions` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub id: String,
    pub phase: SubscriptionPhase,
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out waiting for the peer")]
    Timeout,

    #[error("frame of {got} bytes exceeds the {max} byte limit")]
    FrameTooLarge { got: usize, max: usize },

    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a message to its raw JSON body, without the length prefix.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Parse a frame body produced by [`encode`].
pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write one length-prefixed frame.
pub async fn write_message<W>(writer: &mut W, bytes: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge { got: bytes.len(), max: MAX_FRAME_BYTES });
    }
    let len = bytes.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame. A clean EOF before or inside a frame
/// reads as `ConnectionClosed`, never as an IO error.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    read_exact_or_closed(reader, &mut prefix).await?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge { got: len, max: MAX_FRAME_BYTES });
    }

    let mut body = vec![0u8; len];
    read_exact_or_closed(reader, &mut body).await?;
    Ok(body)
}

async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}

/// Read and decode one request, failing with `Timeout` past the deadline.
pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Encode and write one response, failing with `Timeout` past the deadline.
pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
