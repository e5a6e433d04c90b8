// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::sync::Arc;

use tokio::net::unix::OwnedWriteHalf;
use tokio::net::UnixStream;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::protocol::{
    self, Request, Response, SubscriptionStatus, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
use sluice_adapters::{
    CounterMetrics, ExprEvaluator, HttpEventSink, MetricsSink, StaticSchemaRegistry, TracedSink,
};
use sluice_broker::Broker;
use sluice_core::{PartitionReference, SystemClock};
use sluice_gateway::AdmissionPipeline;
use sluice_store::{EventStore, ReadRequest};

/// Admission pipeline with the daemon's concrete collaborators
pub type DaemonPipeline =
    AdmissionPipeline<StaticSchemaRegistry, ExprEvaluator, SystemClock, CounterMetrics>;

/// Broker with the daemon's concrete collaborators, deliveries traced
pub type DaemonBroker<S> = Broker<S, ExprEvaluator, TracedSink<HttpEventSink>, CounterMetrics>;

/// Everything a connection needs, shared across connection tasks.
pub struct ServerState<S: EventStore> {
    pub store: S,
    pub pipeline: DaemonPipeline,
    pub broker: Arc<DaemonBroker<S>>,
    pub metrics: CounterMetrics,
    /// Flipped by a `Shutdown` request; the main loop watches the receiver.
    pub shutdown: watch::Sender<bool>,
}

/// Handle a single client connection: one request, one response, except
/// `Watch` which streams until the client hangs up.
pub async fn handle_connection<S: EventStore>(
    state: Arc<ServerState<S>>,
    stream: UnixStream,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    if let Request::Watch { partition, from } = request {
        return stream_events(&state, partition, from, &mut writer).await;
    }

    let response = handle_request(&state, request).await;

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
async fn handle_request<S: EventStore>(state: &ServerState<S>, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong { version: PROTOCOL_VERSION.to_string() },

        Request::Ingest { event } => match state.pipeline.evaluate(event).await {
            Ok(admitted) => match state.store.append(admitted).await {
                Ok(record) => {
                    state.metrics.increment_ingested();
                    Response::Ingested { record }
                }
                Err(e) => Response::Error { message: e.to_string() },
            },
            Err(outcome) => Response::NotAdmitted { outcome },
        },

        Request::Read { partition, direction, offset, length } => {
            let page = ReadRequest { direction, offset, length };
            let result = match &partition {
                Some(partition) => state.store.read_partition(partition, page).await,
                None => state.store.read(page).await,
            };
            match result {
                Ok(records) => Response::Records { records },
                Err(e) => Response::Error { message: e.to_string() },
            }
        }

        Request::Meta { partition } => match partition {
            Some(partition) => match state.store.partition_metadata(&partition).await {
                Ok(meta) => Response::PartitionMeta { meta },
                Err(e) => Response::Error { message: e.to_string() },
            },
            None => match state.store.stream_metadata().await {
                Ok(meta) => Response::StreamMeta { meta },
                Err(e) => Response::Error { message: e.to_string() },
            },
        },

        Request::Partitions { kind } => match state.store.list_partition_ids(kind).await {
            Ok(ids) => Response::PartitionIds { ids },
            Err(e) => Response::Error { message: e.to_string() },
        },

        Request::Subscriptions => {
            let statuses = state
                .broker
                .statuses()
                .into_iter()
                .map(|(id, phase)| SubscriptionStatus { id, phase })
                .collect();
            Response::Subscriptions { statuses }
        }

        // Watch never reaches here; handle_connection takes the streaming path.
        Request::Watch { .. } => Response::Error { message: "watch is a streaming request".to_string() },

        Request::Shutdown => {
            let _ = state.shutdown.send(true);
            Response::ShuttingDown
        }
    }
}

/// Stream `Response::Event` frames from a live store subscription until
/// the client disconnects or the daemon shuts down.
async fn stream_events<S: EventStore>(
    state: &ServerState<S>,
    partition: Option<PartitionReference>,
    from: Option<u64>,
    writer: &mut OwnedWriteHalf,
) -> Result<(), ServerError> {
    let mut events = match partition {
        Some(partition) => state.store.subscribe_partition(partition, from),
        None => state.store.subscribe(from),
    };
    let mut shutdown = state.shutdown.subscribe();

    loop {
        let record = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            next = events.next() => match next {
                Some(record) => record,
                None => return Ok(()),
            },
        };

        let response = Response::Event { record };
        if let Err(e) = protocol::write_response(writer, &response, DEFAULT_TIMEOUT).await {
            // The client going away is how a watch ends.
            debug!("Watch connection closed: {}", e);
            return Ok(());
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
