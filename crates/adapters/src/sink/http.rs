// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP delivery sink.

use super::{EventSink, SinkError};
use async_trait::async_trait;
use sluice_core::CloudEvent;
use std::time::Duration;

/// Sink that POSTs events to the subscription's URL.
///
/// The event goes out in the structured JSON binding: the whole envelope as
/// the request body. Any 2xx answer counts as delivered; everything else is
/// an error for the dispatcher's retry loop.
#[derive(Clone, Debug)]
pub struct HttpEventSink {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpEventSink {
    pub fn new(timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn deliver(&self, sink: &str, event: &CloudEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(sink)
            .json(event)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout { timeout: self.timeout }
                } else {
                    SinkError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status { status: status.as_u16() });
        }
        Ok(())
    }
}
