// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op schema registry for when payload validation is disabled.

use super::{EventSchema, SchemaRegistry, SchemaRegistryError};
use async_trait::async_trait;

/// Schema registry that knows no schemas.
///
/// Every lookup succeeds with `None`, so admission skips payload checks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSchemaRegistry;

impl NoOpSchemaRegistry {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaRegistry for NoOpSchemaRegistry {
    async fn fetch_schema(
        &self,
        _event_type: &str,
        _dataschema: Option<&str>,
    ) -> Result<Option<EventSchema>, SchemaRegistryError> {
        Ok(None)
    }
}
