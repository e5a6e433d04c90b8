// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry backed by a fixed catalog loaded at startup.

use super::{EventSchema, SchemaRegistry, SchemaRegistryError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors loading the schema catalog document.
#[derive(Debug, Error)]
pub enum SchemaCatalogError {
    #[error("failed to read schema catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct CatalogDocument {
    schemas: HashMap<String, EventSchema>,
}

/// Schema registry serving a catalog fixed at construction time.
///
/// Schemas are keyed by event type. The `dataschema` attribute is accepted
/// but not used for selection; the catalog holds one schema per type.
/// Lookups never fail, so this registry never reports `Unavailable`.
#[derive(Clone, Debug, Default)]
pub struct StaticSchemaRegistry {
    schemas: Arc<HashMap<String, EventSchema>>,
}

impl StaticSchemaRegistry {
    /// Registry with no schemas at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog from a TOML document.
    ///
    /// ```toml
    /// [schemas."order.created"]
    /// root = "object"
    /// required = ["order-id", "amount"]
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaCatalogError> {
        let document: CatalogDocument = toml::from_str(text)?;
        Ok(Self { schemas: Arc::new(document.schemas) })
    }

    /// Load a catalog from a TOML file. A missing file yields an empty
    /// catalog so deployments without schemas need no configuration.
    pub fn load(path: &Path) -> Result<Self, SchemaCatalogError> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| SchemaCatalogError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Number of schemas in the catalog.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[async_trait]
impl SchemaRegistry for StaticSchemaRegistry {
    async fn fetch_schema(
        &self,
        event_type: &str,
        _dataschema: Option<&str>,
    ) -> Result<Option<EventSchema>, SchemaRegistryError> {
        Ok(self.schemas.get(event_type).cloned())
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
