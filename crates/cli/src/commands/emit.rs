// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice emit [FILE]` - Send one CloudEvent through admission

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sluice_core::CloudEvent;

#[derive(Args)]
pub struct EmitArgs {
    /// CloudEvent JSON document; `-` or absent reads stdin
    pub file: Option<PathBuf>,
}

impl EmitArgs {
    /// Load the document, minting an id when the producer left it out.
    pub fn load_event(&self) -> Result<CloudEvent> {
        let text = match &self.file {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
            _ => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading stdin")?;
                buffer
            }
        };

        let mut document: serde_json::Value =
            serde_json::from_str(&text).context("parsing event document")?;
        if let Some(map) = document.as_object_mut() {
            map.entry("id")
                .or_insert_with(|| serde_json::Value::String(uuid::Uuid::new_v4().to_string()));
        }

        serde_json::from_value(document).context("not a CloudEvent document")
    }
}
