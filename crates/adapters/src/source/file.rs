// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription source backed by a directory of TOML documents.

use super::{SubscriptionSource, SubscriptionSourceError};
use async_trait::async_trait;
use sluice_core::Subscription;
use std::path::{Path, PathBuf};

/// Source reading `*.toml` subscription documents from one directory.
///
/// Documents are read in path order. A document that fails to parse is
/// logged and skipped; the rest of the listing still goes through. When
/// two documents declare the same id, the later one wins, so an operator
/// can shadow a resource without deleting it.
#[derive(Clone, Debug)]
pub struct FileSubscriptionSource {
    dir: PathBuf,
}

impl FileSubscriptionSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SubscriptionSource for FileSubscriptionSource {
    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionSourceError> {
        // A missing directory means no subscriptions yet, not a failure;
        // the daemon may start before the first resource is written.
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|source| {
            SubscriptionSourceError::Read { path: self.dir.clone(), source }
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "toml"))
            .collect();
        paths.sort();

        let mut subscriptions: Vec<Subscription> = Vec::new();
        for path in paths {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable subscription document");
                    continue;
                }
            };
            match Subscription::from_toml_str(&text) {
                Ok(subscription) => {
                    if let Some(existing) =
                        subscriptions.iter_mut().find(|s| s.id == subscription.id)
                    {
                        tracing::warn!(
                            path = %path.display(),
                            id = %subscription.id,
                            "duplicate subscription id, later document wins"
                        );
                        *existing = subscription;
                    } else {
                        subscriptions.push(subscription);
                    }
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping malformed subscription document");
                }
            }
        }

        Ok(subscriptions)
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
