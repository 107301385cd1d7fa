// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::StringStorage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Sled-backed storage so cached signatures survive process restarts.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening sled storage at {:?}", path);
        let db = sled::open(path).with_context(|| format!("Error opening sled db at {path:?}"))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl StringStorage for SledStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.db
            .get(key.as_bytes())
            .context("Error reading from sled")?
            .map(|bytes| {
                String::from_utf8(bytes.to_vec()).context("Stored value is not valid UTF-8")
            })
            .transpose()
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .context("Error writing to sled")?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .context("Error removing from sled")?;
        Ok(())
    }
}
