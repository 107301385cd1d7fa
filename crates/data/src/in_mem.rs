// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::StringStorage;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile storage for tests and short-lived sessions.
#[derive(Default)]
pub struct InMemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StringStorage for InMemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.data.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_values() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_item("missing").await.unwrap(), None);

        storage.set_item("key", "value").await.unwrap();
        assert_eq!(
            storage.get_item("key").await.unwrap(),
            Some("value".to_string())
        );

        storage.set_item("key", "other").await.unwrap();
        assert_eq!(
            storage.get_item("key").await.unwrap(),
            Some("other".to_string())
        );

        storage.remove_item("key").await.unwrap();
        assert_eq!(storage.get_item("key").await.unwrap(), None);
    }
}
