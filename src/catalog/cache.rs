use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{NovaError, Result};

/// Last successfully fetched lists for a catalog kind, kept in a sled tree so
/// a new store can render something before its first refresh returns.
#[derive(Clone)]
pub struct SnapshotCache {
    tree: sled::Tree,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot<E, I> {
    entities: Vec<E>,
    installs: Vec<I>,
    saved_at: i64,
}

#[derive(Debug, Clone)]
pub struct Snapshot<E, I> {
    pub entities: Vec<E>,
    pub installs: Vec<I>,
    pub saved_at: DateTime<Utc>,
}

impl SnapshotCache {
    pub fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }

    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree("catalog_snapshots")?;
        Ok(Self::new(tree))
    }

    pub fn save<E: Serialize, I: Serialize>(
        &self,
        key: &str,
        entities: &[E],
        installs: &[I],
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Borrowed<'a, E, I> {
            entities: &'a [E],
            installs: &'a [I],
            saved_at: i64,
        }

        let encoded = serde_json::to_vec(&Borrowed {
            entities,
            installs,
            saved_at: Utc::now().timestamp(),
        })
        .map_err(|e| NovaError::internal(format!("Failed to encode snapshot: {}", e)))?;
        self.tree.insert(key.as_bytes(), encoded)?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn load<E: DeserializeOwned, I: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Snapshot<E, I>>> {
        let Some(bytes) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };
        let stored: StoredSnapshot<E, I> = serde_json::from_slice(&bytes)
            .map_err(|e| NovaError::internal(format!("Failed to parse snapshot: {}", e)))?;
        let saved_at = Utc
            .timestamp_opt(stored.saved_at, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Ok(Some(Snapshot {
            entities: stored.entities,
            installs: stored.installs,
            saved_at,
        }))
    }

    pub fn clear(&self, key: &str) -> Result<()> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }
}
