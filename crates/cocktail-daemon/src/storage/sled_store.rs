use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cocktail_types::{CocktailError, CocktailResult, Event};
use sled::{Db, Tree};
use tracing::{info, warn};

use super::config::{SchemaInfo, StorageConfig};
use super::events::{decode_row, encode_row, EventRow};
use super::metrics::StorageMetrics;
use super::EventStore;

const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_KEY: &[u8] = b"__schema_version__";
const SEQUENCE_KEY: &[u8] = b"__next_sequence__";

/// Durable event log backed by a single `sled::Tree`, rows keyed by a
/// monotonic sequence number so replay always observes persist order.
pub struct SledEventStore {
    db: Db,
    events: Tree,
    schema: Tree,
    metrics: Arc<StorageMetrics>,
    storage_config: StorageConfig,
}

impl SledEventStore {
    pub fn open(config: StorageConfig) -> CocktailResult<Self> {
        info!(path = ?config.path, "opening event store");
        let sled_config = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity_bytes)
            .mode(sled::Mode::HighThroughput);
        let sled_config = sled_config.flush_every_ms(config.flush_every_ms);

        let db = sled_config
            .open()
            .map_err(|e| CocktailError::Storage(format!("failed to open database: {e}")))?;

        let store = Self::from_db(db, config)?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn from_db(db: Db, storage_config: StorageConfig) -> CocktailResult<Self> {
        let events = db
            .open_tree("events")
            .map_err(|e| CocktailError::Storage(format!("failed to open events tree: {e}")))?;
        let schema = db
            .open_tree("schema")
            .map_err(|e| CocktailError::Storage(format!("failed to open schema tree: {e}")))?;
        Ok(Self { db, events, schema, metrics: Arc::new(StorageMetrics::new()), storage_config })
    }

    fn ensure_schema(&self) -> CocktailResult<()> {
        match self.schema_version()? {
            None => {
                let info = SchemaInfo {
                    version: CURRENT_SCHEMA_VERSION,
                    created_at: Utc::now().timestamp(),
                    last_migration: None,
                    migrations_applied: Vec::new(),
                };
                let bytes = bincode::serialize(&info)
                    .map_err(|e| CocktailError::Storage(format!("failed to serialize schema: {e}")))?;
                self.schema
                    .insert(SCHEMA_KEY, bytes)
                    .map_err(|e| CocktailError::Storage(format!("failed to store schema: {e}")))?;
                self.flush()
            }
            Some(v) if v > CURRENT_SCHEMA_VERSION => Err(CocktailError::Storage(format!(
                "database schema version {v} is newer than supported {CURRENT_SCHEMA_VERSION}"
            ))),
            Some(_) => Ok(()),
        }
    }

    pub fn schema_version(&self) -> CocktailResult<Option<u32>> {
        match self.schema.get(SCHEMA_KEY).map_err(|e| CocktailError::Storage(e.to_string()))? {
            Some(bytes) => {
                let info: SchemaInfo = bincode::deserialize(&bytes)
                    .map_err(|e| CocktailError::Storage(format!("failed to deserialize schema: {e}")))?;
                Ok(Some(info.version))
            }
            None => Ok(None),
        }
    }

    fn next_sequence(&self) -> CocktailResult<u64> {
        let current = match self.events.get(SEQUENCE_KEY).map_err(|e| CocktailError::Storage(e.to_string()))? {
            Some(bytes) => u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or_default()),
            None => 0,
        };
        self.events
            .insert(SEQUENCE_KEY, &(current + 1).to_be_bytes())
            .map_err(|e| CocktailError::Storage(e.to_string()))?;
        Ok(current)
    }

    pub fn flush(&self) -> CocktailResult<()> {
        self.metrics.flushes.fetch_add(1, Ordering::Relaxed);
        self.db.flush().map_err(|e| CocktailError::Storage(format!("flush error: {e}")))?;
        Ok(())
    }

    pub fn storage_metrics(&self) -> Arc<StorageMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn size_on_disk(&self) -> CocktailResult<u64> {
        self.db.size_on_disk().map_err(|e| CocktailError::Storage(e.to_string()))
    }
}

impl EventStore for SledEventStore {
    fn persist_events(&self, events: &[(DateTime<Utc>, Event)]) -> CocktailResult<()> {
        for (timestamp, event) in events {
            let sequence = self.next_sequence()?;
            let row = EventRow { sequence, timestamp: *timestamp, event: event.clone() };
            let bytes = encode_row(&row)?;
            self.events
                .insert(sequence.to_be_bytes(), bytes)
                .map_err(|e| CocktailError::Storage(format!("failed to append event: {e}")))?;
            self.metrics.writes.fetch_add(1, Ordering::Relaxed);
        }
        self.flush()
    }

    fn load_all(&self) -> CocktailResult<Vec<EventRow>> {
        let mut rows = Vec::new();
        for entry in self.events.iter() {
            let (key, value) = entry.map_err(|e| CocktailError::Storage(e.to_string()))?;
            if key.as_ref() == SEQUENCE_KEY {
                continue;
            }
            match decode_row(&value) {
                Ok(row) => rows.push(row),
                Err(e) => warn!(error = %e, "skipping undecodable event row"),
            }
        }
        rows.sort_by_key(|r| r.sequence);
        self.metrics.reads.fetch_add(1, Ordering::Relaxed);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::{OrderId, SlotPath, StationKind};
    use tempfile::tempdir;

    #[test]
    fn persisted_events_replay_in_order() {
        let dir = tempdir().unwrap();
        let store = SledEventStore::open(StorageConfig { path: dir.path().to_path_buf(), ..Default::default() }).unwrap();

        let order_id = OrderId::new();
        store
            .persist_events(&[
                (Utc::now(), Event::OrderEnqueued { order_id }),
                (Utc::now(), Event::AmountPoured {
                    slot_path: SlotPath { station: StationKind::Zapf, slot_id: 0 },
                    ml: 30.0,
                }),
            ])
            .unwrap();

        let rows = store.load_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sequence, 0);
        assert_eq!(rows[1].sequence, 1);
    }
}
