use crate::core::table::{Row, Table, last_wins};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct StoredRow<R> {
    seq: u32,
    row: R,
}

/// A table backed by one fjall partition. Keys are primary keys, values
/// are JSON rows tagged with their insertion position.
pub struct DiskTable<R: Row> {
    name: String,
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Row> DiskTable<R> {
    pub fn new(name: &str, keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            name: name.to_string(),
            keyspace,
            partition,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Row> Table<R> for DiskTable<R> {
    async fn read_all(&self) -> Result<Vec<R>> {
        let partition = self.partition.clone();
        let rows = tokio::task::spawn_blocking(move || -> Result<Vec<R>> {
            let mut stored = Vec::new();
            for item in partition.iter() {
                let (key, value) = item?;
                let entry: StoredRow<R> = serde_json::from_slice(&value).with_context(|| {
                    format!("Corrupt row for key {}", String::from_utf8_lossy(&key))
                })?;
                stored.push(entry);
            }
            stored.sort_by_key(|entry| entry.seq);
            Ok(stored.into_iter().map(|entry| entry.row).collect())
        })
        .await??;

        debug!(table = %self.name, count = rows.len(), "Table READ");
        Ok(rows)
    }

    async fn replace_all(&self, rows: Vec<R>) -> Result<()> {
        let rows = last_wins(rows);
        let count = rows.len();
        let keyspace = self.keyspace.clone();
        let partition = self.partition.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let keep: HashSet<Vec<u8>> = rows
                .iter()
                .map(|row| row.primary_key().as_bytes().to_vec())
                .collect();

            // Upsert the new set and drop every key absent from it, all in
            // one batch so readers never see a partial table.
            let mut batch = keyspace.batch();
            for item in partition.iter() {
                let (key, _) = item?;
                if !keep.contains(&*key) {
                    batch.remove(&partition, key);
                }
            }
            for (seq, row) in rows.iter().enumerate() {
                let value = serde_json::to_vec(&StoredRow {
                    seq: seq as u32,
                    row,
                })?;
                batch.insert(&partition, row.primary_key(), value);
            }
            batch.commit()?;
            keyspace.persist(PersistMode::SyncAll)?;
            Ok(())
        })
        .await??;

        debug!(table = %self.name, count, "Table REPLACE");
        Ok(())
    }
}
