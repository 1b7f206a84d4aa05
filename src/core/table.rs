//! Local store abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::fmt::Debug;

/// A persisted row. Its primary key is unique within a table.
pub trait Row: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn primary_key(&self) -> &str;
}

/// A key-less table that is only ever replaced wholesale.
#[async_trait]
pub trait Table<R: Row>: Send + Sync {
    /// All rows, in the order they were written.
    async fn read_all(&self) -> Result<Vec<R>>;

    /// Atomically swaps the table content for `rows`. Rows sharing a
    /// primary key collapse into the last one.
    async fn replace_all(&self, rows: Vec<R>) -> Result<()>;
}

/// Drops earlier duplicates of a primary key, keeping the position and the
/// value of the last occurrence.
pub(crate) fn last_wins<R: Row>(rows: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut deduped: Vec<R> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert(row.primary_key().to_string()))
        .collect();
    deduped.reverse();
    deduped
}
