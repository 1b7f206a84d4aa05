use crate::core::table::{Row, Table, last_wins};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory table, gone when the process exits.
pub struct MemoryTable<R: Row> {
    name: String,
    rows: Arc<RwLock<Vec<R>>>,
}

impl<R: Row> MemoryTable<R> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_rows(name: &str, rows: Vec<R>) -> Self {
        Self {
            name: name.to_string(),
            rows: Arc::new(RwLock::new(last_wins(rows))),
        }
    }
}

#[async_trait]
impl<R: Row> Table<R> for MemoryTable<R> {
    async fn read_all(&self) -> Result<Vec<R>> {
        let rows = self.rows.read().await;
        debug!(table = %self.name, count = rows.len(), "Table READ");
        Ok(rows.clone())
    }

    async fn replace_all(&self, rows: Vec<R>) -> Result<()> {
        let rows = last_wins(rows);
        let mut current = self.rows.write().await;
        debug!(table = %self.name, count = rows.len(), "Table REPLACE");
        *current = rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateEntity;
    use chrono::Utc;

    fn rate(symbol: &str, value: f64) -> RateEntity {
        RateEntity {
            name: format!("{symbol} name"),
            symbol: symbol.to_string(),
            value,
            variation: 0.0,
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_replace_then_read() {
        let table = MemoryTable::new("rates");
        assert!(table.read_all().await.unwrap().is_empty());

        let rows = vec![rate("USD", 5.2), rate("EUR", 5.6)];
        table.replace_all(rows.clone()).await.unwrap();
        assert_eq!(table.read_all().await.unwrap(), rows);
    }

    #[tokio::test]
    async fn test_replace_drops_previous_rows() {
        let table = MemoryTable::with_rows("rates", vec![rate("USD", 5.0), rate("ARS", 0.01)]);

        let rows = vec![rate("USD", 5.2), rate("EUR", 5.6)];
        table.replace_all(rows.clone()).await.unwrap();
        assert_eq!(table.read_all().await.unwrap(), rows);
    }

    #[tokio::test]
    async fn test_duplicate_keys_last_wins() {
        let table = MemoryTable::new("rates");
        table
            .replace_all(vec![rate("USD", 5.0), rate("EUR", 5.6), rate("USD", 5.3)])
            .await
            .unwrap();

        let rows = table.read_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "EUR");
        assert_eq!(rows[1].symbol, "USD");
        assert_eq!(rows[1].value, 5.3);
    }
}
