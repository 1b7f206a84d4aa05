//! Cache-aside synchronization for a single feed
//!
//! One cycle asks the remote fetcher first. Fresh data replaces the local
//! table and is shown as [`DataSource::Network`]. When the fetch fails the
//! last stored rows are shown as [`DataSource::Local`], and only when the
//! table is empty too does the cycle end in an error.

use crate::core::feed::{Feed, QuoteFetcher};
use crate::core::result::{DataSource, UiState};
use crate::core::table::Table;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub type FeedResult<F> = UiState<Vec<<F as Feed>::Model>>;

/// Issues monotonically increasing cycle numbers. Only the most recently
/// started cycle is authoritative.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    latest: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Cycle {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Cycle {
            id,
            latest: Arc::clone(&self.latest),
        }
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct Cycle {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl Cycle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

pub struct Synchronizer<F: Feed> {
    fetcher: Arc<dyn QuoteFetcher<F>>,
    table: Arc<dyn Table<F::Entity>>,
    fields: String,
    write_lock: Mutex<()>,
}

impl<F: Feed> Synchronizer<F> {
    pub fn new(
        fetcher: Arc<dyn QuoteFetcher<F>>,
        table: Arc<dyn Table<F::Entity>>,
        fields: &str,
    ) -> Self {
        Self {
            fetcher,
            table,
            fields: fields.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Runs one cycle to its terminal state. Never returns `Loading`.
    pub async fn sync(&self, cycle: &Cycle) -> FeedResult<F> {
        debug!(feed = F::TABLE, cycle = cycle.id(), "Starting sync cycle");

        match self.fetcher.fetch(&self.fields).await {
            Ok(response) => {
                let entities = F::response_to_entities(&response);
                let models = F::response_to_models(&response);
                self.store(cycle, entities).await;
                info!(
                    feed = F::TABLE,
                    count = models.len(),
                    "Showing data from network"
                );
                UiState::success(models, DataSource::Network)
            }
            Err(e) => {
                warn!(
                    feed = F::TABLE,
                    cause = %e.cause(),
                    "Fetch failed, falling back to local data"
                );
                self.fallback(e.to_string()).await
            }
        }
    }

    async fn store(&self, cycle: &Cycle, entities: Vec<F::Entity>) {
        let _guard = self.write_lock.lock().await;
        if !cycle.is_current() {
            debug!(
                feed = F::TABLE,
                cycle = cycle.id(),
                "Cycle superseded, skipping table write"
            );
            return;
        }
        if let Err(e) = self.table.replace_all(entities).await {
            error!(feed = F::TABLE, error = %e, "Failed to store fetched rows");
        }
    }

    async fn fallback(&self, message: String) -> FeedResult<F> {
        let rows = match self.table.read_all().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(feed = F::TABLE, error = %e, "Failed to read local rows");
                Vec::new()
            }
        };

        if rows.is_empty() {
            warn!(feed = F::TABLE, "No local data available");
            return UiState::error(message);
        }

        info!(feed = F::TABLE, count = rows.len(), "Showing data from local store");
        UiState::success(
            rows.iter().map(F::entity_to_model).collect(),
            DataSource::Local,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::error::{FetchError, NETWORK_ERROR_MESSAGE};
    use crate::core::feed::{Quotes, QuotesResponse};
    use crate::core::rates::{RateEntity, RateQuote, RateUiModel, Rates};
    use crate::store::memory::MemoryTable;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::AtomicUsize;

    pub(crate) fn fetch_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    pub(crate) fn rates_response(quotes: &[(&str, &str, f64, f64)]) -> QuotesResponse<RateQuote> {
        let results = quotes
            .iter()
            .map(|(key, name, buy, variation)| {
                let quote = RateQuote {
                    name: name.to_string(),
                    buy: *buy,
                    sell: None,
                    variation: Some(*variation),
                };
                (key.to_string(), quote)
            })
            .collect();
        QuotesResponse {
            results: Quotes(results),
            fetched_at: fetch_time(),
        }
    }

    pub(crate) fn network_error() -> FetchError {
        FetchError::Decode(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    /// Returns a fixed outcome and counts calls.
    pub(crate) struct StaticFetcher {
        pub response: Option<QuotesResponse<RateQuote>>,
        pub calls: AtomicUsize,
    }

    impl StaticFetcher {
        pub(crate) fn ok(response: QuotesResponse<RateQuote>) -> Self {
            Self {
                response: Some(response),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                response: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteFetcher<Rates> for StaticFetcher {
        async fn fetch(&self, fields: &str) -> Result<QuotesResponse<RateQuote>, FetchError> {
            assert_eq!(fields, "rates");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or_else(network_error)
        }
    }

    struct BrokenTable;

    #[async_trait]
    impl Table<RateEntity> for BrokenTable {
        async fn read_all(&self) -> Result<Vec<RateEntity>> {
            Err(anyhow!("disk on fire"))
        }

        async fn replace_all(&self, _rows: Vec<RateEntity>) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    fn dollar_entity() -> RateEntity {
        RateEntity {
            name: "Dólar Americano".to_string(),
            symbol: "USD".to_string(),
            value: 5.20,
            variation: 0.35,
            observed_at: fetch_time(),
        }
    }

    fn synchronizer(
        fetcher: StaticFetcher,
        table: Arc<dyn Table<RateEntity>>,
    ) -> Synchronizer<Rates> {
        Synchronizer::<Rates>::new(Arc::new(fetcher), table, "rates")
    }

    #[tokio::test]
    async fn test_network_success_replaces_table() {
        let table = Arc::new(MemoryTable::with_rows(
            "rates",
            vec![RateEntity {
                symbol: "ARS".to_string(),
                ..dollar_entity()
            }],
        ));
        let response = rates_response(&[
            ("USD", "Dólar Americano", 5.20, 0.35),
            ("EUR", "Euro", 5.61, -0.1),
        ]);
        let sync = synchronizer(StaticFetcher::ok(response), table.clone());

        let state = sync.sync(&Generation::new().start()).await;

        let UiState::Success { data, source } = state else {
            panic!("expected success, got {state:?}");
        };
        assert_eq!(source, DataSource::Network);
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|m| m.rate_date == fetch_time()));

        let stored = table.read_all().await.unwrap();
        let symbols: Vec<&str> = stored.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USD", "EUR"]);
    }

    #[tokio::test]
    async fn test_failure_with_cache_serves_local() {
        let table = Arc::new(MemoryTable::with_rows("rates", vec![dollar_entity()]));
        let sync = synchronizer(StaticFetcher::failing(), table);

        let state = sync.sync(&Generation::new().start()).await;

        assert_eq!(
            state,
            UiState::success(
                vec![RateUiModel {
                    currency_name: "Dólar Americano".to_string(),
                    currency_term: "USD".to_string(),
                    unitary_rate: 5.20,
                    variation: 0.35,
                    rate_date: fetch_time(),
                }],
                DataSource::Local
            )
        );
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_error() {
        let sync = synchronizer(StaticFetcher::failing(), Arc::new(MemoryTable::<RateEntity>::new("rates")));

        let state = sync.sync(&Generation::new().start()).await;
        assert_eq!(state, UiState::error(NETWORK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_then_failure_serves_what_was_stored() {
        let table: Arc<dyn Table<RateEntity>> = Arc::new(MemoryTable::<RateEntity>::new("rates"));
        let generation = Generation::new();

        let online = synchronizer(
            StaticFetcher::ok(rates_response(&[("USD", "Dólar Americano", 5.20, 0.35)])),
            Arc::clone(&table),
        );
        online.sync(&generation.start()).await;

        let offline = synchronizer(StaticFetcher::failing(), Arc::clone(&table));
        let state = offline.sync(&generation.start()).await;

        assert_eq!(table.read_all().await.unwrap(), vec![dollar_entity()]);
        assert_eq!(state.source(), Some(DataSource::Local));
        let UiState::Success { data, .. } = state else {
            unreachable!()
        };
        assert_eq!(data[0].currency_name, "Dólar Americano");
        assert_eq!(data[0].unitary_rate, 5.20);
        assert_eq!(data[0].variation, 0.35);
        assert_eq!(data[0].rate_date, fetch_time());
    }

    #[tokio::test]
    async fn test_superseded_cycle_does_not_write() {
        let table = Arc::new(MemoryTable::<RateEntity>::new("rates"));
        let sync = synchronizer(
            StaticFetcher::ok(rates_response(&[("USD", "Dólar Americano", 5.20, 0.35)])),
            table.clone(),
        );
        let generation = Generation::new();
        let stale = generation.start();
        let _fresh = generation.start();

        let state = sync.sync(&stale).await;

        assert_eq!(state.source(), Some(DataSource::Network));
        assert!(table.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_broken_table_still_shows_network_data() {
        let sync = synchronizer(
            StaticFetcher::ok(rates_response(&[("USD", "Dólar Americano", 5.20, 0.35)])),
            Arc::new(BrokenTable),
        );
        let state = sync.sync(&Generation::new().start()).await;
        assert_eq!(state.source(), Some(DataSource::Network));

        let sync = synchronizer(StaticFetcher::failing(), Arc::new(BrokenTable));
        let state = sync.sync(&Generation::new().start()).await;
        assert_eq!(state, UiState::error(NETWORK_ERROR_MESSAGE));
    }

    #[test]
    fn test_generation_tracks_latest_cycle() {
        let generation = Generation::new();
        let first = generation.start();
        assert!(first.is_current());

        let second = generation.start();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(generation.latest(), second.id());
    }
}
