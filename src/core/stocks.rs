//! Stock market indices

use crate::core::feed::Feed;
use crate::core::format::{locale_f64, locale_f64_opt};
use crate::core::table::Row;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StockQuote {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(deserialize_with = "locale_f64")]
    pub points: f64,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub variation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntity {
    pub name: String,
    /// Ticker, e.g. `IBOVESPA`.
    pub symbol: String,
    pub location: String,
    pub value: f64,
    pub variation: f64,
    pub observed_at: DateTime<Utc>,
}

impl Row for StockEntity {
    fn primary_key(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockUiModel {
    pub name: String,
    pub full_name: String,
    pub city_location: String,
    pub country_location: String,
    pub points: f64,
    pub variation: f64,
    pub stock_date: DateTime<Utc>,
}

pub struct Stocks;

impl Feed for Stocks {
    type Quote = StockQuote;
    type Entity = StockEntity;
    type Model = StockUiModel;

    const TABLE: &'static str = "stocks";
    const DEFAULT_FIELDS: &'static str = "stocks";
    const GROUP: &'static str = "stocks";

    fn to_entity(key: &str, quote: &StockQuote, fetched_at: DateTime<Utc>) -> StockEntity {
        StockEntity {
            name: quote.name.clone(),
            symbol: key.to_string(),
            location: quote.location.clone(),
            value: quote.points,
            variation: quote.variation.unwrap_or_default(),
            observed_at: fetched_at,
        }
    }

    fn entity_to_model(entity: &StockEntity) -> StockUiModel {
        let (city, country) = split_location(&entity.location);
        StockUiModel {
            name: entity.symbol.clone(),
            full_name: entity.name.clone(),
            city_location: city,
            country_location: country,
            points: entity.value,
            variation: entity.variation,
            stock_date: entity.observed_at,
        }
    }
}

// "Sao Paulo, Brazil" -> ("Sao Paulo", "Brazil")
fn split_location(location: &str) -> (String, String) {
    match location.rsplit_once(',') {
        Some((city, country)) => (city.trim().to_string(), country.trim().to_string()),
        None => (location.trim().to_string(), String::new()),
    }
}

/// Case-insensitive substring match on ticker or full name. An empty
/// query keeps every stock.
pub fn filter_stocks<'a>(stocks: &'a [StockUiModel], query: &str) -> Vec<&'a StockUiModel> {
    let needle = query.trim().to_lowercase();
    stocks
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.name.to_lowercase().contains(&needle)
                || s.full_name.to_lowercase().contains(&needle)
        })
        .collect()
}
