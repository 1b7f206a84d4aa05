//! Feed abstractions: one implementation per data domain

use crate::core::error::FetchError;
use crate::core::table::Row;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// The `results` object of a finance response, in document order.
///
/// Entries whose value is not a JSON object (such as `"source": "BRL"`)
/// are skipped. An object that does not match `T` fails the whole decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Quotes<T>(pub Vec<(String, T)>);

impl<T> Quotes<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Quotes<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        QuotesSeed::<T>::new(None).deserialize(deserializer)
    }
}

/// Decodes `results`. When it has an entry named `group`, the quotes are
/// read from inside that entry and every other entry is ignored. Otherwise
/// the object entries of `results` are the quotes themselves.
struct QuotesSeed<'a, T> {
    group: Option<&'a str>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> QuotesSeed<'a, T> {
    fn new(group: Option<&'a str>) -> Self {
        Self {
            group,
            _marker: PhantomData,
        }
    }
}

fn decode_quote<T: DeserializeOwned, E: de::Error>(key: &str, value: Value) -> Result<T, E> {
    T::deserialize(value).map_err(|e| E::custom(format!("invalid quote {key:?}: {e}")))
}

impl<'de, T: DeserializeOwned> DeserializeSeed<'de> for QuotesSeed<'_, T> {
    type Value = Quotes<T>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: DeserializeOwned> Visitor<'de> for QuotesSeed<'_, T> {
    type Value = Quotes<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of quotes keyed by symbol")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut flat = Vec::with_capacity(map.size_hint().unwrap_or(0));
        let mut grouped: Option<Quotes<T>> = None;
        while let Some(key) = map.next_key::<String>()? {
            if grouped.is_none() && self.group == Some(key.as_str()) {
                grouped = Some(map.next_value_seed(QuotesSeed::<T>::new(None))?);
                continue;
            }
            let value: Value = map.next_value()?;
            if grouped.is_none() && value.is_object() {
                flat.push((key, value));
            }
        }
        if let Some(quotes) = grouped {
            return Ok(quotes);
        }

        let quotes = flat
            .into_iter()
            .map(|(key, value)| decode_quote::<T, A::Error>(&key, value).map(|quote| (key, quote)))
            .collect::<Result<Vec<_>, A::Error>>()?;
        Ok(Quotes(quotes))
    }
}

/// A decoded response, stamped with the moment it was received.
#[derive(Debug, Clone)]
pub struct QuotesResponse<T> {
    pub results: Quotes<T>,
    pub fetched_at: DateTime<Utc>,
}

impl<T: DeserializeOwned> QuotesResponse<T> {
    /// Decodes a finance response body whose quotes may sit under the
    /// `group` key of `results`. Everything outside `results` is ignored.
    pub fn from_json(body: &str, group: &str) -> serde_json::Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(body);
        let results = ResponseSeed::<T> {
            group,
            _marker: PhantomData,
        }
        .deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(QuotesResponse {
            results,
            fetched_at: Utc::now(),
        })
    }
}

struct ResponseSeed<'a, T> {
    group: &'a str,
    _marker: PhantomData<fn() -> T>,
}

impl<'de, T: DeserializeOwned> DeserializeSeed<'de> for ResponseSeed<'_, T> {
    type Value = Quotes<T>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: DeserializeOwned> Visitor<'de> for ResponseSeed<'_, T> {
    type Value = Quotes<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a finance response with a `results` object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut results = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "results" && results.is_none() {
                results = Some(map.next_value_seed(QuotesSeed::<T>::new(Some(self.group)))?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        results.ok_or_else(|| de::Error::missing_field("results"))
    }
}

/// Describes one data domain: what the wire carries, what gets stored and
/// what gets shown.
pub trait Feed: Send + Sync + 'static {
    type Quote: DeserializeOwned + Debug + Send + Sync + 'static;
    type Entity: Row;
    type Model: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Store table (and log label) for this domain.
    const TABLE: &'static str;
    /// Field group requested from the finance endpoint.
    const DEFAULT_FIELDS: &'static str;
    /// Key under `results` that holds this domain's quotes.
    const GROUP: &'static str;

    fn to_entity(key: &str, quote: &Self::Quote, fetched_at: DateTime<Utc>) -> Self::Entity;

    fn entity_to_model(entity: &Self::Entity) -> Self::Model;

    fn to_model(key: &str, quote: &Self::Quote, fetched_at: DateTime<Utc>) -> Self::Model {
        Self::entity_to_model(&Self::to_entity(key, quote, fetched_at))
    }

    fn response_to_entities(response: &QuotesResponse<Self::Quote>) -> Vec<Self::Entity> {
        response
            .results
            .iter()
            .map(|(key, quote)| Self::to_entity(key, quote, response.fetched_at))
            .collect()
    }

    fn response_to_models(response: &QuotesResponse<Self::Quote>) -> Vec<Self::Model> {
        response
            .results
            .iter()
            .map(|(key, quote)| Self::to_model(key, quote, response.fetched_at))
            .collect()
    }
}

/// Fetches one field group from the remote finance service.
#[async_trait]
pub trait QuoteFetcher<F: Feed>: Send + Sync {
    async fn fetch(&self, fields: &str) -> Result<QuotesResponse<F::Quote>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_quotes_keep_document_order_and_skip_scalars() {
        let json = r#"{
            "source": "BRL",
            "USD": {"name": "Dollar"},
            "EUR": {"name": "Euro"},
            "ARS": {"name": "Peso"}
        }"#;
        let quotes: Quotes<Item> = serde_json::from_str(json).unwrap();

        let keys: Vec<&str> = quotes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["USD", "EUR", "ARS"]);
        assert_eq!(quotes.0[1].1.name, "Euro");
    }

    #[test]
    fn test_malformed_quote_fails_decode() {
        let json = r#"{"USD": {"title": "Dollar"}}"#;
        let err = serde_json::from_str::<Quotes<Item>>(json).unwrap_err();
        assert!(err.to_string().contains("invalid quote \"USD\""));
    }

    #[test]
    fn test_response_stamp_defaults_to_now() {
        let before = Utc::now();
        let response =
            QuotesResponse::<Item>::from_json(r#"{"results": {}, "timestamp": "ignored"}"#, "stocks")
                .unwrap();
        assert!(response.results.is_empty());
        assert!(response.fetched_at >= before);
    }

    #[test]
    fn test_grouped_results_keep_document_order() {
        let body = r#"{
            "by": "default",
            "results": {
                "available_sources": ["BRL"],
                "currencies": {
                    "source": "BRL",
                    "USD": {"name": "Dollar"},
                    "EUR": {"name": "Euro"},
                    "ARS": {"name": "Peso"}
                },
                "stocks": {"IBOVESPA": {"points": 1.0}}
            }
        }"#;
        let response = QuotesResponse::<Item>::from_json(body, "currencies").unwrap();

        let keys: Vec<&str> = response.results.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["USD", "EUR", "ARS"]);
    }

    #[test]
    fn test_flat_results_still_decode() {
        let body = r#"{"results": {"IBOVESPA": {"name": "BM&F BOVESPA"}}}"#;
        let response = QuotesResponse::<Item>::from_json(body, "stocks").unwrap();
        assert_eq!(response.results.0, vec![("IBOVESPA".to_string(), Item { name: "BM&F BOVESPA".to_string() })]);
    }

    #[test]
    fn test_malformed_grouped_quote_fails_decode() {
        let body = r#"{"results": {"stocks": {"IBOVESPA": {"title": "no name"}}}}"#;
        let err = QuotesResponse::<Item>::from_json(body, "stocks").unwrap_err();
        assert!(err.to_string().contains("invalid quote \"IBOVESPA\""));
    }

    #[test]
    fn test_missing_results_fails_decode() {
        let err = QuotesResponse::<Item>::from_json(r#"{"valid_key": false}"#, "stocks").unwrap_err();
        assert!(err.to_string().contains("missing field `results`"));
    }
}
