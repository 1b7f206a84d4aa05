//! Bitcoin quotes from several exchanges

use crate::core::feed::Feed;
use crate::core::format::{currency_name_pt, locale_f64, locale_f64_opt};
use crate::core::table::Row;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// The `format` pair of a bitcoin quote, e.g. `["BRL", "pt_BR"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteFormat {
    pub currency: String,
    pub language: String,
    pub country: String,
}

impl<'de> Deserialize<'de> for QuoteFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parts = Vec::<String>::deserialize(deserializer)?;
        let [currency, locale] = parts.as_slice() else {
            return Err(de::Error::invalid_length(parts.len(), &"[currency, locale]"));
        };
        let (language, country) = locale
            .split_once(['_', '-'])
            .filter(|(l, c)| l.len() == 2 && c.len() == 2)
            .ok_or_else(|| de::Error::custom(format!("invalid locale: {locale:?}")))?;

        Ok(QuoteFormat {
            currency: currency.clone(),
            language: language.to_string(),
            country: country.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BitcoinQuote {
    pub name: String,
    pub format: QuoteFormat,
    #[serde(deserialize_with = "locale_f64")]
    pub last: f64,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub buy: Option<f64>,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub sell: Option<f64>,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub variation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinEntity {
    pub name: String,
    /// Exchange key, e.g. `blockchain_info`.
    pub symbol: String,
    pub currency_symbol: String,
    pub language_term: String,
    pub country_term: String,
    pub value: f64,
    pub variation: f64,
    pub observed_at: DateTime<Utc>,
}

impl Row for BitcoinEntity {
    fn primary_key(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitcoinUiModel {
    pub name: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub language_term: String,
    pub country_term: String,
    pub unitary_value: f64,
    pub variation: f64,
    pub bitcoin_date: DateTime<Utc>,
}

pub struct Bitcoins;

impl Feed for Bitcoins {
    type Quote = BitcoinQuote;
    type Entity = BitcoinEntity;
    type Model = BitcoinUiModel;

    const TABLE: &'static str = "bitcoins";
    const DEFAULT_FIELDS: &'static str = "bitcoins";
    const GROUP: &'static str = "bitcoin";

    fn to_entity(key: &str, quote: &BitcoinQuote, fetched_at: DateTime<Utc>) -> BitcoinEntity {
        BitcoinEntity {
            name: quote.name.clone(),
            symbol: key.to_string(),
            currency_symbol: quote.format.currency.clone(),
            language_term: quote.format.language.clone(),
            country_term: quote.format.country.clone(),
            value: quote.last,
            variation: quote.variation.unwrap_or_default(),
            observed_at: fetched_at,
        }
    }

    fn entity_to_model(entity: &BitcoinEntity) -> BitcoinUiModel {
        BitcoinUiModel {
            name: entity.name.clone(),
            currency_name: currency_name_pt(&entity.currency_symbol),
            currency_symbol: entity.currency_symbol.clone(),
            language_term: entity.language_term.clone(),
            country_term: entity.country_term.clone(),
            unitary_value: entity.value,
            variation: entity.variation,
            bitcoin_date: entity.observed_at,
        }
    }
}
