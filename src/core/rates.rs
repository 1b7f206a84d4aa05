//! Currency exchange rates

use crate::core::feed::Feed;
use crate::core::format::{locale_f64, locale_f64_opt};
use crate::core::table::Row;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RateQuote {
    pub name: String,
    #[serde(deserialize_with = "locale_f64")]
    pub buy: f64,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub sell: Option<f64>,
    #[serde(default, deserialize_with = "locale_f64_opt")]
    pub variation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntity {
    pub name: String,
    pub symbol: String,
    pub value: f64,
    pub variation: f64,
    pub observed_at: DateTime<Utc>,
}

impl Row for RateEntity {
    fn primary_key(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateUiModel {
    pub currency_name: String,
    pub currency_term: String,
    pub unitary_rate: f64,
    pub variation: f64,
    pub rate_date: DateTime<Utc>,
}

pub struct Rates;

impl Feed for Rates {
    type Quote = RateQuote;
    type Entity = RateEntity;
    type Model = RateUiModel;

    const TABLE: &'static str = "rates";
    const DEFAULT_FIELDS: &'static str = "rates";
    const GROUP: &'static str = "currencies";

    fn to_entity(key: &str, quote: &RateQuote, fetched_at: DateTime<Utc>) -> RateEntity {
        RateEntity {
            name: quote.name.clone(),
            symbol: key.to_string(),
            value: quote.buy,
            variation: quote.variation.unwrap_or_default(),
            observed_at: fetched_at,
        }
    }

    fn entity_to_model(entity: &RateEntity) -> RateUiModel {
        RateUiModel {
            currency_name: entity.name.clone(),
            currency_term: entity.symbol.clone(),
            unitary_rate: entity.value,
            variation: entity.variation,
            rate_date: entity.observed_at,
        }
    }
}

/// Which side of a conversion is in reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Foreign currency amount in, reais out.
    ToBrl,
    /// Reais in, foreign currency amount out.
    FromBrl,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("No rate available for {0}")]
    UnknownCurrency(String),

    #[error("The rate for {0} is zero, cannot convert")]
    ZeroRate(String),

    #[error("Amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub currency_term: String,
    pub currency_name: String,
    pub direction: Direction,
    pub amount: f64,
    pub converted: f64,
    pub unitary_rate: f64,
    pub rate_date: DateTime<Utc>,
}

impl RateUiModel {
    /// Converts `amount` at this rate, which is the price of one unit of
    /// the currency in reais.
    pub fn convert(&self, amount: f64, direction: Direction) -> Result<f64, ConversionError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ConversionError::InvalidAmount(amount));
        }
        if self.unitary_rate == 0.0 || !self.unitary_rate.is_finite() {
            return Err(ConversionError::ZeroRate(self.currency_term.clone()));
        }
        Ok(match direction {
            Direction::ToBrl => amount * self.unitary_rate,
            Direction::FromBrl => amount / self.unitary_rate,
        })
    }
}

/// Case-insensitive lookup by currency code.
pub fn find_rate<'a>(rates: &'a [RateUiModel], code: &str) -> Option<&'a RateUiModel> {
    let code = code.trim();
    rates
        .iter()
        .find(|rate| rate.currency_term.eq_ignore_ascii_case(code))
}

pub fn convert(
    rates: &[RateUiModel],
    code: &str,
    amount: f64,
    direction: Direction,
) -> Result<Conversion, ConversionError> {
    let rate = find_rate(rates, code)
        .ok_or_else(|| ConversionError::UnknownCurrency(code.trim().to_uppercase()))?;
    let converted = rate.convert(amount, direction)?;
    Ok(Conversion {
        currency_term: rate.currency_term.clone(),
        currency_name: rate.currency_name.clone(),
        direction,
        amount,
        converted,
        unitary_rate: rate.unitary_rate,
        rate_date: rate.rate_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::QuotesResponse;
    use chrono::TimeZone;

    #[test]
    fn test_dollar_response_to_entity_and_model() {
        let json = r#"{
            "results": {
                "USD": {"name": "Dólar Americano", "buy": "5.20", "variation": "0.35"}
            }
        }"#;
        let mut response = QuotesResponse::<RateQuote>::from_json(json, Rates::GROUP).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        response.fetched_at = t;

        let entities = Rates::response_to_entities(&response);
        assert_eq!(
            entities,
            vec![RateEntity {
                name: "Dólar Americano".to_string(),
                symbol: "USD".to_string(),
                value: 5.20,
                variation: 0.35,
                observed_at: t,
            }]
        );

        let models = Rates::response_to_models(&response);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0], Rates::entity_to_model(&entities[0]));
        assert_eq!(models[0].currency_term, "USD");
        assert_eq!(models[0].rate_date, t);
    }

    #[test]
    fn test_comma_decimals_and_missing_variation() {
        let json = r#"{
            "results": {
                "currencies": {
                    "source": "BRL",
                    "EUR": {"name": "Euro", "buy": "5,6789", "sell": 5.7, "variation": null},
                    "GBP": {"name": "Libra Esterlina", "buy": 6.5}
                }
            }
        }"#;
        let response = QuotesResponse::<RateQuote>::from_json(json, Rates::GROUP).unwrap();
        let entities = Rates::response_to_entities(&response);

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].symbol, "EUR");
        assert_eq!(entities[0].value, 5.6789);
        assert_eq!(entities[0].variation, 0.0);
        assert_eq!(entities[1].symbol, "GBP");
        assert!(entities.iter().all(|e| e.observed_at == response.fetched_at));
    }

    fn rate(code: &str, value: f64) -> RateUiModel {
        RateUiModel {
            currency_name: format!("{code} name"),
            currency_term: code.to_string(),
            unitary_rate: value,
            variation: 0.0,
            rate_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_convert_both_directions() {
        let rates = vec![rate("USD", 5.0), rate("EUR", 5.5)];

        let to_brl = convert(&rates, "usd", 10.0, Direction::ToBrl).unwrap();
        assert_eq!(to_brl.currency_term, "USD");
        assert_eq!(to_brl.converted, 50.0);
        assert_eq!(to_brl.unitary_rate, 5.0);

        let from_brl = convert(&rates, "EUR", 11.0, Direction::FromBrl).unwrap();
        assert_eq!(from_brl.converted, 2.0);
        assert_eq!(from_brl.direction, Direction::FromBrl);
        assert_eq!(from_brl.rate_date, rates[1].rate_date);
    }

    #[test]
    fn test_convert_zero_amount() {
        let rates = vec![rate("USD", 5.0)];
        assert_eq!(convert(&rates, "USD", 0.0, Direction::FromBrl).unwrap().converted, 0.0);
    }

    #[test]
    fn test_convert_unknown_currency() {
        let rates = vec![rate("USD", 5.0)];
        assert_eq!(
            convert(&rates, " jpy ", 1.0, Direction::ToBrl),
            Err(ConversionError::UnknownCurrency("JPY".to_string()))
        );
        assert_eq!(
            convert(&[], "USD", 1.0, Direction::ToBrl),
            Err(ConversionError::UnknownCurrency("USD".to_string()))
        );
    }

    #[test]
    fn test_convert_zero_rate() {
        let rates = vec![rate("ARS", 0.0)];
        for direction in [Direction::ToBrl, Direction::FromBrl] {
            assert_eq!(
                convert(&rates, "ARS", 100.0, direction),
                Err(ConversionError::ZeroRate("ARS".to_string()))
            );
        }
    }

    #[test]
    fn test_convert_rejects_invalid_amount() {
        let usd = rate("USD", 5.0);
        assert_eq!(
            usd.convert(-1.0, Direction::ToBrl),
            Err(ConversionError::InvalidAmount(-1.0))
        );
        assert!(matches!(
            usd.convert(f64::NAN, Direction::FromBrl),
            Err(ConversionError::InvalidAmount(_))
        ));
    }
}
