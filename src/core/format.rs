//! Locale helpers shared by the wire decoders and the front end

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de};

/// Parses a decimal written either with a dot or a comma separator.
///
/// `"5.20"`, `"1,2345"` and `"1.234,56"` are all accepted. When both
/// separators appear, the last one is the decimal separator.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// Deserializes a JSON number or a locale formatted string into `f64`.
pub fn locale_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(n) => Ok(n),
        RawNumber::Text(s) => parse_locale_number(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid number: {s:?}"))),
    }
}

/// Like [`locale_f64`] but `null` or a missing field read as `None`.
pub fn locale_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(n)),
        Some(RawNumber::Text(s)) => parse_locale_number(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid number: {s:?}"))),
    }
}

/// Signed percentage, e.g. `+0.35%` or `-1.20%`.
pub fn variation_text(variation: f64) -> String {
    format!("{variation:+.2}%")
}

/// Brazilian grouping: `1234.5` becomes `1.234,50`.
pub fn br_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn brl_currency(value: f64) -> String {
    format!("R$ {}", br_number(value, 2))
}

pub fn br_date_time(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

/// Portuguese display name for an ISO currency code.
pub fn currency_name_pt(code: &str) -> String {
    let name = match code.to_uppercase().as_str() {
        "BRL" => "Real Brasileiro",
        "USD" => "Dólar Americano",
        "EUR" => "Euro",
        "GBP" => "Libra Esterlina",
        "ARS" => "Peso Argentino",
        "CAD" => "Dólar Canadense",
        "AUD" => "Dólar Australiano",
        "JPY" => "Iene Japonês",
        "CNY" => "Yuan Chinês",
        "CHF" => "Franco Suíço",
        "BTC" => "Bitcoin",
        _ => return code.to_string(),
    };
    name.to_string()
}
