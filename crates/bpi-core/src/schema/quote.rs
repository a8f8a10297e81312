//! Price quote record and its decoder.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ExporterError, Result};

/// Upstream timestamps. Opaque strings, passed through as received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuoteTime {
    /// Human readable update time (e.g. "Oct 17, 2026 10:00:00 UTC").
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated: Option<String>,
    /// ISO-8601 update time.
    #[serde(default, rename = "updatedISO", deserialize_with = "lenient_string")]
    pub updated_iso: Option<String>,
}

/// One currency entry of the index.
///
/// Only `rate_float` is checked; the descriptive fields are `None` when
/// missing, `null`, or not a string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrencyRate {
    /// ISO currency code.
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    /// HTML entity of the currency symbol.
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    /// Display rate, e.g. "50,000.1200".
    #[serde(default, deserialize_with = "lenient_string")]
    pub rate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Numeric rate. `None` when the upstream omitted it or sent `null`.
    #[serde(default)]
    pub rate_float: Option<f64>,
}

// Pass-through strings never fail a decode.
fn lenient_string<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

// A `time` object of the wrong shape is treated as absent.
fn lenient_time<'de, D>(de: D) -> std::result::Result<Option<QuoteTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::from_value(Value::deserialize(de)?).ok())
}

/// One upstream snapshot. Built per refresh cycle, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuote {
    pub time: QuoteTime,
    pub chart_name: Option<String>,
    bpi: BTreeMap<String, CurrencyRate>,
}

impl PriceQuote {
    /// Opaque observation timestamp, empty if the upstream sent none.
    pub fn observed_at(&self) -> &str {
        self.time.updated.as_deref().unwrap_or_default()
    }

    /// Full currency record, if the upstream sent one.
    pub fn currency(&self, code: &str) -> Option<&CurrencyRate> {
        self.bpi.get(code)
    }

    /// Numeric rate for `code`, if present and numeric.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.bpi.get(code).and_then(|c| c.rate_float)
    }

    /// Every `(code, rate)` pair carrying a numeric rate, ordered by code.
    pub fn rates(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.bpi
            .iter()
            .filter_map(|(code, c)| c.rate_float.map(|r| (code.as_str(), r)))
    }

    /// Currency codes present in the snapshot, ordered.
    pub fn currencies(&self) -> impl Iterator<Item = &str> + '_ {
        self.bpi.keys().map(String::as_str)
    }
}

impl FromIterator<(String, CurrencyRate)> for PriceQuote {
    fn from_iter<I: IntoIterator<Item = (String, CurrencyRate)>>(iter: I) -> Self {
        Self {
            time: QuoteTime::default(),
            chart_name: None,
            bpi: iter.into_iter().collect(),
        }
    }
}

// Wire shape. `null` currency entries are tolerated like missing ones.
#[derive(Debug, Deserialize)]
struct WireQuote {
    #[serde(default, deserialize_with = "lenient_time")]
    time: Option<QuoteTime>,
    #[serde(default, rename = "chartName", deserialize_with = "lenient_string")]
    chart_name: Option<String>,
    #[serde(default)]
    bpi: Option<BTreeMap<String, Option<CurrencyRate>>>,
}

/// Decode a raw upstream body into a `PriceQuote`.
///
/// Unknown fields are ignored. A body that is not a JSON object, or a present
/// `rate_float` that is not a number, yields `ExporterError::Decode`.
pub fn decode(raw: &[u8]) -> Result<PriceQuote> {
    let value: Value = serde_json::from_slice(raw)?;
    if !value.is_object() {
        return Err(ExporterError::Decode("top-level value must be an object".into()));
    }

    let wire: WireQuote = serde_json::from_value(value)?;
    let bpi = wire
        .bpi
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(code, rate)| rate.map(|r| (code, r)))
        .collect::<BTreeMap<_, _>>();

    tracing::debug!(currencies = bpi.len(), "decoded price quote");

    Ok(PriceQuote {
        time: wire.time.unwrap_or_default(),
        chart_name: wire.chart_name,
        bpi,
    })
}
