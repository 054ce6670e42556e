//! Rate tables and local re-basing
//!
//! A [`RateTable`] is an immutable snapshot of one response: currency code to
//! [`Rate`], in the order the service sent them.
//!
//! # Example
//!
//! ```rust
//! use rusty_oxr::{NumericMode, RateTable};
//!
//! let body = r#"{"rates": {"AED": 3.666311, "AFN": 51.2281, "USD": 1}}"#;
//! let table = RateTable::from_json(body, "USD", NumericMode::Float).unwrap();
//!
//! // Express the same rates relative to AED, without another request
//! let aed = table.rebase("AED").unwrap();
//! assert_eq!(aed.get("AED").unwrap().to_f64(), 1.0);
//! assert_eq!(aed.get("AFN").unwrap().to_f64(), 13.97265535);
//! ```

use crate::currency::CodeMap;
use crate::error::{ExchangeError, Result};
use crate::rate::{format_rate, NumericMode, Rate, REBASE_DECIMALS};
use chrono::{DateTime, Utc};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Exchange rates relative to one base currency
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    mode: NumericMode,
    timestamp: Option<DateTime<Utc>>,
    rates: CodeMap<Rate>,
}

/// Response envelope; only `rates` is required.
///
/// `base` and `timestamp` are metadata: a value of an unexpected shape is
/// dropped instead of failing the response.
#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(borrow)]
    rates: Option<RawRates<'a>>,
    #[serde(default)]
    base: Value,
    #[serde(default)]
    timestamp: Value,
}

/// `rates` object with each value kept as its literal JSON text
struct RawRates<'a>(Vec<(String, &'a RawValue)>);

impl<'de: 'a, 'a> Deserialize<'de> for RawRates<'a> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawRatesVisitor;

        impl<'de> Visitor<'de> for RawRatesVisitor {
            type Value = RawRates<'de>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping currency codes to rates")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, &'de RawValue>()? {
                    entries.push(entry);
                }
                Ok(RawRates(entries))
            }
        }

        deserializer.deserialize_map(RawRatesVisitor)
    }
}

impl RateTable {
    /// Build a table from already-parsed rates
    pub fn from_rates<I, S>(base: &str, mode: NumericMode, rates: I) -> Self
    where
        I: IntoIterator<Item = (S, Rate)>,
        S: Into<String>,
    {
        Self {
            base: base.to_string(),
            mode,
            timestamp: None,
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.into(), rate))
                .collect(),
        }
    }

    /// Decode a latest/historical response body.
    ///
    /// `requested_base` is used when the body does not name its own base.
    pub fn from_json(body: &str, requested_base: &str, mode: NumericMode) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| ExchangeError::MalformedResponse(format!("response body: {}", e)))?;

        let raw = envelope.rates.ok_or_else(|| {
            ExchangeError::MalformedResponse("response has no \"rates\" field".to_string())
        })?;

        let mut rates = CodeMap::with_capacity(raw.0.len());
        for (code, literal) in raw.0 {
            let rate = Rate::parse(literal.get(), mode).map_err(|e| {
                ExchangeError::MalformedResponse(format!("rate for {}: {}", code, e))
            })?;
            rates.insert(code, rate);
        }

        Ok(Self {
            base: envelope
                .base
                .as_str()
                .map(str::to_ascii_uppercase)
                .unwrap_or_else(|| requested_base.to_string()),
            mode,
            timestamp: envelope
                .timestamp
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            rates,
        })
    }

    /// Currency the rates are expressed in
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    /// Publication time reported by the service, if any
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn get(&self, code: &str) -> Option<&Rate> {
        self.rates.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.len() == 0
    }

    /// Iterate `(code, rate)` pairs in response order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.rates.entries().iter(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(code, _)| code)
    }

    /// Display form of one rate under this table's numeric mode
    pub fn formatted(&self, code: &str) -> Option<String> {
        self.get(code).map(|rate| format_rate(rate, self.mode))
    }

    /// Re-express every rate relative to `pivot`.
    ///
    /// Each value becomes `value / table[pivot]`, rounded to 8 decimal places,
    /// so the pivot itself maps to exactly 1.
    pub fn rebase(&self, pivot: &str) -> Result<RateTable> {
        let pivot = pivot.trim().to_ascii_uppercase();
        let pivot_rate = *self
            .get(&pivot)
            .ok_or_else(|| ExchangeError::UnknownCurrency(pivot.clone()))?;

        let mut rates = CodeMap::with_capacity(self.len());
        for (code, rate) in self.iter() {
            let rebased = rate.div_rounded(&pivot_rate, REBASE_DECIMALS).ok_or_else(|| {
                ExchangeError::MalformedResponse(format!(
                    "cannot rebase {} on {}: rate {} is not usable as a divisor",
                    code, pivot, pivot_rate
                ))
            })?;
            rates.insert(code.to_string(), rebased);
        }

        log::debug!(
            "Rebased {} rates from {} to {}",
            rates.len(),
            self.base,
            pivot
        );

        Ok(RateTable {
            base: pivot,
            mode: self.mode,
            timestamp: self.timestamp,
            rates,
        })
    }

    /// Pretty JSON object of the rates with keys sorted.
    ///
    /// Decimal rates are written as strings.
    pub fn to_json_pretty(&self) -> Result<String> {
        let sorted: BTreeMap<&str, &Rate> = self.iter().collect();
        Ok(serde_json::to_string_pretty(&sorted)?)
    }
}

/// Borrowing iterator over a [`RateTable`]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, Rate)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Rate);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(code, rate)| (code.as_str(), rate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a RateTable {
    type Item = (&'a str, &'a Rate);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for RateTable {
    type Item = (String, Rate);
    type IntoIter = std::vec::IntoIter<(String, Rate)>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.into_entries().into_iter()
    }
}
