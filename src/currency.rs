//! Currency codes and currency-name metadata

use crate::error::{ExchangeError, Result};
use hashbrown::HashMap;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Default base currency of the remote service
pub const DEFAULT_BASE: &str = "USD";

/// Normalize a currency code: trim, uppercase, require three ASCII letters.
pub fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ExchangeError::Configuration(format!(
            "Currency code must be three letters, got: {:?}",
            code
        )));
    }
    Ok(code)
}

/// Insertion-ordered map keyed by currency code.
///
/// A repeated key overwrites the earlier value in place, so the first
/// position wins and the last value wins.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CodeMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> CodeMap<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, code: String, value: V) {
        match self.index.get(&code) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(code.clone(), self.entries.len());
                self.entries.push((code, value));
            }
        }
    }

    pub(crate) fn get(&self, code: &str) -> Option<&V> {
        self.index.get(code).map(|&pos| &self.entries[pos].1)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> &[(String, V)] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

impl<V> FromIterator<(String, V)> for CodeMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = CodeMap::with_capacity(iter.size_hint().0);
        for (code, value) in iter {
            map.insert(code, value);
        }
        map
    }
}

/// Currency code to human-readable name, in response order
///
/// # Example
/// ```
/// use rusty_oxr::CurrencyNameTable;
///
/// let names = CurrencyNameTable::from_json(r#"{"AED": "United Arab Emirates Dirham"}"#).unwrap();
/// assert_eq!(names.get("AED"), Some("United Arab Emirates Dirham"));
/// assert_eq!(names.get("XXX"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyNameTable {
    names: CodeMap<String>,
}

impl CurrencyNameTable {
    /// Parse the flat `{code: name}` object returned by the currencies endpoint.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| ExchangeError::MalformedResponse(format!("currencies: {}", e)))
    }

    /// Look up the name of a currency
    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Look up a name, falling back to `default` for unknown codes
    pub fn name_or<'a>(&'a self, code: &str, default: &'a str) -> &'a str {
        self.get(code).unwrap_or(default)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() == 0
    }

    /// Iterate `(code, name)` pairs in response order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .entries()
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }
}

impl FromIterator<(String, String)> for CurrencyNameTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CurrencyNameTable {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_entries().into_iter()
    }
}

impl<'de> Deserialize<'de> for CurrencyNameTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NamesVisitor;

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = CurrencyNameTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping currency codes to names")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut names = CodeMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((code, name)) = access.next_entry::<String, String>()? {
                    names.insert(code, name);
                }
                Ok(CurrencyNameTable { names })
            }
        }

        deserializer.deserialize_map(NamesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "AED": "United Arab Emirates Dirham",
        "AFN": "Afghan Afghani",
        "ALL": "Albanian Lek",
        "USD": "United States Dollar"
    }"#;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("usd").unwrap(), "USD");
        assert_eq!(normalize_code(" eur ").unwrap(), "EUR");
        assert!(normalize_code("").is_err());
        assert!(normalize_code("US").is_err());
        assert!(normalize_code("US1").is_err());
        assert!(normalize_code("EURO").is_err());
    }

    #[test]
    fn test_name_table_preserves_order() {
        let names = CurrencyNameTable::from_json(FIXTURE).unwrap();
        let codes: Vec<&str> = names.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["AED", "AFN", "ALL", "USD"]);
        assert_eq!(names.len(), 4);
        assert_eq!(names.get("AFN"), Some("Afghan Afghani"));
        assert!(names.contains("ALL"));
    }

    #[test]
    fn test_name_or_default() {
        let names = CurrencyNameTable::from_json(FIXTURE).unwrap();
        assert_eq!(names.name_or("USD", "???"), "United States Dollar");
        assert_eq!(names.name_or("BTC", "???"), "???");
    }

    #[test]
    fn test_name_table_rejects_non_string_names() {
        let err = CurrencyNameTable::from_json(r#"{"AED": 3.67}"#).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse(_)));

        let err = CurrencyNameTable::from_json(r#"["AED"]"#).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse(_)));
    }

    #[test]
    fn test_code_map_duplicate_keeps_first_position() {
        let map: CodeMap<u32> = vec![
            ("AED".to_string(), 1),
            ("USD".to_string(), 2),
            ("AED".to_string(), 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("AED"), Some(&3));
        assert_eq!(map.entries()[0].0, "AED");
    }
}
