//! Open Exchange Rates client
//!
//! Every fetch is one blocking GET followed by one JSON decode. Nothing is
//! cached: each call returns a fresh, independently owned table.

use crate::config::ClientConfig;
use crate::currency::CurrencyNameTable;
use crate::error::{ExchangeError, Result};
use crate::html::render_html;
use crate::rate::Rate;
use crate::rate_table::RateTable;
use crate::transport::{HttpTransport, Transport};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day selector for historical rates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDate {
    Date(NaiveDate),
    /// `YYYY-MM-DD`, checked when the request is built
    Text(String),
}

impl RequestDate {
    /// Resolve to a calendar date
    pub fn to_date(&self) -> Result<NaiveDate> {
        match self {
            RequestDate::Date(date) => Ok(*date),
            RequestDate::Text(text) => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                .map_err(|_| ExchangeError::InvalidDate(text.clone())),
        }
    }

    /// Canonical zero-padded `YYYY-MM-DD` form
    pub fn formatted(&self) -> Result<String> {
        Ok(self.to_date()?.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDate> for RequestDate {
    fn from(date: NaiveDate) -> Self {
        RequestDate::Date(date)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for RequestDate {
    fn from(dt: DateTime<Tz>) -> Self {
        RequestDate::Date(dt.date_naive())
    }
}

impl From<&str> for RequestDate {
    fn from(text: &str) -> Self {
        RequestDate::Text(text.to_string())
    }
}

impl From<String> for RequestDate {
    fn from(text: String) -> Self {
        RequestDate::Text(text)
    }
}

/// Client for the Open Exchange Rates API
///
/// # Example
/// ```rust,no_run
/// use rusty_oxr::{ClientConfig, ExchangeRateClient};
///
/// let config = ClientConfig::builder("my-app-id").local_base("EUR").build()?;
/// let client = ExchangeRateClient::new(config)?;
///
/// let latest = client.fetch_latest()?;
/// for (code, rate) in &latest {
///     println!("{} {}", code, rate);
/// }
///
/// let names = client.fetch_currencies()?;
/// println!("{}", names.name_or("EUR", "???"));
/// # Ok::<(), rusty_oxr::ExchangeError>(())
/// ```
pub struct ExchangeRateClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl ExchangeRateClient<HttpTransport> {
    /// Create a client that talks HTTP with the configured timeout
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> ExchangeRateClient<T> {
    pub const LATEST_PATH: &'static str = "/latest.json";
    pub const CURRENCIES_PATH: &'static str = "/currencies.json";
    pub const HISTORICAL_PREFIX: &'static str = "/historical/";

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of the latest-rates endpoint, without query
    pub fn latest_url(&self) -> String {
        format!("{}{}", self.config.base_url(), Self::LATEST_PATH)
    }

    /// URL of the currencies endpoint, without query
    pub fn currencies_url(&self) -> String {
        format!("{}{}", self.config.base_url(), Self::CURRENCIES_PATH)
    }

    /// URL of the historical endpoint for `date`, without query
    pub fn historical_url(&self, date: &RequestDate) -> Result<String> {
        Ok(format!(
            "{}{}{}.json",
            self.config.base_url(),
            Self::HISTORICAL_PREFIX,
            date.formatted()?
        ))
    }

    /// Fetch the latest rates
    pub fn fetch_latest(&self) -> Result<RateTable> {
        self.fetch_rates(&self.latest_url())
    }

    /// Fetch end-of-day rates for `date`
    pub fn fetch_historical(&self, date: impl Into<RequestDate>) -> Result<RateTable> {
        let url = self.historical_url(&date.into())?;
        self.fetch_rates(&url)
    }

    /// Fetch the currency code to name mapping
    pub fn fetch_currencies(&self) -> Result<CurrencyNameTable> {
        let body = self.get(&self.currencies_url())?;
        let names = CurrencyNameTable::from_json(&body)?;
        log::debug!("Fetched {} currency names", names.len());
        Ok(names)
    }

    /// Render `table` as HTML, looking names up with a currencies fetch
    pub fn html(&self, table: &RateTable) -> Result<String> {
        let names = self.fetch_currencies()?;
        Ok(render_html(table, &names, self.config.html_table_header()))
    }

    /// `(code, rate)` pairs of a fresh latest fetch, in response order
    pub fn rates(&self) -> Result<std::vec::IntoIter<(String, Rate)>> {
        Ok(self.fetch_latest()?.into_iter())
    }

    /// Fetch the latest rates and hand them to `f`
    pub fn with_latest<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&RateTable) -> R,
    {
        let table = self.fetch_latest()?;
        Ok(f(&table))
    }

    /// Latest rates as pretty JSON with sorted keys
    pub fn latest_json(&self) -> Result<String> {
        self.fetch_latest()?.to_json_pretty()
    }

    fn fetch_rates(&self, url: &str) -> Result<RateTable> {
        let body = self.get(url)?;
        let table = RateTable::from_json(&body, self.config.base(), self.config.numeric_mode())?;
        log::debug!("Fetched {} rates based on {}", table.len(), table.base());

        match self.config.local_base() {
            Some(pivot) => table.rebase(pivot),
            None => Ok(table),
        }
    }

    fn get(&self, url: &str) -> Result<String> {
        log::debug!("GET {} (base {})", url, self.config.base());
        self.transport.get(
            url,
            &[
                ("app_id", self.config.api_key()),
                ("base", self.config.base()),
            ],
        )
    }
}

impl<T: Transport> fmt::Debug for ExchangeRateClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRateClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::NumericMode;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    const FIXTURE_LATEST: &str = r#"{"rates": {
        "AED": 3.666311,
        "AFN": 51.2281,
        "ALL": 104.748751,
        "USD": 1}
    }"#;

    const FIXTURE_CURRENCIES: &str = r#"{
        "AED": "United Arab Emirates Dirham",
        "AFN": "Afghan Afghani",
        "ALL": "Albanian Lek",
        "USD": "United States Dollar"
    }"#;

    /// Serves canned bodies by URL suffix and records every request
    struct FixtureTransport {
        routes: Vec<(&'static str, u16, &'static str)>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FixtureTransport {
        fn new(routes: Vec<(&'static str, u16, &'static str)>) -> Self {
            Self {
                routes,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn standard() -> Self {
            Self::new(vec![
                ("/latest.json", 200, FIXTURE_LATEST),
                ("/currencies.json", 200, FIXTURE_CURRENCIES),
                ("/historical/2012-12-12.json", 200, FIXTURE_LATEST),
            ])
        }

        fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FixtureTransport {
        fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));

            let (_, status, body) = self
                .routes
                .iter()
                .find(|(suffix, _, _)| url.ends_with(suffix))
                .copied()
                .unwrap_or(("", 404, "{\"error\": true}"));

            if status != 200 {
                return Err(ExchangeError::RemoteService {
                    status,
                    body: body.to_string(),
                });
            }
            Ok(body.to_string())
        }
    }

    fn client_with(
        builder: crate::config::ClientConfigBuilder,
        transport: FixtureTransport,
    ) -> ExchangeRateClient<FixtureTransport> {
        ExchangeRateClient::with_transport(builder.build().unwrap(), transport)
    }

    #[test]
    fn test_latest_sends_key_and_base() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").base("eur"),
            FixtureTransport::standard(),
        );
        client.fetch_latest().unwrap();

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://openexchangerates.org/api/latest.json");
        assert_eq!(
            requests[0].1,
            vec![
                ("app_id".to_string(), "DUMMY_API_KEY".to_string()),
                ("base".to_string(), "EUR".to_string()),
            ]
        );
    }

    #[test]
    fn test_latest_float_and_decimal() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").numeric_mode(NumericMode::Float),
            FixtureTransport::standard(),
        );
        let latest = client.fetch_latest().unwrap();
        assert_eq!(latest.get("AED"), Some(&Rate::Float(3.666311)));
        assert_eq!(latest.get("USD"), Some(&Rate::Float(1.0)));

        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").numeric_mode(NumericMode::Decimal),
            FixtureTransport::standard(),
        );
        let latest = client.fetch_latest().unwrap();
        assert_eq!(latest.get("AFN"), Some(&Rate::Decimal(dec!(51.2281))));
    }

    #[test]
    fn test_historical_with_string_and_date() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );

        let from_text = client.fetch_historical("2012-12-12").unwrap();
        let from_date = client
            .fetch_historical(NaiveDate::from_ymd_opt(2012, 12, 12).unwrap())
            .unwrap();
        let from_datetime = client
            .fetch_historical(Utc.with_ymd_and_hms(2012, 12, 12, 18, 30, 0).unwrap())
            .unwrap();

        assert_eq!(from_text, from_date);
        assert_eq!(from_date, from_datetime);
        assert_eq!(from_text.len(), 4);
    }

    #[test]
    fn test_historical_unpadded_date_is_normalized() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );
        let url = client.historical_url(&"2015-3-7".into()).unwrap();
        assert_eq!(url, "https://openexchangerates.org/api/historical/2015-03-07.json");
    }

    #[test]
    fn test_historical_invalid_date() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );
        let err = client.fetch_historical("12/12/2012").unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidDate(_)));
        assert!(client.transport.requests().is_empty());
    }

    #[test]
    fn test_local_base_conversion() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY")
                .numeric_mode(NumericMode::Decimal)
                .local_base("AED"),
            FixtureTransport::standard(),
        );
        let latest = client.fetch_historical("2012-12-12").unwrap();

        assert_eq!(latest.base(), "AED");
        assert_eq!(latest.get("AED"), Some(&Rate::Decimal(dec!(1.0))));
        assert_eq!(latest.get("AFN"), Some(&Rate::Decimal(dec!(13.97265535))));
        assert_eq!(latest.get("ALL"), Some(&Rate::Decimal(dec!(28.57061253))));
        assert_eq!(latest.get("USD"), Some(&Rate::Decimal(dec!(0.27275373))));
    }

    #[test]
    fn test_local_base_missing_from_response() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").local_base("GBP"),
            FixtureTransport::standard(),
        );
        let err = client.fetch_latest().unwrap_err();
        assert!(matches!(err, ExchangeError::UnknownCurrency(ref c) if c == "GBP"));
    }

    #[test]
    fn test_currencies_are_not_rebased() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").local_base("AED"),
            FixtureTransport::standard(),
        );
        let names = client.fetch_currencies().unwrap();
        assert_eq!(names.len(), 4);
        assert_eq!(names.get("ALL"), Some("Albanian Lek"));
    }

    #[test]
    fn test_remote_errors_propagate() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::new(vec![]),
        );

        assert_eq!(client.fetch_latest().unwrap_err().status(), Some(404));
        assert_eq!(client.fetch_currencies().unwrap_err().status(), Some(404));
        assert_eq!(
            client.fetch_historical("2012-12-12").unwrap_err().status(),
            Some(404)
        );
    }

    #[test]
    fn test_rates_iterates_latest() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );
        let pairs: Vec<(String, Rate)> = client.rates().unwrap().collect();
        let latest: Vec<(String, Rate)> = client.fetch_latest().unwrap().into_iter().collect();

        assert_eq!(pairs, latest);
        assert_eq!(pairs[0].0, "AED");
        // one request per iteration, nothing cached
        assert_eq!(client.transport.requests().len(), 2);
    }

    #[test]
    fn test_with_latest() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );
        let count = client.with_latest(|table| table.len()).unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_html_uses_currency_names() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY").html_table_header(false),
            FixtureTransport::standard(),
        );
        let latest = client.fetch_latest().unwrap();
        let html = client.html(&latest).unwrap();

        assert!(html.starts_with("<table><tbody><tr><td>3</td><td>USD</td>"));
        assert!(html.contains("<td>United Arab Emirates Dirham</td>"));
    }

    #[test]
    fn test_latest_json() {
        let client = client_with(
            ClientConfig::builder("DUMMY_API_KEY"),
            FixtureTransport::standard(),
        );
        let json = client.latest_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ALL"], 104.748751);
    }

    #[test]
    fn test_debug_hides_key() {
        let client = client_with(
            ClientConfig::builder("super-secret"),
            FixtureTransport::standard(),
        );
        assert!(!format!("{:?}", client).contains("super-secret"));
    }
}
