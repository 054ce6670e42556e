//! # rusty_oxr
//!
//! A blocking client for the [Open Exchange Rates](https://openexchangerates.org) API.
//!
//! Fetches latest rates, historical rates and currency names, decodes rates
//! as floats or exact decimals, and can re-base a table on any currency it
//! contains without another request. Useful on the free plan, where the
//! service only answers in USD.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_oxr::prelude::*;
//!
//! let config = ClientConfig::builder("my-app-id")
//!     .numeric_mode(NumericMode::Decimal)
//!     .local_base("EUR")
//!     .build()?;
//! let client = ExchangeRateClient::new(config)?;
//!
//! let latest = client.fetch_latest()?;
//! println!("1 EUR = {} USD", latest.get("USD").unwrap());
//!
//! let html = client.html(&latest)?;
//! # let _ = html;
//! # Ok::<(), ExchangeError>(())
//! ```

pub mod client;
pub mod config;
pub mod currency;
pub mod error;
pub mod html;
pub mod rate;
pub mod rate_table;
pub mod transport;

pub use client::{ExchangeRateClient, RequestDate};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use currency::CurrencyNameTable;
pub use error::{ExchangeError, Result};
pub use html::render_html;
pub use rate::{format_rate, NumericMode, Rate};
pub use rate_table::RateTable;
pub use transport::{HttpTransport, Transport};

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::client::{ExchangeRateClient, RequestDate};
    pub use crate::config::ClientConfig;
    pub use crate::currency::CurrencyNameTable;
    pub use crate::error::{ExchangeError, Result};
    pub use crate::rate::{format_rate, NumericMode, Rate};
    pub use crate::rate_table::RateTable;
    pub use crate::transport::Transport;
}
