//! Fetch latest rates and print them, optionally re-based locally.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example latest_rates -- <APP_ID> [LOCAL_BASE]
//! cargo run --example latest_rates -- ./oxr.toml
//! ```

use anyhow::{bail, Context};
use rusty_oxr::prelude::*;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(key_or_path) = args.next() else {
        bail!("usage: latest_rates <APP_ID | CONFIG.toml> [LOCAL_BASE]");
    };

    let config = if key_or_path.ends_with(".toml") && Path::new(&key_or_path).exists() {
        ClientConfig::load(&key_or_path)
            .with_context(|| format!("loading {}", key_or_path))?
    } else {
        let mut builder = ClientConfig::builder(key_or_path);
        if let Some(local_base) = args.next() {
            builder = builder.local_base(&local_base);
        }
        builder.build()?
    };

    let client = ExchangeRateClient::new(config)?;
    let latest = client.fetch_latest().context("fetching latest rates")?;
    let names = client.fetch_currencies().context("fetching currency names")?;

    println!("Rates relative to {}", latest.base());
    for (code, rate) in &latest {
        println!(
            "{:>4}  {:>16}  {}",
            code,
            format_rate(rate, latest.mode()),
            names.name_or(code, "???")
        );
    }

    Ok(())
}
