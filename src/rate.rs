//! Rate values and their display formatting
//!
//! Arithmetic always runs on the full-precision value. Rounding for display
//! happens only in [`format_rate`].

use crate::error::{ExchangeError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept by local re-basing
pub const REBASE_DECIMALS: u32 = 8;

/// How rate literals are parsed and displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericMode {
    /// `f64`, displayed with 2 decimals (6 when that would read as zero)
    #[default]
    RoundedFloat,
    /// `f64`, displayed at full precision
    Float,
    /// Exact decimal parsed straight from the JSON literal
    Decimal,
}

impl NumericMode {
    pub fn is_float(&self) -> bool {
        !matches!(self, NumericMode::Decimal)
    }
}

impl fmt::Display for NumericMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NumericMode::RoundedFloat => "rounded_float",
            NumericMode::Float => "float",
            NumericMode::Decimal => "decimal",
        };
        f.write_str(name)
    }
}

/// A single exchange rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Float(f64),
    Decimal(Decimal),
}

impl Rate {
    /// Parse a JSON numeric literal according to `mode`.
    ///
    /// Negative and non-finite values are rejected.
    pub fn parse(literal: &str, mode: NumericMode) -> Result<Self> {
        let literal = literal.trim();
        let rate = match mode {
            NumericMode::RoundedFloat | NumericMode::Float => literal
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Rate::Float),
            NumericMode::Decimal => parse_decimal(literal).map(Rate::Decimal),
        }
        .ok_or_else(|| {
            ExchangeError::MalformedResponse(format!("Rate is not a number: {}", literal))
        })?;

        if rate.is_negative() {
            return Err(ExchangeError::MalformedResponse(format!(
                "Rate must not be negative, got: {}",
                literal
            )));
        }
        Ok(rate)
    }

    /// Lossy conversion to `f64`
    pub fn to_f64(&self) -> f64 {
        match self {
            Rate::Float(v) => *v,
            Rate::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Rate::Decimal(d) => Some(*d),
            Rate::Float(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Rate::Float(v) => *v == 0.0,
            Rate::Decimal(d) => d.is_zero(),
        }
    }

    fn is_negative(&self) -> bool {
        match self {
            Rate::Float(v) => *v < 0.0,
            Rate::Decimal(d) => d.is_sign_negative() && !d.is_zero(),
        }
    }

    /// `self / pivot` rounded to `decimals` places.
    ///
    /// Returns `None` for a zero pivot or an out-of-range quotient. Mixed
    /// float/decimal operands are computed in the representation of `self`.
    pub fn div_rounded(&self, pivot: &Rate, decimals: u32) -> Option<Rate> {
        if pivot.is_zero() {
            return None;
        }
        match self {
            Rate::Float(v) => {
                let quotient = v / pivot.to_f64();
                quotient
                    .is_finite()
                    .then(|| Rate::Float(round_f64(quotient, decimals)))
            }
            Rate::Decimal(d) => {
                let pivot = match pivot {
                    Rate::Decimal(p) => *p,
                    Rate::Float(p) => Decimal::from_f64_retain(*p)?,
                };
                d.checked_div(pivot)
                    .map(|q| Rate::Decimal(q.round_dp(decimals).normalize()))
            }
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rate::Float(v) => write!(f, "{}", v),
            Rate::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Rate::Float(v) => serializer.serialize_f64(*v),
            // Strings keep every digit; JSON numbers would go through f64.
            Rate::Decimal(d) => serializer.serialize_str(&d.to_string()),
        }
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Rate::Float(value)
    }
}

impl From<Decimal> for Rate {
    fn from(value: Decimal) -> Self {
        Rate::Decimal(value)
    }
}

/// Render a rate for display according to `mode`.
///
/// # Example
/// ```
/// use rusty_oxr::{format_rate, NumericMode, Rate};
///
/// assert_eq!(format_rate(&Rate::Float(3.666311), NumericMode::RoundedFloat), "3.67");
/// assert_eq!(format_rate(&Rate::Float(0.0000123456), NumericMode::RoundedFloat), "0.000012");
/// assert_eq!(format_rate(&Rate::Float(3.666311), NumericMode::Float), "3.666311");
/// ```
pub fn format_rate(rate: &Rate, mode: NumericMode) -> String {
    match (rate, mode) {
        (Rate::Float(v), NumericMode::RoundedFloat) => {
            let two = format!("{:.2}", v);
            if reads_as_zero(&two) {
                format!("{:.6}", v)
            } else {
                two
            }
        }
        (Rate::Decimal(d), NumericMode::RoundedFloat) => {
            let two = format!("{:.2}", d);
            if reads_as_zero(&two) {
                format!("{:.6}", d)
            } else {
                two
            }
        }
        (rate, _) => rate.to_string(),
    }
}

fn reads_as_zero(formatted: &str) -> bool {
    formatted.trim_start_matches('-').trim_matches(|c| c == '0' || c == '.').is_empty()
}

/// Round to `decimals` places by formatting then re-parsing.
///
/// Rounding looks at the exact binary value, not the printed literal:
/// `2.675` is stored just below the tie and rounds to `2.67`.
pub(crate) fn round_f64(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

fn parse_decimal(literal: &str) -> Option<Decimal> {
    if literal.contains(['e', 'E']) {
        Decimal::from_scientific(literal).ok()
    } else {
        Decimal::from_str(literal).ok()
    }
}
