//! HTML table rendering of a rate table

use crate::currency::CurrencyNameTable;
use crate::rate::format_rate;
use crate::rate_table::RateTable;

/// Rendered ahead of every other row, in table order
pub const PRIORITY_CODES: [&str; 2] = ["EUR", "USD"];

/// Name shown for codes missing from the name table
pub const UNKNOWN_NAME: &str = "???";

const HEADER: &str = "<thead><th>#</th><th>Code</th><th>Price</th><th>Name</th></thead>";

/// Render `table` as an HTML `<table>`.
///
/// Each row carries the rate's position in `table`, its code, the rate
/// formatted for the table's numeric mode, and the currency name. `EUR` and
/// `USD` rows come first; row indices keep their original positions.
///
/// # Example
/// ```
/// use rusty_oxr::{render_html, CurrencyNameTable, NumericMode, Rate, RateTable};
///
/// let table = RateTable::from_rates(
///     "USD",
///     NumericMode::RoundedFloat,
///     vec![("AED", Rate::Float(3.666311)), ("USD", Rate::Float(1.0))],
/// );
/// let names = CurrencyNameTable::from_json(r#"{"USD": "United States Dollar"}"#).unwrap();
///
/// let html = render_html(&table, &names, false);
/// assert_eq!(
///     html,
///     "<table><tbody>\
///      <tr><td>1</td><td>USD</td><td>1.00</td><td>United States Dollar</td></tr> \
///      <tr><td>0</td><td>AED</td><td>3.67</td><td>???</td></tr>\
///      </tbody></table>"
/// );
/// ```
pub fn render_html(table: &RateTable, names: &CurrencyNameTable, header: bool) -> String {
    let (priority, rest): (Vec<_>, Vec<_>) = table
        .iter()
        .enumerate()
        .partition(|(_, (code, _))| PRIORITY_CODES.contains(code));

    let rows: Vec<String> = priority
        .into_iter()
        .chain(rest)
        .map(|(index, (code, rate))| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                index,
                escape(code),
                format_rate(rate, table.mode()),
                escape(names.name_or(code, UNKNOWN_NAME)),
            )
        })
        .collect();

    format!(
        "<table>{}<tbody>{}</tbody></table>",
        if header { HEADER } else { "" },
        rows.join(" ")
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
