//! The older form-post search page.
//!
//! The endpoint answers with a JSON string that itself holds the JSON
//! payload. Cells are coloured by banding each figure against fixed ranges.

use serde_json::Value;

use crate::binder::{apply_all, BindReport, BindTarget, Binding, Content};
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::notification::NotificationConfig;

pub const BIG_FIVE: [&str; 5] = ["eps", "sales", "equity", "roic", "cash"];
pub const BIG_FIVE_SUFFIXES: [&str; 4] = ["_1_val", "_3_val", "_5_val", "_max_val"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Green,
    Yellow,
    Orange,
    Red,
    White,
}

impl Band {
    pub fn hex(&self) -> &'static str {
        match self {
            Band::Green => "#C3E6CB",
            Band::Yellow => "#FFF0B5",
            Band::Orange => "#FFD8A8",
            Band::Red => "#ffbdc4",
            Band::White => "#FFFFFF",
        }
    }
}

/// Higher is better: red below `range[0]`, green from `range[2]`.
pub fn band_ascending(value: f64, range: [f64; 3]) -> Band {
    if value >= range[2] {
        Band::Green
    } else if value >= range[1] {
        Band::Yellow
    } else if value >= range[0] {
        Band::Orange
    } else {
        Band::Red
    }
}

/// Lower is better: green below `range[0]`, red from `range[2]`.
pub fn band_descending(value: f64, range: [f64; 3]) -> Band {
    if value >= range[2] {
        Band::Red
    } else if value >= range[1] {
        Band::Orange
    } else if value >= range[0] {
        Band::Yellow
    } else {
        Band::Green
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub text: String,
    pub band: Option<Band>,
}

impl Cell {
    fn new(id: impl Into<String>, text: impl Into<String>, band: Option<Band>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            band,
        }
    }

    pub fn into_binding(self) -> Binding {
        let content = match self.band {
            Some(band) => Content::Shaded {
                text: self.text,
                background: band.hex().to_string(),
            },
            None => Content::Text(Some(self.text)),
        };
        Binding {
            id: self.id,
            content,
        }
    }
}

/// Unwrap the doubly-encoded payload; an `error` field becomes [`Error::Legacy`].
pub fn decode_payload(body: &str) -> Result<Value> {
    let outer: Value = serde_json::from_str(body)?;
    let data = match outer {
        Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    match data.get("error") {
        Some(Value::String(msg)) if !msg.is_empty() => Err(Error::Legacy(msg.clone())),
        _ => Ok(data),
    }
}

/// The toast shown for a failed lookup.
pub fn error_toast(err: &Error, config: &DashboardConfig) -> NotificationConfig {
    let message = match err {
        Error::Legacy(msg) => msg.clone(),
        other => other.to_string(),
    };
    NotificationConfig::error("Search failed", message)
        .with_id("legacy_error")
        .with_time(config.legacy_toast_ms)
        .small()
}

/// Numbers the page treats as present: missing, `null` and `0` all count as absent.
fn present(data: &Value, key: &str) -> Option<f64> {
    data.get(key)
        .and_then(Value::as_f64)
        .filter(|v| *v != 0.0)
}

fn plain(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `1234567.891 -> "1,234,567.891"`: comma grouping, at most three decimals.
fn grouped(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let len = int_part.len();
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn figure(data: &Value, key: &str, commas: bool) -> (String, f64) {
    match present(data, key) {
        Some(v) if commas => (grouped(v), v),
        Some(v) => (format!("{v:.2}"), v),
        None => ("Undefined".to_string(), f64::NAN),
    }
}

fn big_five_cells(data: &Value, key: &str, out: &mut Vec<Cell>) {
    let row = data
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (i, suffix) in BIG_FIVE_SUFFIXES.iter().enumerate() {
        let id = format!("{key}{suffix}");
        match row.get(i) {
            None => {
                let band = if i == 0 { Band::Red } else { Band::White };
                out.push(Cell::new(id, "-", Some(band)));
            }
            Some(value) => {
                let numeric = value
                    .as_f64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                    .unwrap_or(f64::NAN);
                out.push(Cell::new(
                    id,
                    plain(value),
                    Some(band_ascending(numeric, [0.0, 5.0, 10.0])),
                ));
            }
        }
    }
}

/// Every cell the legacy page fills for a decoded payload.
pub fn cells(data: &Value) -> Vec<Cell> {
    let mut out = Vec::new();
    for key in BIG_FIVE {
        big_five_cells(data, key, &mut out);
    }

    let (text, ratio) = figure(data, "debt_equity_ratio", true);
    if ratio == -1.0 {
        out.push(Cell::new("debt_equity_ratio", "-", Some(Band::White)));
    } else {
        out.push(Cell::new(
            "debt_equity_ratio",
            text,
            Some(band_descending(ratio, [1.0, 2.0, 3.0])),
        ));
    }

    let (text, _) = figure(data, "long_term_debt", true);
    out.push(Cell::new("long_term_debt", text, None));
    let (text, cash_flow) = figure(data, "free_cash_flow", true);
    out.push(Cell::new("free_cash_flow", text, None));

    if cash_flow >= 0.0 {
        let (text, payoff) = figure(data, "debt_payoff_time", false);
        out.push(Cell::new(
            "debt_payoff_time",
            text,
            Some(band_descending(payoff, [2.0, 3.0, 4.0])),
        ));
    } else {
        out.push(Cell::new(
            "debt_payoff_time",
            "Negative Cash Flow",
            Some(Band::Red),
        ));
    }

    let (text, _) = figure(data, "margin_of_safety_price", false);
    out.push(Cell::new("margin_of_safety_price", text, None));
    let (text, price) = figure(data, "current_price", false);
    let band = match present(data, "margin_of_safety_price") {
        Some(mos) => band_descending(price, [mos, mos * 1.25, mos * 1.5]),
        None => Band::Red,
    };
    out.push(Cell::new("current_price", text, Some(band)));
    out
}

/// Decode a legacy response and write it into `target`, or return the toast to show.
pub fn handle_response(
    body: &str,
    target: &mut dyn BindTarget,
    config: &DashboardConfig,
) -> std::result::Result<BindReport, NotificationConfig> {
    match decode_payload(body) {
        Ok(data) => {
            let bindings = cells(&data).into_iter().map(Cell::into_binding).collect();
            Ok(apply_all(bindings, target))
        }
        Err(err) => Err(error_toast(&err, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::tests::FakePage;
    use serde_json::json;

    fn cell<'a>(cells: &'a [Cell], id: &str) -> &'a Cell {
        cells.iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn bands() {
        assert_eq!(band_ascending(12.0, [0.0, 5.0, 10.0]), Band::Green);
        assert_eq!(band_ascending(5.0, [0.0, 5.0, 10.0]), Band::Yellow);
        assert_eq!(band_ascending(0.0, [0.0, 5.0, 10.0]), Band::Orange);
        assert_eq!(band_ascending(-1.0, [0.0, 5.0, 10.0]), Band::Red);
        assert_eq!(band_ascending(f64::NAN, [0.0, 5.0, 10.0]), Band::Red);
        assert_eq!(band_descending(0.5, [1.0, 2.0, 3.0]), Band::Green);
        assert_eq!(band_descending(3.0, [1.0, 2.0, 3.0]), Band::Red);
    }

    #[test]
    fn decodes_double_encoded_payload() {
        let body = serde_json::to_string(&json!({"eps": [1, 2]}).to_string()).unwrap();
        assert_eq!(decode_payload(&body).unwrap(), json!({"eps": [1, 2]}));

        let failed = serde_json::to_string(r#"{"error": "Invalid ticker"}"#).unwrap();
        match decode_payload(&failed) {
            Err(Error::Legacy(msg)) => assert_eq!(msg, "Invalid ticker"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn big_five_rows_fill_four_cells() {
        let cells = cells(&json!({"eps": [12.5, 4], "sales": []}));
        assert_eq!(cell(&cells, "eps_1_val").text, "12.5");
        assert_eq!(cell(&cells, "eps_1_val").band, Some(Band::Green));
        assert_eq!(cell(&cells, "eps_3_val").band, Some(Band::Orange));
        assert_eq!(cell(&cells, "eps_5_val").text, "-");
        assert_eq!(cell(&cells, "eps_5_val").band, Some(Band::White));
        assert_eq!(cell(&cells, "sales_1_val").band, Some(Band::Red));
    }

    #[test]
    fn management_and_price_cells() {
        let cells = cells(&json!({
            "debt_equity_ratio": 1.5,
            "long_term_debt": 1234567,
            "free_cash_flow": 250000.5,
            "debt_payoff_time": 2.5,
            "margin_of_safety_price": 100,
            "current_price": 130
        }));
        assert_eq!(cell(&cells, "debt_equity_ratio").band, Some(Band::Yellow));
        assert_eq!(cell(&cells, "long_term_debt").text, "1,234,567");
        assert_eq!(cell(&cells, "free_cash_flow").text, "250,000.5");
        assert_eq!(cell(&cells, "debt_payoff_time").text, "2.50");
        assert_eq!(cell(&cells, "debt_payoff_time").band, Some(Band::Yellow));
        assert_eq!(cell(&cells, "current_price").text, "130.00");
        assert_eq!(cell(&cells, "current_price").band, Some(Band::Orange));
    }

    #[test]
    fn missing_figures() {
        let cells = cells(&json!({"debt_equity_ratio": -1, "free_cash_flow": -10}));
        assert_eq!(cell(&cells, "debt_equity_ratio").text, "-");
        assert_eq!(cell(&cells, "debt_payoff_time").text, "Negative Cash Flow");
        assert_eq!(cell(&cells, "margin_of_safety_price").text, "Undefined");
        assert_eq!(cell(&cells, "current_price").band, Some(Band::Red));
    }

    #[test]
    fn handle_response_binds_or_toasts() {
        let config = DashboardConfig::default();
        let mut page = FakePage::with_ids(&["current_price", "eps_1_val"]);
        let body = serde_json::to_string(&json!({"current_price": 10, "eps": [3]}).to_string())
            .unwrap();
        let report = handle_response(&body, &mut page, &config).unwrap();
        assert_eq!(report.applied, ["eps_1_val", "current_price"]);
        assert_eq!(
            page.content("eps_1_val"),
            Some(&Content::Shaded {
                text: "3".into(),
                background: "#FFD8A8".into()
            })
        );

        let failed = serde_json::to_string(r#"{"error": "Unknown ticker"}"#).unwrap();
        let toast = handle_response(&failed, &mut page, &config).unwrap_err();
        assert_eq!(toast.description, "Unknown ticker");
        assert_eq!(toast.time_ms, Some(3_500));
    }
}
