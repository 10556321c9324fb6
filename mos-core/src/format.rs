use serde_json::Value;

/// Placeholder shown for missing or non-numeric values.
pub const MISSING: &str = "-";

/// Interpret a raw response value as a number.
///
/// Accepts JSON numbers and numeric strings; `null`, the string `"null"` and
/// anything else that does not parse yield `None`.
pub fn numeric(raw: &Value) -> Option<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "null" {
                return None;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Display form of a bound value: `1234.5 -> "1 234.50"`, `1234 -> "1 234"`, `null -> "-"`.
pub fn format_value(raw: &Value) -> String {
    numeric(raw)
        .map(format_number)
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return MISSING.to_string();
    }
    let fixed = format!("{:.2}", n.abs());
    let (int_part, frac) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // Values that round to zero never render as "-0".
    if n < 0.0 && fixed != "0.00" {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if frac != "00" {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Text fields: shown verbatim, `-` when absent.
pub fn format_text(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() && t != "null" => t.to_string(),
        _ => MISSING.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn groups_and_keeps_meaningful_decimals() {
        assert_eq!(format_value(&json!(1234.5)), "1 234.50");
        assert_eq!(format_value(&json!(1234.00)), "1 234");
        assert_eq!(format_value(&json!(1234567.891)), "1 234 567.89");
        assert_eq!(format_value(&json!(999)), "999");
        assert_eq!(format_value(&json!(0.5)), "0.50");
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!("null")), "-");
        assert_eq!(format_value(&json!("n/a")), "-");
        assert_eq!(format_value(&json!("")), "-");
        assert_eq!(format_value(&json!({"value": 1})), "-");
    }

    #[test]
    fn numeric_strings_are_formatted() {
        assert_eq!(format_value(&json!("1234.5")), "1 234.50");
        assert_eq!(format_value(&json!(" 10 ")), "10");
    }

    #[test]
    fn negative_numbers_keep_sign_except_zero() {
        assert_eq!(format_value(&json!(-1234.5)), "-1 234.50");
        assert_eq!(format_value(&json!(-0.001)), "0");
        assert_eq!(format_number(f64::NAN), "-");
    }

    #[test]
    fn text_placeholder() {
        assert_eq!(format_text(Some("Cupertino")), "Cupertino");
        assert_eq!(format_text(Some("null")), "-");
        assert_eq!(format_text(None), "-");
    }
}
