use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Characters accepted in a ticker query: ASCII letters and digits plus `,`, `.`, `-`.
pub fn is_ticker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '-')
}

/// A stock symbol as typed by the user.
///
/// The original casing is kept; equality ignores ASCII case so `aapl` and
/// `AAPL` are the same entry in the recent and favourite lists.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyTicker);
        }
        if let Some(ch) = trimmed.chars().find(|c| !is_ticker_char(*c)) {
            return Err(Error::InvalidTicker {
                input: trimmed.to_string(),
                ch,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used in page paths (`/AAPL`).
    pub fn canonical(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl PartialEq for Ticker {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
