//! Numeric token parsing for statement figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tokens standing for "no value" in a figure column.
const PLACEHOLDERS: &[&str] = &[
    "-", "--", "–", "—", "n/a", "na", "n.a.", "n.a", "nil", "nm",
];

/// Currency prefixes allowed in front of a figure. Longer forms come first.
const CURRENCY_PREFIXES: &[&str] = &[
    "us$", "usd", "inr", "eur", "gbp", "rs.", "rs", "$", "€", "£", "₹", "¥",
];

/// Thousands separator convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberLocale {
    /// `1,234.56`
    #[default]
    Comma,
    /// `1.234,56`
    Period,
}

/// Outcome of parsing one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericToken {
    /// A signed value.
    Value(Decimal),
    /// An explicit "no value" marker such as `n/a` or `—`.
    Placeholder,
    /// Not a number.
    Invalid,
}

impl NumericToken {
    /// The value, treating placeholders and invalid tokens as null.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            NumericToken::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parse a token using the default comma locale.
pub fn parse_number(token: &str) -> NumericToken {
    parse_number_with_locale(token, NumberLocale::Comma)
}

/// Parse a figure such as `(1,234.50)`, `$45,000`, `12.5%` or `1.234,56`.
///
/// Parentheses mean negative. A trailing percent sign is dropped and the
/// literal value kept. Never panics; anything malformed is `Invalid`.
pub fn parse_number_with_locale(token: &str, locale: NumberLocale) -> NumericToken {
    let token = token.trim();
    if token.is_empty() {
        return NumericToken::Invalid;
    }
    if is_placeholder(token) {
        return NumericToken::Placeholder;
    }

    let mut negative = false;
    let mut s = strip_percent(strip_currency_prefix(token));

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = strip_percent(strip_currency_prefix(inner.trim()));
    } else if let Some(rest) = s.strip_prefix(['-', '\u{2212}', '\u{2013}']) {
        negative = true;
        s = strip_currency_prefix(rest.trim_start());
    }

    if !s.chars().any(|c| c.is_ascii_digit()) {
        return NumericToken::Invalid;
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == '.' || c.is_whitespace())
    {
        // Leftover parentheses, letters or a second sign
        return NumericToken::Invalid;
    }

    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let (group, decimal) = separators(&compact, locale);
    if compact.matches(decimal).count() > 1 {
        return NumericToken::Invalid;
    }

    let normalized: String = compact
        .chars()
        .filter(|c| *c != group)
        .map(|c| if c == decimal { '.' } else { c })
        .collect();

    match Decimal::from_str(&normalized) {
        Ok(value) if negative => NumericToken::Value(-value),
        Ok(value) => NumericToken::Value(value),
        Err(_) => NumericToken::Invalid,
    }
}

/// Whether a token is an explicit "no value" marker.
pub fn is_placeholder(token: &str) -> bool {
    let lower = token.trim().to_lowercase();
    PLACEHOLDERS.contains(&lower.as_str())
}

/// Whether a token is a bare currency symbol or code (`$`, `USD`, `Rs.`).
pub fn is_currency_marker(token: &str) -> bool {
    let lower = token.trim().to_lowercase();
    CURRENCY_PREFIXES.contains(&lower.as_str())
}

fn strip_currency_prefix(s: &str) -> &str {
    for prefix in CURRENCY_PREFIXES {
        if let Some(head) = s.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return s[prefix.len()..].trim_start();
            }
        }
    }
    s
}

fn strip_percent(s: &str) -> &str {
    s.strip_suffix('%').map(str::trim_end).unwrap_or(s)
}

/// Pick (group, decimal) separators. When both appear and the later one is
/// the locale's group separator, the token is read the other way round.
fn separators(s: &str, locale: NumberLocale) -> (char, char) {
    let (group, decimal) = match locale {
        NumberLocale::Comma => (',', '.'),
        NumberLocale::Period => ('.', ','),
    };

    match (s.rfind(group), s.rfind(decimal)) {
        (Some(g), Some(d)) if g > d => (decimal, group),
        _ => (group, decimal),
    }
}
