//! Document-wide currency and unit detection.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::statement::{Currency, Units};

use super::patterns::{CURRENCY_PATTERNS, UNIT_PATTERNS};

/// Currency and scale of a whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub currency: Currency,
    pub units: Units,
}

/// Scan the full document text once per category.
///
/// The signal appearing earliest in the text wins; nothing found means
/// `Unclear`, never a guess.
pub fn detect(text: &str) -> CurrencyInfo {
    CurrencyInfo {
        currency: earliest(text, CURRENCY_PATTERNS.as_slice()).unwrap_or(Currency::Unclear),
        units: earliest(text, UNIT_PATTERNS.as_slice()).unwrap_or(Units::Unclear),
    }
}

fn earliest<T: Copy>(text: &str, patterns: &[(T, Regex)]) -> Option<T> {
    patterns
        .iter()
        .filter_map(|(value, re)| re.find(text).map(|m| (m.start(), *value)))
        .min_by_key(|(start, _)| *start)
        .map(|(_, value)| value)
}
