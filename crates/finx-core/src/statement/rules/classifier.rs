//! Line classification: year headers, line-item rows, and noise.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use tracing::trace;

use crate::models::statement::{CanonicalItem, LinePosition, RawLine};

use super::aliases::{AliasMatch, AliasRegistry};
use super::numbers::{is_currency_marker, is_placeholder, parse_number_with_locale, NumberLocale};
use super::patterns::YEAR_TOKEN;

/// A matched line-item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Canonical item the label resolved to.
    pub item: CanonicalItem,
    /// Figures left to right; `None` where a token did not parse.
    pub values: Vec<Option<Decimal>>,
    /// Source position of the line.
    pub position: LinePosition,
}

/// What a line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Two or more fiscal years, in the order they appear. A header that
    /// also starts with an item label carries that row, years removed.
    YearHeader {
        years: Vec<i32>,
        row: Option<ParsedRow>,
    },
    /// A recognized line item with its figures.
    ItemRow(ParsedRow),
    /// Anything else.
    Noise,
}

/// Classifies single lines of statement text.
pub struct LineClassifier<'r> {
    registry: &'r AliasRegistry,
    year_range: RangeInclusive<i32>,
    locale: NumberLocale,
    drop_year_tokens: bool,
}

impl<'r> LineClassifier<'r> {
    /// Create a classifier with default settings.
    pub fn new(registry: &'r AliasRegistry) -> Self {
        Self {
            registry,
            year_range: 1900..=2100,
            locale: NumberLocale::Comma,
            drop_year_tokens: true,
        }
    }

    /// Set the plausible fiscal year range.
    pub fn with_year_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.year_range = range;
        self
    }

    /// Set the number locale.
    pub fn with_number_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Set whether bare year tokens are dropped from row figures.
    pub fn with_year_token_dropping(mut self, drop: bool) -> Self {
        self.drop_year_tokens = drop;
        self
    }

    /// The fiscal year a token denotes, if it is a bare plausible year.
    pub fn year_token(&self, token: &str) -> Option<i32> {
        let caps = YEAR_TOKEN.captures(token)?;
        let year: i32 = caps[1].parse().ok()?;
        self.year_range.contains(&year).then_some(year)
    }

    /// Classify one line.
    pub fn classify(&self, line: &RawLine) -> LineKind {
        let tokens: Vec<&str> = line.text.split_whitespace().collect();
        if tokens.is_empty() {
            return LineKind::Noise;
        }

        let years: Vec<i32> = tokens.iter().filter_map(|t| self.year_token(t)).collect();
        if years.len() >= 2 {
            let row = self.item_row(&tokens, line, true);
            trace!(
                "Line {:?} is a year header: {:?} (inline item: {})",
                line.position,
                years,
                row.is_some()
            );
            return LineKind::YearHeader { years, row };
        }

        match self.item_row(&tokens, line, self.drop_year_tokens) {
            Some(row) => LineKind::ItemRow(row),
            None => LineKind::Noise,
        }
    }

    fn item_row(&self, tokens: &[&str], line: &RawLine, drop_years: bool) -> Option<ParsedRow> {
        // Label runs until the first figure-like token
        let label_len = tokens
            .iter()
            .position(|t| t.chars().any(|c| c.is_ascii_digit()) || is_placeholder(t))
            .unwrap_or(tokens.len());
        if label_len == 0 {
            return None;
        }

        let label = tokens[..label_len].join(" ");
        let item = match self.registry.resolve(&label) {
            AliasMatch::Matched(item) => item,
            AliasMatch::Unmatched => return None,
        };

        let values: Vec<Option<Decimal>> = tokens[label_len..]
            .iter()
            .filter(|t| !is_currency_marker(t))
            .filter(|t| !(drop_years && self.year_token(t).is_some()))
            .map(|t| parse_number_with_locale(t, self.locale).value())
            .collect();

        trace!(
            "Line {:?} is {} with {} values",
            line.position,
            item,
            values.len()
        );

        Some(ParsedRow {
            item,
            values,
            position: line.position,
        })
    }
}
