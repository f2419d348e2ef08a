//! Rule-based building blocks for income-statement extraction.

pub mod aliases;
pub mod classifier;
pub mod currency;
pub mod numbers;
pub mod patterns;
pub mod years;

pub use aliases::{normalize, AliasMatch, AliasRegistry, STANDARD_ALIASES};
pub use classifier::{LineClassifier, LineKind, ParsedRow};
pub use currency::{detect, CurrencyInfo};
pub use numbers::{
    is_currency_marker, is_placeholder, parse_number, parse_number_with_locale, NumberLocale,
    NumericToken,
};
pub use years::{resolve_years, YearResolver};
