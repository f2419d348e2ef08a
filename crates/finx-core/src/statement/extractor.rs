//! Statement extraction orchestrator.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::statement::*;

use super::rules::{
    currency::{detect, CurrencyInfo},
    AliasRegistry, LineClassifier, LineKind, NumberLocale, ParsedRow, YearResolver,
};
use super::StatementExtractor;

/// Last row seen for a canonical item, plus what earlier rows looked like.
struct RowState {
    row: ParsedRow,
    occurrences: usize,
    /// Value counts of every occurrence that carried figures.
    value_counts: Vec<usize>,
}

impl RowState {
    fn new(row: ParsedRow) -> Self {
        let value_counts = if row.values.is_empty() {
            Vec::new()
        } else {
            vec![row.values.len()]
        };
        Self {
            row,
            occurrences: 1,
            value_counts,
        }
    }

    /// Later rows overwrite earlier ones.
    fn replace(&mut self, row: ParsedRow) {
        self.occurrences += 1;
        if !row.values.is_empty() {
            self.value_counts.push(row.values.len());
        }
        self.row = row;
    }

    /// Occurrences with figures disagree on how many there are.
    fn inconsistent_counts(&self) -> bool {
        match (self.value_counts.iter().min(), self.value_counts.iter().max()) {
            (Some(min), Some(max)) => min != max,
            _ => false,
        }
    }
}

/// Rule-based income-statement parser.
pub struct StatementParser<'r> {
    /// Alias table used to resolve row labels.
    registry: &'r AliasRegistry,
    /// Plausible fiscal years.
    year_range: RangeInclusive<i32>,
    /// Maximum number of year columns.
    max_years: usize,
    /// Thousands separator convention.
    number_locale: NumberLocale,
    /// Drop bare year tokens from row figures.
    drop_year_tokens: bool,
}

impl StatementParser<'static> {
    /// Create a parser over the standard registry with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a parser over the standard registry from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            registry: AliasRegistry::standard(),
            year_range: config.min_year..=config.max_year,
            max_years: config.max_years.max(1),
            number_locale: config.number_locale,
            drop_year_tokens: config.drop_year_tokens_in_rows,
        }
    }
}

impl<'r> StatementParser<'r> {
    /// Use a different alias registry.
    pub fn with_registry<'a>(self, registry: &'a AliasRegistry) -> StatementParser<'a> {
        StatementParser {
            registry,
            year_range: self.year_range,
            max_years: self.max_years,
            number_locale: self.number_locale,
            drop_year_tokens: self.drop_year_tokens,
        }
    }

    /// Set the plausible fiscal year range.
    pub fn with_year_range(mut self, min_year: i32, max_year: i32) -> Self {
        self.year_range = min_year..=max_year;
        self
    }

    /// Set the maximum number of year columns.
    pub fn with_max_years(mut self, max_years: usize) -> Self {
        self.max_years = max_years.max(1);
        self
    }

    /// Set the number locale.
    pub fn with_number_locale(mut self, locale: NumberLocale) -> Self {
        self.number_locale = locale;
        self
    }

    /// Set whether bare year tokens are dropped from row figures.
    pub fn with_year_token_dropping(mut self, drop: bool) -> Self {
        self.drop_year_tokens = drop;
        self
    }

    fn classifier(&self) -> LineClassifier<'r> {
        LineClassifier::new(self.registry)
            .with_year_range(self.year_range.clone())
            .with_number_locale(self.number_locale)
            .with_year_token_dropping(self.drop_year_tokens)
    }

    /// Extract a document's facts.
    pub fn parse(&self, lines: &[RawLine]) -> DocumentResult {
        let start = Instant::now();
        info!("Extracting statement from {} lines", lines.len());

        if lines.iter().all(|l| l.text.trim().is_empty()) {
            debug!("Document has no text");
            return DocumentResult::empty();
        }

        let classifier = self.classifier();
        let classified: Vec<LineKind> = lines.iter().map(|l| classifier.classify(l)).collect();

        let years = YearResolver::new()
            .with_max_years(self.max_years)
            .resolve(&classified);

        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let CurrencyInfo { currency, units } = detect(&text);

        let mut rows: HashMap<CanonicalItem, RowState> = HashMap::new();
        for kind in classified {
            let row = match kind {
                LineKind::ItemRow(row) => row,
                LineKind::YearHeader { row: Some(row), .. } => row,
                _ => continue,
            };
            match rows.entry(row.item) {
                Entry::Occupied(mut e) => e.get_mut().replace(row),
                Entry::Vacant(e) => {
                    e.insert(RowState::new(row));
                }
            }
        }

        let mut warnings = Vec::new();
        if years.inferred {
            warnings.push(format!(
                "No year header found; using {} placeholder year columns",
                years.len()
            ));
        } else if years.is_empty() && !rows.is_empty() {
            warnings.push("No year columns found; years are Unknown".to_string());
        }
        if currency.is_unclear() {
            warnings.push("Currency could not be detected".to_string());
        }
        if units.is_unclear() {
            warnings.push("Units could not be detected".to_string());
        }

        let document_uncertain = currency.is_unclear() || units.is_unclear() || years.inferred;
        let slots = years.len().max(1);
        let mut facts = Vec::new();

        for item in self.registry.items() {
            let Some(state) = rows.get(&item) else {
                continue;
            };

            let values = &state.row.values;
            let excess = values.len() > slots;
            let inconsistent = state.inconsistent_counts();

            if excess {
                warnings.push(format!(
                    "{}: {} values for {} year columns; extra values dropped",
                    item,
                    values.len(),
                    slots
                ));
            }
            if inconsistent {
                warnings.push(format!(
                    "{}: appears {} times with different value counts",
                    item, state.occurrences
                ));
            }

            // Short rows fill the most recent years first
            let offset = if years.is_ascending() && values.len() < slots {
                slots - values.len()
            } else {
                0
            };

            for index in 0..slots {
                let year = years.get(index).unwrap_or(YearSlot::Unknown);
                let value = index
                    .checked_sub(offset)
                    .and_then(|i| values.get(i))
                    .copied()
                    .flatten();
                let confidence = confidence_flag(
                    value.is_some(),
                    excess || inconsistent,
                    document_uncertain || year == YearSlot::Unknown,
                );

                facts.push(FinancialFact {
                    line_item: item,
                    year,
                    value,
                    currency,
                    units,
                    confidence,
                    source: Some(state.row.position),
                });
            }
        }

        let row_count = facts.iter().filter(|f| f.value.is_some()).count();

        debug!(
            "Extracted {} facts ({} with values) for {} items in {:?}",
            facts.len(),
            row_count,
            rows.len(),
            start.elapsed()
        );

        DocumentResult {
            facts,
            years,
            currency,
            units,
            row_count,
            warnings,
        }
    }
}

impl Default for StatementParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExtractor for StatementParser<'_> {
    fn extract(&self, lines: &[RawLine]) -> DocumentResult {
        self.parse(lines)
    }
}

/// Missing beats ReviewRequired beats LowConfidence beats OK.
fn confidence_flag(has_value: bool, ambiguous: bool, uncertain: bool) -> ConfidenceFlag {
    if !has_value {
        ConfidenceFlag::Missing
    } else if ambiguous {
        ConfidenceFlag::ReviewRequired
    } else if uncertain {
        ConfidenceFlag::LowConfidence
    } else {
        ConfidenceFlag::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SAMPLE: &str = "2023    2022    2021\n\
                          Revenue             45,000  42,000  38,500\n\
                          Net Income           9,800   8,700   7,600";

    fn dec(s: &str) -> Option<Decimal> {
        Some(Decimal::from_str(s).unwrap())
    }

    fn summary(result: &DocumentResult) -> Vec<(CanonicalItem, YearSlot, Option<Decimal>, ConfidenceFlag)> {
        result
            .facts
            .iter()
            .map(|f| (f.line_item, f.year, f.value, f.confidence))
            .collect()
    }

    #[test]
    fn test_sample_with_currency_and_units() {
        let text = format!("(USD in millions)\n{}", SAMPLE);
        let result = StatementParser::new().extract_from_text(&text);

        use CanonicalItem::*;
        use ConfidenceFlag::Ok as OK;
        assert_eq!(
            summary(&result),
            vec![
                (Revenue, YearSlot::Fiscal(2023), dec("45000"), OK),
                (Revenue, YearSlot::Fiscal(2022), dec("42000"), OK),
                (Revenue, YearSlot::Fiscal(2021), dec("38500"), OK),
                (NetIncome, YearSlot::Fiscal(2023), dec("9800"), OK),
                (NetIncome, YearSlot::Fiscal(2022), dec("8700"), OK),
                (NetIncome, YearSlot::Fiscal(2021), dec("7600"), OK),
            ]
        );
        assert_eq!(result.currency, Currency::Usd);
        assert_eq!(result.units, Units::Millions);
        assert_eq!(result.row_count, 6);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_sample_without_signals_is_low_confidence() {
        let result = StatementParser::new().extract_from_text(SAMPLE);

        assert_eq!(result.facts.len(), 6);
        assert_eq!(result.currency, Currency::Unclear);
        assert_eq!(result.units, Units::Unclear);
        assert!(result
            .facts
            .iter()
            .all(|f| f.confidence == ConfidenceFlag::LowConfidence));
        assert_eq!(result.years.fiscal_years(), vec![2023, 2022, 2021]);
    }

    #[test]
    fn test_fewer_values_fill_most_recent_years() {
        let text = "USD millions\n2023 2022 2021\nRevenue 100 90";
        let result = StatementParser::new().extract_from_text(text);

        assert_eq!(
            summary(&result),
            vec![
                (CanonicalItem::Revenue, YearSlot::Fiscal(2023), dec("100"), ConfidenceFlag::Ok),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2022), dec("90"), ConfidenceFlag::Ok),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2021), None, ConfidenceFlag::Missing),
            ]
        );
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_oldest_first_header_fills_recent_years() {
        let text = "USD millions\n2021 2022 2023\nRevenue 100 90\nNet income 5 6 7";
        let result = StatementParser::new().extract_from_text(text);

        assert_eq!(
            summary(&result),
            vec![
                (CanonicalItem::Revenue, YearSlot::Fiscal(2021), None, ConfidenceFlag::Missing),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2022), dec("100"), ConfidenceFlag::Ok),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2023), dec("90"), ConfidenceFlag::Ok),
                (CanonicalItem::NetIncome, YearSlot::Fiscal(2021), dec("5"), ConfidenceFlag::Ok),
                (CanonicalItem::NetIncome, YearSlot::Fiscal(2022), dec("6"), ConfidenceFlag::Ok),
                (CanonicalItem::NetIncome, YearSlot::Fiscal(2023), dec("7"), ConfidenceFlag::Ok),
            ]
        );
    }

    #[test]
    fn test_item_on_header_line_is_kept() {
        let text = "USD millions\nRevenue FY2023 45,000 FY2022 42,000\nNet income 9,800 8,700";
        let result = StatementParser::new().extract_from_text(text);

        assert_eq!(result.years.fiscal_years(), vec![2023, 2022]);
        assert_eq!(
            result.items(),
            vec![CanonicalItem::Revenue, CanonicalItem::NetIncome]
        );
        assert_eq!(
            summary(&result)[..2].to_vec(),
            vec![
                (CanonicalItem::Revenue, YearSlot::Fiscal(2023), dec("45000"), ConfidenceFlag::Ok),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2022), dec("42000"), ConfidenceFlag::Ok),
            ]
        );
        assert_eq!(result.row_count, 4);
    }

    #[test]
    fn test_excess_values_need_review() {
        let text = "USD millions\n2023 2022\nRevenue 100 90 80";
        let result = StatementParser::new().extract_from_text(text);

        assert_eq!(
            summary(&result),
            vec![
                (CanonicalItem::Revenue, YearSlot::Fiscal(2023), dec("100"), ConfidenceFlag::ReviewRequired),
                (CanonicalItem::Revenue, YearSlot::Fiscal(2022), dec("90"), ConfidenceFlag::ReviewRequired),
            ]
        );
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_last_row_wins_and_count_mismatch_flagged() {
        let text = "EUR thousands\n2023 2022\nRevenue 100 90\nSales 110 95\nNet income 5 4\nNet profit 6";
        let result = StatementParser::new().extract_from_text(text);

        let revenue: Vec<_> = result.facts_for(CanonicalItem::Revenue).collect();
        assert_eq!(revenue[0].value, dec("110"));
        assert_eq!(revenue[1].value, dec("95"));
        assert!(revenue.iter().all(|f| f.confidence == ConfidenceFlag::Ok));
        assert_eq!(revenue[0].source, Some(LinePosition { page: 0, line: 3 }));

        let net: Vec<_> = result.facts_for(CanonicalItem::NetIncome).collect();
        assert_eq!(net[0].value, dec("6"));
        assert_eq!(net[0].confidence, ConfidenceFlag::ReviewRequired);
        assert_eq!(net[1].confidence, ConfidenceFlag::Missing);
    }

    #[test]
    fn test_unmatched_items_are_skipped() {
        let result = StatementParser::new().extract_from_text(SAMPLE);
        assert_eq!(
            result.items(),
            vec![CanonicalItem::Revenue, CanonicalItem::NetIncome]
        );
    }

    #[test]
    fn test_every_year_belongs_to_axis() {
        let text = "INR crores\nFY2024 FY2023\nRevenue from operations 1,200 1,050\nEBITDA 300\nFinance costs";
        let result = StatementParser::new().extract_from_text(text);

        for fact in &result.facts {
            assert!(result.years.contains(&fact.year));
        }
        for item in result.items() {
            assert_eq!(result.facts_for(item).count(), result.years.len());
        }
        assert_eq!(
            result.fact(CanonicalItem::InterestExpense, YearSlot::Fiscal(2024)).map(|f| f.confidence),
            Some(ConfidenceFlag::Missing)
        );
    }

    #[test]
    fn test_placeholder_axis_is_low_confidence() {
        let text = "USD millions\nRevenue 100 90\nGross profit 40 35";
        let result = StatementParser::new().extract_from_text(text);

        assert!(result.years.inferred);
        assert_eq!(result.facts.len(), 4);
        assert_eq!(result.facts[0].year, YearSlot::Placeholder(1));
        assert!(result
            .facts
            .iter()
            .all(|f| f.confidence == ConfidenceFlag::LowConfidence));
    }

    #[test]
    fn test_no_axis_yields_single_unknown_fact() {
        let text = "USD millions\nRevenue\nNet income 12";
        let result = StatementParser::new().extract_from_text(text);

        assert!(result.years.is_empty());
        assert_eq!(
            summary(&result),
            vec![
                (CanonicalItem::Revenue, YearSlot::Unknown, None, ConfidenceFlag::Missing),
                (CanonicalItem::NetIncome, YearSlot::Unknown, dec("12"), ConfidenceFlag::LowConfidence),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let parser = StatementParser::new();
        for result in [parser.extract(&[]), parser.extract_from_text("\n  \n")] {
            assert!(result.is_empty());
            assert!(result.years.is_empty());
            assert_eq!(result.currency, Currency::Unclear);
            assert_eq!(result.units, Units::Unclear);
            assert_eq!(result.row_count, 0);
        }
    }

    #[test]
    fn test_noise_only_document() {
        let result = StatementParser::new().extract_from_text("Chairman's letter\nWe had a good year.");
        assert!(result.is_empty());
        assert_eq!(result.row_count, 0);
    }

    #[test]
    fn test_custom_registry() {
        let registry = AliasRegistry::new([(CanonicalItem::Revenue, vec!["turnover"])]);
        let parser = StatementParser::new().with_registry(&registry);

        let result = parser.extract_from_text("GBP\nthousands\n2023 2022\nTurnover 50 40\nRevenue 1 2");
        assert_eq!(result.facts.len(), 2);
        assert_eq!(result.facts[0].value, dec("50"));
    }

    #[test]
    fn test_idempotent() {
        let text = format!("Rs. in lakhs\n{}\nCost of sales (1,000) n/a", SAMPLE);
        let parser = StatementParser::new();

        let first = serde_json::to_string(&parser.extract_from_text(&text)).unwrap();
        let second = serde_json::to_string(&parser.extract_from_text(&text)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            max_years: 2,
            ..ExtractionConfig::default()
        };
        let result = StatementParser::from_config(&config).extract_from_text(SAMPLE);
        assert_eq!(result.years.fiscal_years(), vec![2023, 2022]);
        assert!(result
            .facts
            .iter()
            .all(|f| f.confidence == ConfidenceFlag::ReviewRequired));
    }
}
