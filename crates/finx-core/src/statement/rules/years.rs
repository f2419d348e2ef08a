//! Year column resolution.

use tracing::debug;

use crate::models::statement::{RawLine, YearAxis};

use super::classifier::{LineClassifier, LineKind};

/// Builds the year axis of a document from its classified lines.
pub struct YearResolver {
    max_years: usize,
}

impl YearResolver {
    pub fn new() -> Self {
        Self { max_years: 5 }
    }

    /// Cap the number of year columns.
    pub fn with_max_years(mut self, max_years: usize) -> Self {
        self.max_years = max_years.max(1);
        self
    }

    /// Resolve the axis from already classified lines.
    ///
    /// The earliest year header wins. Without one, the first item row's
    /// value count gives a placeholder axis (`Year 1`, `Year 2`, ...).
    pub fn resolve(&self, lines: &[LineKind]) -> YearAxis {
        if let Some(years) = lines.iter().find_map(|kind| match kind {
            LineKind::YearHeader { years, .. } => Some(years),
            _ => None,
        }) {
            let mut axis = YearAxis::fiscal(years.iter().copied());
            axis.years.truncate(self.max_years);
            debug!("Year axis from header: {:?}", axis.fiscal_years());
            return axis;
        }

        if let Some(row) = lines.iter().find_map(|kind| match kind {
            LineKind::ItemRow(row) => Some(row),
            _ => None,
        }) {
            let count = row.values.len().min(self.max_years);
            if count == 0 {
                return YearAxis::empty();
            }
            debug!(
                "No year header; inferring {} placeholder columns from {}",
                count, row.item
            );
            return YearAxis::placeholders(count);
        }

        YearAxis::empty()
    }
}

impl Default for YearResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify every line and resolve the document's year axis, keeping at
/// most `max_years` columns.
pub fn resolve_years(
    lines: &[RawLine],
    classifier: &LineClassifier<'_>,
    max_years: usize,
) -> YearAxis {
    let classified: Vec<LineKind> = lines.iter().map(|line| classifier.classify(line)).collect();
    YearResolver::new().with_max_years(max_years).resolve(&classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::statement::{CanonicalItem, YearSlot};
    use crate::statement::rules::aliases::AliasRegistry;
    use pretty_assertions::assert_eq;

    fn axis_for(text: &str) -> YearAxis {
        let classifier = LineClassifier::new(AliasRegistry::standard());
        resolve_years(&RawLine::from_text(text), &classifier, 5)
    }

    #[test]
    fn test_earliest_header_wins() {
        let axis = axis_for(
            "Statement of profit and loss\n\
             2023 2022 2021\n\
             Revenue 10 9 8\n\
             Comparatives 2020 2019",
        );
        assert_eq!(axis.fiscal_years(), vec![2023, 2022, 2021]);
        assert!(!axis.inferred);
    }

    #[test]
    fn test_inline_header_with_first_item() {
        let text = "Revenue FY2024 1,200 FY2023 1,050\nNet income 90 80";
        assert_eq!(axis_for(text).fiscal_years(), vec![2024, 2023]);

        let classifier = LineClassifier::new(AliasRegistry::standard());
        let LineKind::YearHeader { row: Some(row), .. } =
            classifier.classify(&RawLine::new("Revenue FY2024 1,200 FY2023 1,050", 0, 0))
        else {
            panic!("expected the header line to keep its item row");
        };
        assert_eq!(row.item, CanonicalItem::Revenue);
        assert_eq!(row.values.len(), 2);
    }

    #[test]
    fn test_placeholder_fallback() {
        let axis = axis_for("Annual report\nRevenue 100 90 80\nNet income 10 9");
        assert_eq!(
            axis.years,
            vec![
                YearSlot::Placeholder(1),
                YearSlot::Placeholder(2),
                YearSlot::Placeholder(3)
            ]
        );
        assert!(axis.inferred);
    }

    #[test]
    fn test_no_rows_no_axis() {
        assert!(axis_for("").is_empty());
        assert!(axis_for("Notes to the accounts").is_empty());
    }

    #[test]
    fn test_axis_capped() {
        let classifier = LineClassifier::new(AliasRegistry::standard());
        let lines = RawLine::from_text("2024 2023 2022 2021 2020 2019 2018");

        let axis = resolve_years(&lines, &classifier, 3);
        assert_eq!(axis.fiscal_years(), vec![2024, 2023, 2022]);
        assert_eq!(resolve_years(&lines, &classifier, 5).len(), 5);
    }
}
