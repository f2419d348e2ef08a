//! Canonical line items and the aliases that name them.

use lazy_static::lazy_static;

use crate::models::statement::CanonicalItem;

lazy_static! {
    static ref STANDARD: AliasRegistry = AliasRegistry::new(STANDARD_ALIASES.iter().copied());
}

/// Alias table of the standard registry, in registry order.
pub const STANDARD_ALIASES: &[(CanonicalItem, &[&str])] = &[
    (CanonicalItem::Revenue, &[
        "revenue", "net sales", "total revenue", "net revenue",
        "sales", "total net revenue", "total sales", "gross revenue",
    ]),
    (CanonicalItem::CostOfGoodsSold, &[
        "cost of goods sold", "cost of sales", "cost of revenue",
        "cogs", "cost of products sold",
    ]),
    (CanonicalItem::GrossProfit, &[
        "gross profit", "gross margin", "gross income",
    ]),
    (CanonicalItem::OperatingExpenses, &[
        "operating expenses", "operating costs", "total operating expenses",
        "selling general and administrative", "sg&a", "operating expenditure",
    ]),
    (CanonicalItem::ResearchAndDevelopment, &[
        "research and development", "r&d", "r & d expenses",
        "research & development expenses",
    ]),
    (CanonicalItem::OperatingIncome, &[
        "operating income", "operating profit", "income from operations",
        "profit from operations", "ebit",
    ]),
    (CanonicalItem::InterestExpense, &[
        "interest expense", "finance costs", "interest cost",
        "interest charges", "net interest expense",
    ]),
    (CanonicalItem::ProfitBeforeTax, &[
        "profit before tax", "pbt", "income before tax",
        "earnings before tax", "pre-tax income", "pretax income",
    ]),
    (CanonicalItem::TaxExpense, &[
        "income tax", "tax expense", "provision for income taxes",
        "income tax expense", "income taxes",
    ]),
    (CanonicalItem::NetIncome, &[
        "net income", "net profit", "profit after tax", "pat",
        "net earnings", "profit for the year", "profit for the period",
        "net income attributable", "net profit after tax",
    ]),
    (CanonicalItem::DepreciationAndAmortization, &[
        "depreciation", "amortization", "depreciation and amortization",
        "d&a", "depreciation & amortization",
    ]),
    (CanonicalItem::Ebitda, &[
        "ebitda", "earnings before interest tax depreciation amortization",
    ]),
];

/// Result of resolving a label against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasMatch {
    Matched(CanonicalItem),
    Unmatched,
}

impl AliasMatch {
    pub fn item(&self) -> Option<CanonicalItem> {
        match self {
            AliasMatch::Matched(item) => Some(*item),
            AliasMatch::Unmatched => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Alias {
    /// Normalized form, space padded for token containment.
    padded: String,
    /// Length of the normalized form, used for the longest-match rule.
    len: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    item: CanonicalItem,
    aliases: Vec<Alias>,
}

/// Immutable mapping from canonical items to their aliases.
///
/// Matching is exact containment of normalized alias tokens. When several
/// aliases match, the longest wins; on equal length the item registered
/// first wins.
#[derive(Debug, Clone)]
pub struct AliasRegistry {
    entries: Vec<Entry>,
}

impl AliasRegistry {
    /// Build a registry from (item, aliases) pairs in registry order.
    pub fn new<I, A, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalItem, A)>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(item, aliases)| Entry {
                item,
                aliases: aliases
                    .into_iter()
                    .map(|a| normalize(a.as_ref()))
                    .filter(|n| !n.is_empty())
                    .map(|n| Alias {
                        len: n.chars().count(),
                        padded: format!(" {} ", n),
                    })
                    .collect(),
            })
            .collect();

        Self { entries }
    }

    /// The process-wide standard registry.
    pub fn standard() -> &'static AliasRegistry {
        &STANDARD
    }

    /// Resolve a label to a canonical item.
    pub fn resolve(&self, text: &str) -> AliasMatch {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return AliasMatch::Unmatched;
        }
        let padded = format!(" {} ", normalized);

        let mut best: Option<(CanonicalItem, usize)> = None;
        for entry in &self.entries {
            for alias in &entry.aliases {
                if alias.len > best.map_or(0, |(_, len)| len) && padded.contains(&alias.padded) {
                    best = Some((entry.item, alias.len));
                }
            }
        }

        match best {
            Some((item, _)) => AliasMatch::Matched(item),
            None => AliasMatch::Unmatched,
        }
    }

    /// Registered items, in registry order, without repeats.
    pub fn items(&self) -> Vec<CanonicalItem> {
        let mut items = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !items.contains(&entry.item) {
                items.push(entry.item);
            }
        }
        items
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        AliasRegistry::standard().clone()
    }
}

/// Lowercase, spell out `&`, turn other punctuation into spaces, and
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '&' {
            out.push_str(" and ");
        } else if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  NET SALES, "), "net sales");
        assert_eq!(normalize("SG&A"), "sg and a");
        assert_eq!(normalize("Pre-tax   income:"), "pre tax income");
    }

    #[test]
    fn test_every_alias_resolves_to_its_item() {
        let registry = AliasRegistry::standard();
        for (item, aliases) in STANDARD_ALIASES {
            for alias in *aliases {
                assert_eq!(registry.resolve(alias), AliasMatch::Matched(*item), "{}", alias);

                let shouted = format!("{}:", alias.to_uppercase());
                assert_eq!(registry.resolve(&shouted), AliasMatch::Matched(*item), "{}", shouted);
            }
        }
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let registry = AliasRegistry::standard();
        assert_eq!(registry.resolve("NET SALES,"), AliasMatch::Matched(CanonicalItem::Revenue));
        assert_eq!(
            registry.resolve("Research & Development"),
            AliasMatch::Matched(CanonicalItem::ResearchAndDevelopment)
        );
    }

    #[test]
    fn test_longest_alias_wins() {
        let registry = AliasRegistry::new([
            (CanonicalItem::OperatingIncome, vec!["income"]),
            (CanonicalItem::NetIncome, vec!["net income"]),
        ]);
        assert_eq!(
            registry.resolve("Net Income"),
            AliasMatch::Matched(CanonicalItem::NetIncome)
        );
        assert_eq!(
            registry.resolve("Other income"),
            AliasMatch::Matched(CanonicalItem::OperatingIncome)
        );

        let standard = AliasRegistry::standard();
        assert_eq!(
            standard.resolve("Cost of revenue"),
            AliasMatch::Matched(CanonicalItem::CostOfGoodsSold)
        );
        assert_eq!(
            standard.resolve("Income tax expense"),
            AliasMatch::Matched(CanonicalItem::TaxExpense)
        );
    }

    #[test]
    fn test_equal_length_prefers_first_registered() {
        let registry = AliasRegistry::new([
            (CanonicalItem::GrossProfit, vec!["margin"]),
            (CanonicalItem::OperatingIncome, vec!["profit"]),
        ]);
        assert_eq!(
            registry.resolve("profit margin"),
            AliasMatch::Matched(CanonicalItem::GrossProfit)
        );
    }

    #[test]
    fn test_token_containment_only() {
        let registry = AliasRegistry::standard();
        // "ebit" must not match inside "ebitda", nor "pat" inside "patents"
        assert_eq!(registry.resolve("EBITDA"), AliasMatch::Matched(CanonicalItem::Ebitda));
        assert_eq!(registry.resolve("Patents and licences"), AliasMatch::Unmatched);
        assert_eq!(registry.resolve("Earnings per share"), AliasMatch::Unmatched);
        assert_eq!(registry.resolve(""), AliasMatch::Unmatched);
    }

    #[test]
    fn test_items_in_registry_order() {
        let items = AliasRegistry::standard().items();
        assert_eq!(items, CanonicalItem::ALL.to_vec());
    }
}
