//! Income-statement data models.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized income-statement concept.
///
/// Declaration order is registry order: it fixes both the alias tie-break
/// and the order facts are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalItem {
    #[serde(rename = "Revenue")]
    Revenue,
    #[serde(rename = "Cost of Goods Sold")]
    CostOfGoodsSold,
    #[serde(rename = "Gross Profit")]
    GrossProfit,
    #[serde(rename = "Operating Expenses")]
    OperatingExpenses,
    #[serde(rename = "Research & Development")]
    ResearchAndDevelopment,
    #[serde(rename = "Operating Income")]
    OperatingIncome,
    #[serde(rename = "Interest Expense")]
    InterestExpense,
    #[serde(rename = "Profit Before Tax")]
    ProfitBeforeTax,
    #[serde(rename = "Tax Expense")]
    TaxExpense,
    #[serde(rename = "Net Income")]
    NetIncome,
    #[serde(rename = "Depreciation & Amortization")]
    DepreciationAndAmortization,
    #[serde(rename = "EBITDA")]
    Ebitda,
}

impl CanonicalItem {
    /// Every canonical item in registry order.
    pub const ALL: [CanonicalItem; 12] = [
        CanonicalItem::Revenue,
        CanonicalItem::CostOfGoodsSold,
        CanonicalItem::GrossProfit,
        CanonicalItem::OperatingExpenses,
        CanonicalItem::ResearchAndDevelopment,
        CanonicalItem::OperatingIncome,
        CanonicalItem::InterestExpense,
        CanonicalItem::ProfitBeforeTax,
        CanonicalItem::TaxExpense,
        CanonicalItem::NetIncome,
        CanonicalItem::DepreciationAndAmortization,
        CanonicalItem::Ebitda,
    ];

    /// Display name used in tabular output.
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalItem::Revenue => "Revenue",
            CanonicalItem::CostOfGoodsSold => "Cost of Goods Sold",
            CanonicalItem::GrossProfit => "Gross Profit",
            CanonicalItem::OperatingExpenses => "Operating Expenses",
            CanonicalItem::ResearchAndDevelopment => "Research & Development",
            CanonicalItem::OperatingIncome => "Operating Income",
            CanonicalItem::InterestExpense => "Interest Expense",
            CanonicalItem::ProfitBeforeTax => "Profit Before Tax",
            CanonicalItem::TaxExpense => "Tax Expense",
            CanonicalItem::NetIncome => "Net Income",
            CanonicalItem::DepreciationAndAmortization => "Depreciation & Amortization",
            CanonicalItem::Ebitda => "EBITDA",
        }
    }
}

impl fmt::Display for CanonicalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a line came from in the source document (0-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePosition {
    /// Page index.
    pub page: usize,
    /// Line index within the page.
    pub line: usize,
}

/// A single line of extracted page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// Line text as extracted.
    pub text: String,
    /// Source coordinates, for traceability only.
    pub position: LinePosition,
}

impl RawLine {
    pub fn new(text: impl Into<String>, page: usize, line: usize) -> Self {
        Self {
            text: text.into(),
            position: LinePosition { page, line },
        }
    }

    /// Split a text blob into lines. Form feeds start a new page.
    pub fn from_text(text: &str) -> Vec<RawLine> {
        let pages: Vec<&str> = text.split('\u{000c}').collect();
        Self::from_pages(&pages)
    }

    /// Build lines from page texts in page order.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Vec<RawLine> {
        pages
            .iter()
            .enumerate()
            .flat_map(|(page, text)| {
                text.as_ref()
                    .lines()
                    .enumerate()
                    .map(move |(line, t)| RawLine::new(t, page, line))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// A year column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "YearRepr", try_from = "YearRepr")]
pub enum YearSlot {
    /// A fiscal year read from the document.
    Fiscal(i32),
    /// An anonymous column (`Year 1`, `Year 2`, ...) when no year header exists.
    Placeholder(usize),
    /// No year could be assigned.
    Unknown,
}

impl fmt::Display for YearSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSlot::Fiscal(year) => write!(f, "{}", year),
            YearSlot::Placeholder(n) => write!(f, "Year {}", n),
            YearSlot::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Wire form: fiscal years as numbers, everything else as labels.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Fiscal(i32),
    Label(String),
}

impl From<YearSlot> for YearRepr {
    fn from(slot: YearSlot) -> Self {
        match slot {
            YearSlot::Fiscal(year) => YearRepr::Fiscal(year),
            other => YearRepr::Label(other.to_string()),
        }
    }
}

impl TryFrom<YearRepr> for YearSlot {
    type Error = String;

    fn try_from(repr: YearRepr) -> Result<Self, Self::Error> {
        match repr {
            YearRepr::Fiscal(year) => Ok(YearSlot::Fiscal(year)),
            YearRepr::Label(label) if label == "Unknown" => Ok(YearSlot::Unknown),
            YearRepr::Label(label) => label
                .strip_prefix("Year ")
                .and_then(|n| n.parse().ok())
                .map(YearSlot::Placeholder)
                .ok_or_else(|| format!("invalid year label: {}", label)),
        }
    }
}

/// Ordered year columns of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearAxis {
    /// Columns in document order (left to right = newest to oldest).
    pub years: Vec<YearSlot>,
    /// True when the axis is made of placeholders rather than real years.
    pub inferred: bool,
}

impl YearAxis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Axis from fiscal years, dropping repeats.
    pub fn fiscal(years: impl IntoIterator<Item = i32>) -> Self {
        let mut slots = Vec::new();
        for year in years {
            let slot = YearSlot::Fiscal(year);
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        Self {
            years: slots,
            inferred: false,
        }
    }

    /// Anonymous axis `Year 1..=Year count`.
    pub fn placeholders(count: usize) -> Self {
        Self {
            years: (1..=count).map(YearSlot::Placeholder).collect(),
            inferred: true,
        }
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<YearSlot> {
        self.years.get(index).copied()
    }

    pub fn contains(&self, slot: &YearSlot) -> bool {
        self.years.contains(slot)
    }

    /// True for a fiscal axis listed oldest year first.
    pub fn is_ascending(&self) -> bool {
        let years = self.fiscal_years();
        years.len() >= 2 && years.windows(2).all(|w| w[0] < w[1])
    }

    /// Fiscal years only, in axis order.
    pub fn fiscal_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter_map(|slot| match slot {
                YearSlot::Fiscal(year) => Some(*year),
                _ => None,
            })
            .collect()
    }
}

/// Reporting currency of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "CNY")]
    Cny,
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "AUD")]
    Aud,
    /// No currency signal anywhere in the document.
    #[default]
    Unclear,
}

impl Currency {
    /// ISO code, or `Unclear`.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cny => "CNY",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Unclear => "Unclear",
        }
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, Currency::Unclear)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Scale the figures of a document are reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    Thousands,
    Millions,
    Billions,
    Crores,
    Lakhs,
    #[default]
    Unclear,
}

impl Units {
    pub fn name(&self) -> &'static str {
        match self {
            Units::Thousands => "Thousands",
            Units::Millions => "Millions",
            Units::Billions => "Billions",
            Units::Crores => "Crores",
            Units::Lakhs => "Lakhs",
            Units::Unclear => "Unclear",
        }
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, Units::Unclear)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quality signal attached to every fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceFlag {
    /// Value parsed and aligned to a real year.
    #[serde(rename = "OK")]
    Ok,
    /// Value parsed, but currency/units or the year axis are uncertain.
    LowConfidence,
    /// Row matched but no value exists for this year slot.
    Missing,
    /// Column alignment was ambiguous.
    ReviewRequired,
}

impl ConfidenceFlag {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceFlag::Ok => "OK",
            ConfidenceFlag::LowConfidence => "LowConfidence",
            ConfidenceFlag::Missing => "Missing",
            ConfidenceFlag::ReviewRequired => "ReviewRequired",
        }
    }
}

impl fmt::Display for ConfidenceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One extracted value: a canonical item in one year column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialFact {
    /// Canonical line item.
    pub line_item: CanonicalItem,

    /// Year column, `Unknown` when the document has no year axis.
    pub year: YearSlot,

    /// Parsed value; `None` when the slot is missing.
    pub value: Option<Decimal>,

    /// Document currency.
    pub currency: Currency,

    /// Document units.
    pub units: Units,

    /// Confidence flag.
    pub confidence: ConfidenceFlag,

    /// Position of the source row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LinePosition>,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Facts in registry order, then year-axis order.
    pub facts: Vec<FinancialFact>,

    /// Year axis the facts are aligned to.
    pub years: YearAxis,

    /// Document currency.
    pub currency: Currency,

    /// Document units.
    pub units: Units,

    /// Number of facts that carry a value.
    pub row_count: usize,

    /// Fallbacks taken while extracting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DocumentResult {
    /// Result for a document with no usable content.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts for one canonical item, in axis order.
    pub fn facts_for(&self, item: CanonicalItem) -> impl Iterator<Item = &FinancialFact> {
        self.facts.iter().filter(move |f| f.line_item == item)
    }

    /// The fact for one item and year, if present.
    pub fn fact(&self, item: CanonicalItem, year: YearSlot) -> Option<&FinancialFact> {
        self.facts
            .iter()
            .find(|f| f.line_item == item && f.year == year)
    }

    /// Canonical items that produced facts, in registry order.
    pub fn items(&self) -> Vec<CanonicalItem> {
        let mut items: Vec<CanonicalItem> = Vec::new();
        for fact in &self.facts {
            if !items.contains(&fact.line_item) {
                items.push(fact.line_item);
            }
        }
        items
    }
}
