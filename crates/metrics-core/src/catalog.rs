//! Static catalog of tracked companies and the upstream series behind each metric.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// One of the nine financial line items surfaced per company.
///
/// Variant order is the order metrics appear in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    Revenue,
    OperatingIncome,
    OperatingMargin,
    NetIncome,
    DilutedEps,
    OperatingCashFlow,
    Capex,
    StockBasedCompensation,
    FreeCashFlow,
}

impl MetricName {
    pub const ALL: [MetricName; 9] = [
        MetricName::Revenue,
        MetricName::OperatingIncome,
        MetricName::OperatingMargin,
        MetricName::NetIncome,
        MetricName::DilutedEps,
        MetricName::OperatingCashFlow,
        MetricName::Capex,
        MetricName::StockBasedCompensation,
        MetricName::FreeCashFlow,
    ];

    /// Display label, also used as the JSON key.
    pub fn label(&self) -> &'static str {
        match self {
            MetricName::Revenue => "Revenue",
            MetricName::OperatingIncome => "Operating Income",
            MetricName::OperatingMargin => "Operating Margin",
            MetricName::NetIncome => "Net Income",
            MetricName::DilutedEps => "Diluted EPS",
            MetricName::OperatingCashFlow => "Cash from operating activities",
            MetricName::Capex => "Capex",
            MetricName::StockBasedCompensation => "Stock Based Compensation",
            MetricName::FreeCashFlow => "Free Cash Flow",
        }
    }

    /// Upstream series identifiers for this metric, highest priority first.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            MetricName::Revenue => &["annualTotalRevenue"],
            MetricName::OperatingIncome => &["annualOperatingIncome"],
            MetricName::OperatingMargin => &["annualOperatingProfitMargin", "annualOperatingMargin"],
            MetricName::NetIncome => &["annualNetIncome", "annualNetIncomeCommonStockholders"],
            MetricName::DilutedEps => &["annualDilutedEPS", "annualBasicEPS"],
            MetricName::OperatingCashFlow => &["annualOperatingCashFlow"],
            MetricName::Capex => &["annualCapitalExpenditure"],
            MetricName::StockBasedCompensation => &["annualStockBasedCompensation"],
            MetricName::FreeCashFlow => &["annualFreeCashFlow"],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }

    /// Position in [`MetricName::ALL`].
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Every series identifier referenced by any metric, deduplicated and sorted.
pub fn all_identifiers() -> Vec<&'static str> {
    MetricName::ALL
        .iter()
        .flat_map(|m| m.candidates().iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A company the dashboard knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Company {
    pub ticker: &'static str,
    pub name: &'static str,
}

const fn company(ticker: &'static str, name: &'static str) -> Company {
    Company { ticker, name }
}

pub const COMPANIES: &[Company] = &[
    company("MSFT", "Microsoft"),
    company("BRK-B", "Berkshire Hathaway"),
    company("COST", "Costco"),
    company("GOOGL", "Alphabet"),
    company("V", "Visa"),
    company("AMZN", "Amazon"),
    company("SPGI", "S&P Global"),
    company("AAPL", "Apple"),
    company("META", "Meta"),
    company("ADBE", "Adobe"),
    company("NVDA", "Nvidia"),
    company("NFLX", "Netflix"),
    company("DIS", "Disney"),
    company("MSCI", "MSCI"),
    company("MCO", "Moody's"),
    company("MA", "Mastercard"),
    company("AXP", "American Express"),
    company("JPM", "JPMorgan Chase"),
    company("ALV.DE", "Allianz"),
    company("LMT", "Lockheed Martin"),
    company("JNJ", "Johnson & Johnson"),
    company("BEI.DE", "Beiersdorf"),
    company("HEN3.DE", "Henkel"),
    company("PG", "Procter & Gamble"),
    company("MCD", "McDonald's"),
    company("LIN", "Linde"),
    company("CVX", "Chevron"),
    company("RIO", "Rio Tinto"),
    company("O", "Realty Income REIT"),
    company("DNP.WA", "Dino Polska"),
];

/// Look up a tracked company. Matching is done on the upper-cased ticker.
pub fn find_company(ticker: &str) -> Option<&'static Company> {
    let ticker = ticker.to_uppercase();
    COMPANIES.iter().find(|c| c.ticker == ticker)
}
