//! Aligns per-series values onto a common window of report dates and resolves
//! each metric with priority fallback and derived values.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{MetricName, SeriesSet};

/// Most recent report dates kept per company.
pub const WINDOW_SIZE: usize = 10;

/// Resolved values for every metric, one slot per window date.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricMatrix {
    columns: [Vec<Option<f64>>; 9],
}

impl MetricMatrix {
    fn with_len(len: usize) -> Self {
        Self {
            columns: std::array::from_fn(|_| vec![None; len]),
        }
    }

    pub fn get(&self, metric: MetricName) -> &[Option<f64>] {
        &self.columns[metric.index()]
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metrics in declaration order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, &[Option<f64>])> {
        MetricName::ALL
            .into_iter()
            .map(move |m| (m, self.get(m)))
    }

    fn cell(&self, metric: MetricName, i: usize) -> Option<f64> {
        self.columns[metric.index()][i]
    }

    fn set(&mut self, metric: MetricName, i: usize, value: Option<f64>) {
        self.columns[metric.index()][i] = value;
    }
}

impl std::ops::Index<MetricName> for MetricMatrix {
    type Output = [Option<f64>];

    fn index(&self, metric: MetricName) -> &Self::Output {
        self.get(metric)
    }
}

// Keys keep metric declaration order rather than alphabetical order.
impl Serialize for MetricMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MetricName::ALL.len()))?;
        for (metric, values) in self.iter() {
            map.serialize_entry(metric.label(), values)?;
        }
        map.end()
    }
}

/// The aligned report dates and the metric values resolved for them.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMetrics {
    /// Report dates, ascending, at most [`WINDOW_SIZE`] entries.
    pub window: Vec<String>,
    pub metrics: MetricMatrix,
}

impl AlignedMetrics {
    /// Fiscal year labels (date prefix) for each window date.
    pub fn years(&self) -> Vec<String> {
        self.window
            .iter()
            .map(|d| d.chars().take(4).collect())
            .collect()
    }
}

/// Resolve all metrics over the most recent [`WINDOW_SIZE`] report dates.
pub fn align_metrics(series: &SeriesSet) -> AlignedMetrics {
    let dates = series.dates();
    let skip = dates.len().saturating_sub(WINDOW_SIZE);
    let window: Vec<String> = dates.into_iter().skip(skip).map(str::to_string).collect();

    let mut metrics = MetricMatrix::with_len(window.len());

    for (i, date) in window.iter().enumerate() {
        for metric in MetricName::ALL {
            let value = metric
                .candidates()
                .iter()
                .find_map(|id| series.value(id, date));
            metrics.set(metric, i, value);
        }
    }

    derive_operating_margin(&mut metrics);
    derive_free_cash_flow(&mut metrics);

    AlignedMetrics { window, metrics }
}

fn derive_operating_margin(metrics: &mut MetricMatrix) {
    for i in 0..metrics.len() {
        if metrics.cell(MetricName::OperatingMargin, i).is_some() {
            continue;
        }
        let revenue = metrics.cell(MetricName::Revenue, i);
        let operating_income = metrics.cell(MetricName::OperatingIncome, i);
        if let (Some(revenue), Some(operating_income)) = (revenue, operating_income) {
            if revenue != 0.0 {
                metrics.set(MetricName::OperatingMargin, i, Some(operating_income / revenue));
            }
        }
    }
}

// Capex arrives signed (outflows negative), so it is added, not subtracted.
fn derive_free_cash_flow(metrics: &mut MetricMatrix) {
    for i in 0..metrics.len() {
        if metrics.cell(MetricName::FreeCashFlow, i).is_some() {
            continue;
        }
        let cfo = metrics.cell(MetricName::OperatingCashFlow, i);
        let capex = metrics.cell(MetricName::Capex, i);
        if let (Some(cfo), Some(capex)) = (cfo, capex) {
            metrics.set(MetricName::FreeCashFlow, i, Some(cfo + capex));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn series_set(entries: &[(&str, &[(&str, f64)])]) -> SeriesSet {
        entries
            .iter()
            .map(|(id, points)| {
                let points: BTreeMap<String, f64> =
                    points.iter().map(|(d, v)| (d.to_string(), *v)).collect();
                (id.to_string(), points)
            })
            .collect()
    }

    #[test]
    fn test_empty_series() {
        let aligned = align_metrics(&SeriesSet::default());
        assert!(aligned.window.is_empty());
        assert!(aligned.years().is_empty());
        for (_, values) in aligned.metrics.iter() {
            assert!(values.is_empty());
        }
    }

    #[test]
    fn test_operating_margin_derived() {
        let set = series_set(&[
            ("annualTotalRevenue", &[("2023-12-31", 100.0)]),
            ("annualOperatingIncome", &[("2023-12-31", 20.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.years(), vec!["2023"]);
        assert_eq!(aligned.metrics[MetricName::Revenue], [Some(100.0)]);
        assert_eq!(aligned.metrics[MetricName::OperatingMargin], [Some(0.2)]);
        assert_eq!(aligned.metrics[MetricName::NetIncome], [None]);
        assert_eq!(aligned.metrics[MetricName::FreeCashFlow], [None]);
    }

    #[test]
    fn test_zero_revenue_leaves_margin_empty() {
        let set = series_set(&[
            ("annualTotalRevenue", &[("2023-12-31", 0.0)]),
            ("annualOperatingIncome", &[("2023-12-31", 20.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.metrics[MetricName::Revenue], [Some(0.0)]);
        assert_eq!(aligned.metrics[MetricName::OperatingMargin], [None]);
    }

    #[test]
    fn test_direct_margin_takes_precedence() {
        let set = series_set(&[
            ("annualTotalRevenue", &[("2022-12-31", 100.0), ("2023-12-31", 200.0)]),
            ("annualOperatingIncome", &[("2022-12-31", 10.0), ("2023-12-31", 50.0)]),
            ("annualOperatingMargin", &[("2023-12-31", 0.3)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(
            aligned.metrics[MetricName::OperatingMargin],
            [Some(0.1), Some(0.3)]
        );
    }

    #[test]
    fn test_candidate_priority() {
        let set = series_set(&[
            ("annualBasicEPS", &[("2021-12-31", 1.5), ("2022-12-31", 1.6)]),
            ("annualDilutedEPS", &[("2022-12-31", 1.4)]),
            ("annualNetIncomeCommonStockholders", &[("2021-12-31", 7.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.metrics[MetricName::DilutedEps], [Some(1.5), Some(1.4)]);
        assert_eq!(aligned.metrics[MetricName::NetIncome], [Some(7.0), None]);
    }

    #[test]
    fn test_free_cash_flow_derived_without_sign_flip() {
        let set = series_set(&[
            ("annualOperatingCashFlow", &[("2022-12-31", 50.0), ("2023-12-31", 60.0)]),
            ("annualCapitalExpenditure", &[("2022-12-31", -20.0), ("2023-12-31", -25.0)]),
            ("annualFreeCashFlow", &[("2023-12-31", 33.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(
            aligned.metrics[MetricName::FreeCashFlow],
            [Some(30.0), Some(33.0)]
        );
    }

    #[test]
    fn test_free_cash_flow_needs_both_inputs() {
        let set = series_set(&[
            ("annualOperatingCashFlow", &[("2022-12-31", 50.0)]),
            ("annualCapitalExpenditure", &[("2023-12-31", -25.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.metrics[MetricName::FreeCashFlow], [None, None]);
    }

    #[test]
    fn test_window_keeps_latest_ten_dates() {
        let points: Vec<(String, f64)> = (2008..2024)
            .map(|y| (format!("{y}-12-31"), y as f64))
            .collect();
        let set: SeriesSet = [(
            "annualTotalRevenue".to_string(),
            points.into_iter().collect::<BTreeMap<_, _>>(),
        )]
        .into_iter()
        .collect();

        let aligned = align_metrics(&set);
        assert_eq!(aligned.window.len(), WINDOW_SIZE);
        assert_eq!(aligned.window.first().map(String::as_str), Some("2014-12-31"));
        assert_eq!(aligned.window.last().map(String::as_str), Some("2023-12-31"));
        assert!(aligned.window.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(aligned.metrics[MetricName::Revenue][0], Some(2014.0));
    }

    #[test]
    fn test_window_is_union_of_dates() {
        let set = series_set(&[
            ("annualTotalRevenue", &[("2021-09-30", 1.0), ("2022-09-30", 2.0)]),
            ("annualStockBasedCompensation", &[("2022-09-30", 3.0), ("2023-09-30", 4.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.window, vec!["2021-09-30", "2022-09-30", "2023-09-30"]);
        assert_eq!(aligned.years(), vec!["2021", "2022", "2023"]);
        assert_eq!(
            aligned.metrics[MetricName::Revenue],
            [Some(1.0), Some(2.0), None]
        );
        assert_eq!(
            aligned.metrics[MetricName::StockBasedCompensation],
            [None, Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_every_metric_matches_window_length() {
        let set = series_set(&[
            ("annualNetIncome", &[("2019-12-31", 1.0), ("2020-12-31", 2.0)]),
            ("unrelatedSeries", &[("2018-12-31", 9.0)]),
        ]);
        let aligned = align_metrics(&set);
        assert_eq!(aligned.window.len(), 3);
        for (metric, values) in aligned.metrics.iter() {
            assert_eq!(values.len(), aligned.window.len(), "{metric}");
        }
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let set = series_set(&[("annualTotalRevenue", &[("2023-12-31", 100.0)])]);
        let aligned = align_metrics(&set);
        let json = serde_json::to_string(&aligned.metrics).unwrap();
        assert!(json.starts_with(r#"{"Revenue":[100.0],"Operating Income":[null]"#));
        assert!(json.ends_with(r#""Free Cash Flow":[null]}"#));
    }
}
