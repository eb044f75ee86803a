use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Top-level body returned by the fundamentals time series endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeseriesPayload {
    #[serde(default)]
    pub timeseries: TimeseriesBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeseriesBody {
    #[serde(default)]
    pub result: Option<Vec<TimeseriesEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// One series in the payload. Rows live under a key named after the series
/// identifier, so everything except `meta` is collected into `fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeseriesEntry {
    #[serde(default)]
    pub meta: EntryMeta,
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl TimeseriesEntry {
    /// The series identifier tag, if present and non-empty.
    pub fn identifier(&self) -> Option<&str> {
        self.meta.series_type.as_ref().and_then(SeriesTag::as_str)
    }

    pub fn rows(&self, identifier: &str) -> &[serde_json::Value] {
        self.fields
            .get(identifier)
            .and_then(|v| v.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryMeta {
    #[serde(rename = "type", default)]
    pub series_type: Option<SeriesTag>,
}

/// The upstream sends `meta.type` as a one-element array; a bare string is
/// accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesTag {
    One(String),
    Many(Vec<String>),
}

impl SeriesTag {
    pub fn as_str(&self) -> Option<&str> {
        let tag = match self {
            SeriesTag::One(s) => Some(s.as_str()),
            SeriesTag::Many(v) => v.first().map(String::as_str),
        };
        tag.filter(|s| !s.is_empty())
    }
}

/// A single report row inside a series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "asOfDate", default)]
    pub as_of_date: Option<String>,
    #[serde(rename = "reportedValue", default)]
    pub reported_value: Option<ReportedValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportedValue {
    #[serde(default)]
    pub raw: Option<serde_json::Value>,
}

/// Values per series identifier, keyed by report date.
///
/// Built once per request and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: HashMap<String, BTreeMap<String, f64>>,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.series.contains_key(identifier)
    }

    pub fn series(&self, identifier: &str) -> Option<&BTreeMap<String, f64>> {
        self.series.get(identifier)
    }

    pub fn value(&self, identifier: &str, date: &str) -> Option<f64> {
        self.series.get(identifier)?.get(date).copied()
    }

    /// Distinct report dates across every series, ascending.
    pub fn dates(&self) -> BTreeSet<&str> {
        self.series
            .values()
            .flat_map(|points| points.keys().map(String::as_str))
            .collect()
    }
}

impl FromIterator<(String, BTreeMap<String, f64>)> for SeriesSet {
    fn from_iter<I: IntoIterator<Item = (String, BTreeMap<String, f64>)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}
