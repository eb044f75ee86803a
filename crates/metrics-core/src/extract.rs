//! Flattens the nested upstream payload into per-series date/value maps.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{MetricsError, MetricsResult, ReportRow, SeriesSet, TimeseriesPayload};

/// Build a [`SeriesSet`] from a raw time series payload.
///
/// Entries without an identifier tag are skipped, as are rows missing a date
/// or a raw value. A raw value that cannot be read as a number fails the whole
/// extraction.
pub fn extract_series(payload: &TimeseriesPayload) -> MetricsResult<SeriesSet> {
    let entries = payload.timeseries.result.as_deref().unwrap_or(&[]);
    let mut series = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(identifier) = entry.identifier() else {
            tracing::debug!("Skipping time series entry without a type tag");
            continue;
        };

        let mut points = BTreeMap::new();
        for row in entry.rows(identifier) {
            if let Some((date, value)) = parse_row(identifier, row)? {
                points.insert(date, value);
            }
        }
        series.push((identifier.to_string(), points));
    }

    Ok(series.into_iter().collect())
}

fn parse_row(identifier: &str, row: &Value) -> MetricsResult<Option<(String, f64)>> {
    if row.is_null() {
        return Ok(None);
    }

    let row: ReportRow =
        serde_json::from_value(row.clone()).map_err(|e| MetricsError::MalformedRow {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;

    let date = match row.as_of_date {
        Some(d) if !d.is_empty() => d,
        _ => return Ok(None),
    };
    let raw = match row.reported_value.and_then(|v| v.raw) {
        Some(raw) if !raw.is_null() => raw,
        _ => return Ok(None),
    };

    let value = coerce_f64(&raw).ok_or_else(|| MetricsError::InvalidValue {
        identifier: identifier.to_string(),
        date: date.clone(),
        raw: raw.to_string(),
    })?;

    Ok(Some((date, value)))
}

fn coerce_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
