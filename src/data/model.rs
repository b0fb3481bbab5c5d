use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::schema::SchemaWarning;

// ---------------------------------------------------------------------------
// RawSession – one export as read from disk
// ---------------------------------------------------------------------------

/// Header row plus every data row of one export, all as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSession {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSession {
    #[cfg(test)]
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizedSample – one row of the merged dataset
// ---------------------------------------------------------------------------

/// A point-in-time reading with a parsed timestamp and numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSample {
    pub timestamp: NaiveDateTime,
    /// Label of the session the row came from.
    pub source: String,
    /// Column name → value. Columns whose cell failed coercion are absent.
    pub values: BTreeMap<String, f64>,
}

impl NormalizedSample {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

// ---------------------------------------------------------------------------
// SessionFragment – normalizer output for one session
// ---------------------------------------------------------------------------

/// Row accounting for one normalized session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_read: usize,
    pub bad_timestamp: usize,
    pub missing_required: usize,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct SessionFragment {
    pub label: String,
    /// Numeric columns in export order, after renames and drops.
    pub columns: Vec<String>,
    /// Rows in export order.
    pub samples: Vec<NormalizedSample>,
    pub warnings: Vec<SchemaWarning>,
    pub stats: NormalizeStats,
}

// ---------------------------------------------------------------------------
// TelemetryDataset – all sessions merged
// ---------------------------------------------------------------------------

/// Fragments concatenated in session order.
///
/// Each session keeps its own time axis: rows are not re-sorted or
/// de-duplicated across sessions, so consumers group by `source`.
#[derive(Debug, Clone, Default)]
pub struct TelemetryDataset {
    pub samples: Vec<NormalizedSample>,
    /// Union of numeric columns, first-seen order.
    pub column_names: Vec<String>,
    /// Session labels in merge order.
    pub sources: Vec<String>,
}

impl TelemetryDataset {
    pub fn merge(fragments: impl IntoIterator<Item = SessionFragment>) -> Self {
        let mut dataset = Self::default();
        for fragment in fragments {
            dataset.append(fragment);
        }
        dataset
    }

    /// Add one more session after the existing ones.
    pub fn append(&mut self, fragment: SessionFragment) {
        for col in fragment.columns {
            if !self.column_names.contains(&col) {
                self.column_names.push(col);
            }
        }
        if !self.sources.contains(&fragment.label) {
            self.sources.push(fragment.label);
        }
        self.samples.extend(fragment.samples);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Samples belonging to one session, in order.
    pub fn for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a NormalizedSample> {
        self.samples.iter().filter(move |s| s.source == source)
    }

    /// Non-missing values of `column`, optionally restricted to one session.
    pub fn values(&self, column: &str, source: Option<&str>) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|s| source.map_or(true, |src| s.source == src))
            .filter_map(|s| s.get(column))
            .collect()
    }

    /// First timestamp of a session, used to compute elapsed time.
    pub fn session_start(&self, source: &str) -> Option<NaiveDateTime> {
        self.for_source(source).map(|s| s.timestamp).min()
    }

    /// Row count per session, in merge order.
    pub fn counts_by_source(&self) -> Vec<(String, usize)> {
        self.sources
            .iter()
            .map(|src| (src.clone(), self.for_source(src).count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample(source: &str, sec: u32, temp: f64) -> NormalizedSample {
        NormalizedSample {
            timestamp: NaiveDate::from_ymd_opt(2025, 11, 1)
                .unwrap()
                .and_hms_opt(12, 0, sec)
                .unwrap(),
            source: source.to_string(),
            values: BTreeMap::from([("temp".to_string(), temp)]),
        }
    }

    fn fragment(label: &str, columns: &[&str], samples: Vec<NormalizedSample>) -> SessionFragment {
        SessionFragment {
            label: label.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            stats: NormalizeStats {
                kept: samples.len(),
                rows_read: samples.len(),
                ..Default::default()
            },
            samples,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn merge_keeps_session_order_without_sorting() {
        let a = fragment("A", &["temp"], vec![sample("A", 30, 50.0), sample("A", 31, 51.0)]);
        let b = fragment("B", &["temp", "fan"], vec![sample("B", 0, 40.0)]);
        let ds = TelemetryDataset::merge([a, b]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.sources, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(ds.column_names, vec!["temp".to_string(), "fan".to_string()]);
        let order: Vec<&str> = ds.samples.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(order, vec!["A", "A", "B"]);
    }

    #[test]
    fn identical_timestamps_across_sessions_are_kept() {
        let a = fragment("A", &["temp"], vec![sample("A", 5, 50.0)]);
        let b = fragment("B", &["temp"], vec![sample("B", 5, 60.0)]);
        let ds = TelemetryDataset::merge([a, b]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.samples[0].timestamp, ds.samples[1].timestamp);
    }

    #[test]
    fn values_and_counts_by_source() {
        let a = fragment("A", &["temp"], vec![sample("A", 1, 50.0), sample("A", 2, 52.0)]);
        let b = fragment("B", &["temp"], vec![sample("B", 9, 40.0)]);
        let ds = TelemetryDataset::merge([a, b]);

        assert_eq!(ds.values("temp", None), vec![50.0, 52.0, 40.0]);
        assert_eq!(ds.values("temp", Some("B")), vec![40.0]);
        assert!(ds.values("fan", None).is_empty());
        assert_eq!(
            ds.counts_by_source(),
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
        assert_eq!(ds.session_start("B"), Some(ds.samples[2].timestamp));
    }
}
