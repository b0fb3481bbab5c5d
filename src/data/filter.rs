use std::collections::BTreeSet;

use super::model::TelemetryDataset;

// ---------------------------------------------------------------------------
// Session visibility
// ---------------------------------------------------------------------------

/// Labels of the sessions currently shown.
pub type SourceSelection = BTreeSet<String>;

/// Initialise a [`SourceSelection`] with every session visible.
pub fn init_selection(dataset: &TelemetryDataset) -> SourceSelection {
    dataset.sources.iter().cloned().collect()
}

/// Return indices of samples whose session is selected, in dataset order.
pub fn filtered_indices(dataset: &TelemetryDataset, selection: &SourceSelection) -> Vec<usize> {
    dataset
        .samples
        .iter()
        .enumerate()
        .filter(|(_, s)| selection.contains(&s.source))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawSession;
    use crate::data::normalizer::normalize;
    use crate::data::schema::Schema;

    fn dataset() -> TelemetryDataset {
        let headers = [
            "Date",
            "Time",
            "CPU (Tctl/Tdie) [°C]",
            "CPU Package Power [W]",
            "Core VIDs (avg) [V]",
            "CPU1 [RPM]",
            "SoC Voltage (SVI2 TFN) [V]",
        ];
        let row: &[&str] = &["2025-11-01", "10:00:00", "50", "10", "1.0", "1000", "0.9"];
        let schema = Schema::hwinfo();
        let a = normalize(&RawSession::from_rows(&headers, &[row, row]), "a", &schema).unwrap();
        let b = normalize(&RawSession::from_rows(&headers, &[row]), "b", &schema).unwrap();
        TelemetryDataset::merge([a, b])
    }

    #[test]
    fn everything_visible_initially() {
        let ds = dataset();
        assert_eq!(filtered_indices(&ds, &init_selection(&ds)), vec![0, 1, 2]);
    }

    #[test]
    fn deselected_session_is_hidden() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        sel.remove("a");
        assert_eq!(filtered_indices(&ds, &sel), vec![2]);
        assert!(filtered_indices(&ds, &SourceSelection::new()).is_empty());
    }
}
