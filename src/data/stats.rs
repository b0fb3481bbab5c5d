use super::model::TelemetryDataset;
use super::schema::{
    CORE_VID_AVG, DIE_TEMPERATURE, FAN_RPM, GPU_TEMPERATURE, PACKAGE_POWER, SOC_VOLTAGE,
};

/// Columns summarised when the user does not pick their own.
pub const DEFAULT_SUMMARY_COLUMNS: [&str; 6] = [
    DIE_TEMPERATURE,
    PACKAGE_POWER,
    CORE_VID_AVG,
    FAN_RPM,
    GPU_TEMPERATURE,
    SOC_VOLTAGE,
];

/// Count, mean, spread and quartiles of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `NaN` with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Row of the statistics table, rounded to two decimals.
    pub fn cells(&self) -> [String; 8] {
        let r = |v: f64| {
            if v.is_nan() {
                "NaN".to_string()
            } else {
                format!("{:.2}", v)
            }
        };
        [
            self.count.to_string(),
            r(self.mean),
            r(self.std),
            r(self.min),
            r(self.q1),
            r(self.median),
            r(self.q3),
            r(self.max),
        ]
    }
}

/// Summarise a set of values. `None` when there are none.
pub fn describe(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(Summary {
        count: n,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear-interpolated quantile of already sorted, non-empty values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// One summary per requested column present in the dataset.
pub fn summary_table(
    dataset: &TelemetryDataset,
    columns: &[String],
    source: Option<&str>,
) -> Vec<(String, Summary)> {
    columns
        .iter()
        .filter_map(|col| {
            let summary = describe(&dataset.values(col, source))?;
            Some((col.clone(), summary))
        })
        .collect()
}

/// Mean of each component per session, `None` where a session lacks it.
pub fn mean_by_source(dataset: &TelemetryDataset, components: &[&str]) -> Vec<(String, Vec<Option<f64>>)> {
    dataset
        .sources
        .iter()
        .map(|src| {
            let means = components
                .iter()
                .map(|c| describe(&dataset.values(c, Some(src.as_str()))).map(|s| s.mean))
                .collect();
            (src.clone(), means)
        })
        .collect()
}
