use crate::color::ColorMap;
use crate::data::filter::{SourceSelection, filtered_indices, init_selection};
use crate::data::loader::{LoadReport, SessionSource, append_session};
use crate::data::model::TelemetryDataset;
use crate::data::schema::{DIE_TEMPERATURE, Schema};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Central panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    TimeSeries,
    Distribution,
    PowerBreakdown,
    Statistics,
    RawData,
}

impl View {
    pub const ALL: [View; 5] = [
        View::TimeSeries,
        View::Distribution,
        View::PowerBreakdown,
        View::Statistics,
        View::RawData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::TimeSeries => "Time series",
            View::Distribution => "Distribution",
            View::PowerBreakdown => "Power breakdown",
            View::Statistics => "Statistics",
            View::RawData => "Raw data",
        }
    }
}

/// What the x axis of the time series shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAxis {
    /// Wall-clock time of each sample.
    Clock,
    /// Seconds since the first sample of the same session.
    Elapsed,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Merged sessions (None until something loads).
    pub dataset: Option<TelemetryDataset>,

    pub schema: Schema,

    /// Sessions currently shown.
    pub selection: SourceSelection,

    /// Indices of samples passing the selection (cached).
    pub visible_indices: Vec<usize>,

    /// Column plotted in the time series and distribution views.
    pub metric: Option<String>,

    pub color_map: ColorMap,

    pub view: View,

    pub time_axis: TimeAxis,

    /// Session summarised in the statistics view; `None` means combined.
    pub stats_scope: Option<String>,

    pub summary_columns: Vec<String>,

    /// Warnings and per-session errors from the last load.
    pub messages: Vec<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Schema::default(), Vec::new())
    }
}

impl AppState {
    pub fn new(schema: Schema, summary_columns: Vec<String>) -> Self {
        Self {
            dataset: None,
            schema,
            selection: SourceSelection::default(),
            visible_indices: Vec::new(),
            metric: None,
            color_map: ColorMap::default(),
            view: View::TimeSeries,
            time_axis: TimeAxis::Clock,
            stats_scope: None,
            summary_columns,
            messages: Vec::new(),
            status_message: None,
        }
    }

    /// Ingest a merged dataset and pick a metric.
    ///
    /// Sessions already on screen keep their visibility; sessions new to
    /// this dataset start visible.
    pub fn set_dataset(&mut self, dataset: TelemetryDataset) {
        let known = self
            .dataset
            .as_ref()
            .map(|ds| ds.sources.clone())
            .unwrap_or_default();
        self.install(dataset, &known);
    }

    fn install(&mut self, dataset: TelemetryDataset, known: &[String]) {
        let mut selection = init_selection(&dataset);
        selection.retain(|s| !known.contains(s) || self.selection.contains(s));
        self.selection = selection;
        self.visible_indices = filtered_indices(&dataset, &self.selection);
        self.color_map = ColorMap::new(&dataset.sources);

        let keep_metric = self
            .metric
            .as_ref()
            .is_some_and(|m| dataset.has_column(m));
        if !keep_metric {
            self.metric = if dataset.has_column(DIE_TEMPERATURE) {
                Some(DIE_TEMPERATURE.to_string())
            } else {
                dataset.column_names.first().cloned()
            };
        }
        if let Some(scope) = &self.stats_scope {
            if !dataset.sources.contains(scope) {
                self.stats_scope = None;
            }
        }

        self.dataset = Some(dataset);
    }

    /// Take over the result of a startup load.
    pub fn apply_report(&mut self, report: LoadReport) {
        self.messages = report.messages();
        self.status_message = (!report.failures.is_empty())
            .then(|| format!("{} session(s) failed to load", report.failures.len()));
        self.set_dataset(report.dataset);
    }

    /// Append one more session chosen from the file dialog.
    pub fn add_session(&mut self, source: SessionSource) {
        let mut dataset = self.dataset.take().unwrap_or_default();
        let known = dataset.sources.clone();
        match append_session(&mut dataset, &source, &self.schema) {
            Ok(appended) => {
                log::info!("Added session '{}' ({} rows total)", appended.label, dataset.len());
                if appended.label != source.label {
                    self.messages.push(format!(
                        "Warning: label '{}' already used, {} loaded as '{}'",
                        source.label,
                        source.path.display(),
                        appended.label
                    ));
                }
                self.messages
                    .extend(appended.warnings.iter().map(|w| format!("Warning: {w}")));
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to add session: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
        self.install(dataset, &known);
    }

    /// Drop all sessions.
    pub fn clear(&mut self) {
        self.dataset = None;
        self.selection.clear();
        self.visible_indices.clear();
        self.messages.clear();
        self.status_message = None;
        self.stats_scope = None;
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.selection);
        }
    }

    pub fn is_visible(&self, source: &str) -> bool {
        self.selection.contains(source)
    }

    /// Show or hide one session.
    pub fn toggle_source(&mut self, source: &str) {
        if !self.selection.remove(source) {
            self.selection.insert(source.to_string());
        }
        self.refilter();
    }

    /// Show every session.
    pub fn select_all(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = init_selection(ds);
            self.refilter();
        }
    }

    /// Hide every session.
    pub fn select_none(&mut self) {
        self.selection.clear();
        self.refilter();
    }

    /// Visible session labels, in merge order.
    pub fn visible_sources(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|ds| {
                ds.sources
                    .iter()
                    .filter(|s| self.selection.contains(*s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
