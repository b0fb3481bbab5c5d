use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints,
};

use crate::color::component_palette;
use crate::data::schema::POWER_COMPONENTS;
use crate::data::stats::{describe, mean_by_source};
use crate::state::{AppState, TimeAxis};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}

// ---------------------------------------------------------------------------
// Time series (one line per session)
// ---------------------------------------------------------------------------

/// Seconds on the x axis for a sample.
fn x_seconds(ts: NaiveDateTime, start: Option<NaiveDateTime>, axis: TimeAxis) -> f64 {
    match (axis, start) {
        (TimeAxis::Elapsed, Some(start)) => (ts - start).num_milliseconds() as f64 / 1000.0,
        _ => ts.and_utc().timestamp_millis() as f64 / 1000.0,
    }
}

fn format_clock(mark: GridMark, range: &RangeInclusive<f64>) -> String {
    let secs = mark.value.floor() as i64;
    let Some(dt) = DateTime::from_timestamp(secs, 0) else {
        return String::new();
    };
    if range.end() - range.start() > SECONDS_PER_DAY {
        dt.format("%d.%m %H:%M").to_string()
    } else {
        dt.format("%H:%M").to_string()
    }
}

fn format_elapsed(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let total = mark.value.round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!("{sign}{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Render the selected metric over time for every visible session.
pub fn time_series(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(metric)) = (&state.dataset, &state.metric) else {
        placeholder(ui, "Open a sensor log to compare sessions  (File → Add session…)");
        return;
    };

    let axis = state.time_axis;
    let plot = Plot::new("time_series")
        .legend(Legend::default())
        .x_axis_label(match axis {
            TimeAxis::Clock => "Time",
            TimeAxis::Elapsed => "Elapsed (h:mm:ss)",
        })
        .y_axis_label(metric.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    let plot = match axis {
        TimeAxis::Clock => plot.x_axis_formatter(format_clock),
        TimeAxis::Elapsed => plot.x_axis_formatter(format_elapsed),
    };

    plot.show(ui, |plot_ui| {
        for source in state.visible_sources() {
            let start = dataset.session_start(&source);
            let points: PlotPoints = dataset
                .for_source(&source)
                .filter_map(|s| Some([x_seconds(s.timestamp, start, axis), s.get(metric)?]))
                .collect();

            let line = Line::new(points)
                .name(&source)
                .color(state.color_map.color_for(&source))
                .width(1.5);

            plot_ui.line(line);
        }
    });
}

// ---------------------------------------------------------------------------
// Distribution (box per session)
// ---------------------------------------------------------------------------

/// Render the spread of the selected metric per session.
pub fn distribution(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(metric)) = (&state.dataset, &state.metric) else {
        placeholder(ui, "Nothing loaded");
        return;
    };

    let sources = state.visible_sources();
    let labels = sources.clone();

    Plot::new("distribution")
        .legend(Legend::default())
        .y_axis_label(metric.as_str())
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for (i, source) in sources.iter().enumerate() {
                let Some(summary) = describe(&dataset.values(metric, Some(source.as_str()))) else {
                    continue;
                };
                let color = state.color_map.color_for(source);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.min,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.max,
                    ),
                )
                .name(source)
                .box_width(0.5)
                .whisker_width(0.3)
                .stroke(Stroke::new(1.5, color))
                .fill(color.gamma_multiply(0.3));

                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(source).color(color));
            }
        });
}

/// Label for integer x positions that stand for sessions.
fn category_label(labels: &[String], x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 || x < 0.0 {
        return String::new();
    }
    labels.get(x.round() as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Power breakdown (grouped bars)
// ---------------------------------------------------------------------------

/// Mean per-core and SoC power for every visible session.
pub fn power_breakdown(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        placeholder(ui, "Nothing loaded");
        return;
    };

    let means: Vec<(String, Vec<Option<f64>>)> = mean_by_source(dataset, &POWER_COMPONENTS)
        .into_iter()
        .filter(|(src, _)| state.is_visible(src))
        .collect();
    let labels: Vec<String> = means.iter().map(|(src, _)| src.clone()).collect();

    let group_width = 0.8;
    let bar_width = group_width / POWER_COMPONENTS.len() as f64;
    let colors = component_palette(POWER_COMPONENTS.len());

    Plot::new("power_breakdown")
        .legend(Legend::default())
        .y_axis_label("Mean Power [W]")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for (j, component) in POWER_COMPONENTS.iter().enumerate() {
                let offset = -group_width / 2.0 + bar_width * (j as f64 + 0.5);
                let bars: Vec<Bar> = means
                    .iter()
                    .enumerate()
                    .filter_map(|(i, (src, values))| {
                        let mean = values[j]?;
                        Some(
                            Bar::new(i as f64 + offset, mean)
                                .width(bar_width)
                                .name(format!("{src}: {component}")),
                        )
                    })
                    .collect();
                if bars.is_empty() {
                    continue;
                }
                plot_ui.bar_chart(BarChart::new(bars).name(*component).color(colors[j]));
            }
        });
}
