use std::collections::BTreeMap;

use super::model::{NormalizeStats, NormalizedSample, RawSession, SessionFragment};
use super::numeric::coerce;
use super::schema::Schema;
use super::timestamp::{detect_format, parse_timestamp};
use crate::error::NormalizeError;

/// Turn one raw export into a type-clean, source-tagged fragment.
///
/// Steps, in order:
/// 1. resolve the header row against `schema` (drop placeholders, rename
///    aliases, warn about absent sensors; missing `Date`/`Time` is fatal)
/// 2. join `Date` + `Time` and parse; rows that fail are dropped
/// 3. coerce every other kept column to `f64`; failures become missing
/// 4. drop rows missing any required column present in this session
/// 5. tag the survivors with `label`, keeping export order
///
/// `raw` is not modified.
pub fn normalize(
    raw: &RawSession,
    label: &str,
    schema: &Schema,
) -> Result<SessionFragment, NormalizeError> {
    let resolution = schema.resolve(&raw.headers, label)?;

    for warning in &resolution.warnings {
        log::warn!("{warning}");
        log::debug!("Columns in '{label}': {:?}", warning.available);
    }
    for (from, to) in &resolution.renames {
        log::debug!("'{label}': renamed column '{from}' -> '{to}'");
    }

    if let Some(first) = raw.rows.first() {
        let cell = |idx: usize| first.get(idx).map(|c| c.trim()).unwrap_or("");
        let joined = format!("{} {}", cell(resolution.date_idx), cell(resolution.time_idx));
        log::debug!("'{label}': first timestamp '{joined}' matches {:?}", detect_format(&joined));
    }

    let mut stats = NormalizeStats {
        rows_read: raw.rows.len(),
        ..Default::default()
    };
    let mut samples = Vec::with_capacity(raw.rows.len());

    for (row_no, row) in raw.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

        let timestamp = match parse_timestamp(cell(resolution.date_idx), cell(resolution.time_idx)) {
            Ok(ts) => ts,
            Err(e) => {
                log::debug!("'{label}' row {row_no}: {e}, dropped");
                stats.bad_timestamp += 1;
                continue;
            }
        };

        let values: BTreeMap<String, f64> = resolution
            .names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let name = name.as_ref()?;
                coerce(cell(idx)).map(|v| (name.clone(), v))
            })
            .collect();

        if let Some(col) = resolution.required.iter().find(|c| !values.contains_key(*c)) {
            log::debug!("'{label}' row {row_no}: no value for '{col}', dropped");
            stats.missing_required += 1;
            continue;
        }

        samples.push(NormalizedSample {
            timestamp,
            source: label.to_string(),
            values,
        });
    }

    stats.kept = samples.len();
    log::info!(
        "'{label}': {} rows read, {} kept ({} bad timestamp, {} missing required values)",
        stats.rows_read,
        stats.kept,
        stats.bad_timestamp,
        stats.missing_required
    );

    Ok(SessionFragment {
        label: label.to_string(),
        columns: resolution.value_columns(),
        samples,
        warnings: resolution.warnings,
        stats,
    })
}
