use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::{NormalizeStats, RawSession, SessionFragment, TelemetryDataset};
use super::normalizer::normalize;
use super::schema::{Schema, SchemaWarning};
use crate::error::NormalizeError;

// ---------------------------------------------------------------------------
// Session sources
// ---------------------------------------------------------------------------

/// One export on disk and the label it is shown under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSource {
    pub path: PathBuf,
    pub label: String,
}

impl SessionSource {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }

    /// Label the session after the file stem (`logs/01_11_2025.csv` → `01_11_2025`).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, label }
    }
}

// ---------------------------------------------------------------------------
// Reading one export
// ---------------------------------------------------------------------------

/// Decode export bytes: UTF-8 when valid (BOM stripped), Latin-1 otherwise.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("Export is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Split delimited text into a header row and data rows.
///
/// Rows may be shorter or longer than the header; the normalizer treats
/// absent cells as missing.
pub fn parse_raw(text: &str) -> Result<RawSession, NormalizeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(NormalizeError::EmptyExport);
    }

    let rows = reader
        .records()
        .map(|rec| rec.map(|r| r.iter().map(|c| c.to_string()).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

    Ok(RawSession { headers, rows })
}

/// Read an export from disk. The file handle is closed before parsing.
pub fn read_raw(path: &Path) -> Result<RawSession, NormalizeError> {
    let bytes = std::fs::read(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raw(&decode_text(&bytes))
}

/// Read and normalize a single session.
pub fn load_session(source: &SessionSource, schema: &Schema) -> Result<SessionFragment, NormalizeError> {
    let raw = read_raw(&source.path)?;
    normalize(&raw, &source.label, schema)
}

// ---------------------------------------------------------------------------
// Multi-session factory
// ---------------------------------------------------------------------------

/// A session that could not be normalized at all.
#[derive(Debug)]
pub struct SessionFailure {
    pub source: SessionSource,
    pub error: NormalizeError,
}

/// Everything produced by one [`load_sessions`] call.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub dataset: TelemetryDataset,
    /// Row accounting per loaded session, in load order.
    pub stats: Vec<(String, NormalizeStats)>,
    pub warnings: Vec<SchemaWarning>,
    /// Sessions whose label was already taken: original source and the label used.
    pub renamed: Vec<(SessionSource, String)>,
    pub failures: Vec<SessionFailure>,
}

impl LoadReport {
    /// Human-readable lines for status bars and headless output.
    pub fn messages(&self) -> Vec<String> {
        let mut out: Vec<String> = self.warnings.iter().map(|w| format!("Warning: {w}")).collect();
        out.extend(
            self.renamed
                .iter()
                .map(|(src, label)| rename_message(src, label)),
        );
        out.extend(
            self.failures
                .iter()
                .map(|f| format!("Error: {} ({}): {}", f.source.label, f.source.path.display(), f.error)),
        );
        out
    }
}

fn rename_message(source: &SessionSource, label: &str) -> String {
    format!(
        "Warning: label '{}' already used, {} loaded as '{label}'",
        source.label,
        source.path.display()
    )
}

/// `label` if nobody holds it yet, else `label (2)`, `label (3)`, …
pub fn unique_label(taken: &[String], label: &str) -> String {
    if !taken.iter().any(|t| t == label) {
        return label.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{label} ({n})");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Copy of `source` carrying a label not in `taken`.
fn relabel(taken: &[String], source: &SessionSource) -> SessionSource {
    let label = unique_label(taken, &source.label);
    if label != source.label {
        log::warn!("{}", rename_message(source, &label));
    }
    SessionSource::new(source.path.clone(), label)
}

/// Load every session in order and merge what succeeds.
///
/// A failing session is recorded in [`LoadReport::failures`]; the rest
/// still load. Repeated labels get a numeric suffix so every file stays
/// its own session.
pub fn load_sessions(sources: &[SessionSource], schema: &Schema) -> LoadReport {
    let mut report = LoadReport::default();
    let mut fragments = Vec::with_capacity(sources.len());
    let mut taken: Vec<String> = Vec::with_capacity(sources.len());

    for original in sources {
        let source = relabel(&taken, original);
        taken.push(source.label.clone());
        if source.label != original.label {
            report.renamed.push((original.clone(), source.label.clone()));
        }

        match load_session(&source, schema) {
            Ok(mut fragment) => {
                report.stats.push((fragment.label.clone(), fragment.stats));
                report.warnings.append(&mut fragment.warnings);
                fragments.push(fragment);
            }
            Err(error) => {
                log::error!(
                    "Failed to load session '{}' from {}: {error}",
                    source.label,
                    source.path.display()
                );
                report.failures.push(SessionFailure { source, error });
            }
        }
    }

    report.dataset = TelemetryDataset::merge(fragments);
    log::info!(
        "Loaded {} rows from {} of {} sessions",
        report.dataset.len(),
        report.stats.len(),
        sources.len()
    );
    report
}

/// A session appended through [`append_session`].
#[derive(Debug)]
pub struct Appended {
    /// Label the session ended up with (differs from the request when taken).
    pub label: String,
    pub warnings: Vec<SchemaWarning>,
}

/// Load a single file chosen interactively and append it to `dataset`.
pub fn append_session(dataset: &mut TelemetryDataset, source: &SessionSource, schema: &Schema) -> Result<Appended> {
    let source = relabel(&dataset.sources, source);
    let mut fragment = load_session(&source, schema)
        .with_context(|| format!("loading session '{}'", source.label))?;
    let warnings = std::mem::take(&mut fragment.warnings);
    dataset.append(fragment);
    Ok(Appended {
        label: source.label,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{DIE_TEMPERATURE, FAN_RPM};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const UTF8_EXPORT: &str = "Date,Time,CPU (Tctl/Tdie) [°C],CPU Package Power [W],Core VIDs (avg) [V],CPU1 [RPM],SoC Voltage (SVI2 TFN) [V],\n\
        01.11.2025,14:05:30.250,61.5,12.3,1.05,\"1,234\",0.95,\n\
        01.11.2025,14:05:32.250,62.0,13.0,1.10,\"1,240\",0.95,\n";

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[test]
    fn latin1_degree_sign_decodes_to_canonical_header() {
        let bytes = latin1(UTF8_EXPORT);
        assert!(std::str::from_utf8(&bytes).is_err());
        let raw = parse_raw(&decode_text(&bytes)).unwrap();
        assert_eq!(raw.headers[2], DIE_TEMPERATURE);
        assert_eq!(raw.rows.len(), 2);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(UTF8_EXPORT.as_bytes());
        let raw = parse_raw(&decode_text(&bytes)).unwrap();
        assert_eq!(raw.headers[0], "Date");
    }

    #[test]
    fn quoted_thousands_stay_in_one_cell() {
        let raw = parse_raw(UTF8_EXPORT).unwrap();
        assert_eq!(raw.rows[0][5], "1,234");
        assert_eq!(raw.headers.last().map(String::as_str), Some(""));
    }

    #[test]
    fn empty_export_is_an_error() {
        assert!(matches!(parse_raw(""), Err(NormalizeError::EmptyExport)));
    }

    #[test]
    fn label_defaults_to_file_stem() {
        let src = SessionSource::from_path("logs/7_11_2025_eco.CSV");
        assert_eq!(src.label, "7_11_2025_eco");
    }

    #[test]
    fn failing_session_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.csv", UTF8_EXPORT.as_bytes());
        let no_time = write_file(dir.path(), "no_time.csv", b"Date,CPU1 [RPM]\n01.11.2025,1200\n");
        let sources = vec![
            SessionSource::new(&no_time, "no_time"),
            SessionSource::new(dir.path().join("missing.csv"), "missing"),
            SessionSource::new(&good, "good"),
        ];

        let report = load_sessions(&sources, &Schema::hwinfo());

        assert_eq!(report.dataset.len(), 2);
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].1.kept, 2);
        assert_eq!(report.dataset.sources, vec!["good".to_string()]);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(
            report.failures[0].error,
            NormalizeError::MissingTimestampColumns { .. }
        ));
        assert!(matches!(report.failures[1].error, NormalizeError::Io { .. }));
        assert_eq!(report.messages().iter().filter(|m| m.starts_with("Error")).count(), 2);
    }

    #[test]
    fn factory_can_be_called_repeatedly() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.csv", UTF8_EXPORT.as_bytes());
        let sources = vec![SessionSource::new(&good, "a"), SessionSource::new(&good, "b")];

        let first = load_sessions(&sources, &Schema::hwinfo());
        let second = load_sessions(&sources, &Schema::hwinfo());

        assert_eq!(first.dataset.len(), 4);
        assert_eq!(first.dataset.samples, second.dataset.samples);
        assert_eq!(first.dataset.values(FAN_RPM, Some("b")), vec![1234.0, 1240.0]);
    }

    #[test]
    fn append_session_reports_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.csv", UTF8_EXPORT.as_bytes());
        let mut dataset = TelemetryDataset::default();
        let appended = append_session(&mut dataset, &SessionSource::new(&good, "x"), &Schema::hwinfo()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(appended.label, "x");
        assert!(appended.warnings.iter().any(|w| w.column == "GPU Temperature [°C]"));
    }

    #[test]
    fn same_file_name_in_two_directories_stays_two_sessions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let first = write_file(&dir.path().join("a"), "log.csv", UTF8_EXPORT.as_bytes());
        let second_day = UTF8_EXPORT.replace("01.11.2025", "02.11.2025");
        let second = write_file(&dir.path().join("b"), "log.csv", second_day.as_bytes());

        let report = load_sessions(
            &[SessionSource::from_path(&first), SessionSource::from_path(&second)],
            &Schema::hwinfo(),
        );

        assert!(report.failures.is_empty());
        assert_eq!(report.dataset.sources, vec!["log".to_string(), "log (2)".to_string()]);
        assert_eq!(report.dataset.for_source("log").count(), 2);
        assert_eq!(report.dataset.for_source("log (2)").count(), 2);
        assert_eq!(
            report.dataset.session_start("log (2)").map(|t| t.format("%d.%m").to_string()),
            Some("02.11".to_string())
        );
        assert_eq!(report.renamed.len(), 1);
        assert!(report.messages().iter().any(|m| m.contains("loaded as 'log (2)'")));
    }

    #[test]
    fn append_session_renames_a_taken_label() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "log.csv", UTF8_EXPORT.as_bytes());
        let mut dataset = TelemetryDataset::default();
        append_session(&mut dataset, &SessionSource::from_path(&good), &Schema::hwinfo()).unwrap();
        let again = append_session(&mut dataset, &SessionSource::from_path(&good), &Schema::hwinfo()).unwrap();

        assert_eq!(again.label, "log (2)");
        assert_eq!(dataset.sources, vec!["log".to_string(), "log (2)".to_string()]);
    }

    #[test]
    fn unique_label_skips_every_taken_suffix() {
        let taken = vec!["log".to_string(), "log (2)".to_string()];
        assert_eq!(unique_label(&taken, "eco"), "eco");
        assert_eq!(unique_label(&taken, "log"), "log (3)");
    }

    #[test]
    fn double_encoded_utf8_header_loads_under_canonical_name() {
        let dir = tempfile::tempdir().unwrap();
        let mojibake = UTF8_EXPORT.replace("[°C]", "[Â°C]");
        let path = write_file(dir.path(), "alt.csv", mojibake.as_bytes());

        let raw = read_raw(&path).unwrap();
        assert_eq!(raw.headers[2], "CPU (Tctl/Tdie) [Â°C]");

        let report = load_sessions(&[SessionSource::new(&path, "alt")], &Schema::hwinfo());
        assert!(report.failures.is_empty());
        assert!(report.dataset.has_column(DIE_TEMPERATURE));
        assert!(!report.dataset.has_column("CPU (Tctl/Tdie) [Â°C]"));
        assert_eq!(report.dataset.values(DIE_TEMPERATURE, Some("alt")), vec![61.5, 62.0]);
        assert!(report.warnings.iter().all(|w| w.column != DIE_TEMPERATURE));
    }
}
