use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::TelemetryDataset;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Write the merged dataset to a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – `Timestamp`, `Source`, then every numeric column; missing cells empty
/// * `.json` – `[{ "timestamp": ..., "source": ..., "values": { ... } }, ...]`
pub fn export_file(dataset: &TelemetryDataset, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let write: fn(&TelemetryDataset, std::io::BufWriter<std::fs::File>) -> Result<()> =
        match ext.as_str() {
            "csv" => write_csv,
            "json" => write_json,
            other => bail!("Unsupported export extension: .{other}"),
        };

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write(dataset, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}

pub fn write_csv<W: Write>(dataset: &TelemetryDataset, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["Timestamp", "Source"];
    header.extend(dataset.column_names.iter().map(String::as_str));
    out.write_record(&header).context("writing CSV header")?;

    for sample in &dataset.samples {
        let mut record = vec![
            sample.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            sample.source.clone(),
        ];
        record.extend(
            dataset
                .column_names
                .iter()
                .map(|c| sample.get(c).map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record).context("writing CSV row")?;
    }

    out.flush().context("flushing CSV")?;
    Ok(())
}

pub fn write_json<W: Write>(dataset: &TelemetryDataset, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &dataset.samples).context("writing JSON")
}
