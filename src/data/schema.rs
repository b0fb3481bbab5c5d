use std::collections::BTreeMap;
use std::fmt;

use crate::error::NormalizeError;

// ---------------------------------------------------------------------------
// Column descriptors
// ---------------------------------------------------------------------------

pub const DIE_TEMPERATURE: &str = "CPU (Tctl/Tdie) [°C]";
pub const PACKAGE_POWER: &str = "CPU Package Power [W]";
pub const CORE_VID_AVG: &str = "Core VIDs (avg) [V]";
pub const FAN_RPM: &str = "CPU1 [RPM]";
pub const SOC_VOLTAGE: &str = "SoC Voltage (SVI2 TFN) [V]";
pub const GPU_TEMPERATURE: &str = "GPU Temperature [°C]";
pub const SOC_POWER: &str = "CPU SoC Power (SVI2 TFN) [W]";

/// Per-core power columns followed by the SoC power, in chart order.
pub const POWER_COMPONENTS: [&str; 5] = [
    "Core 0 Power [W]",
    "Core 1 Power [W]",
    "Core 2 Power [W]",
    "Core 3 Power [W]",
    SOC_POWER,
];

/// A sensor column the dashboard knows by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub canonical: String,
    /// Other spellings seen in exports, mostly mis-decoded `°`.
    pub aliases: Vec<String>,
    /// Rows without a value here are discarded.
    pub required: bool,
}

impl ColumnSpec {
    pub fn required(canonical: &str) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: Vec::new(),
            required: true,
        }
    }

    pub fn optional(canonical: &str) -> Self {
        Self {
            required: false,
            ..Self::required(canonical)
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }
}

/// Explicit description of what a telemetry export is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub date_column: String,
    pub time_column: String,
    pub columns: Vec<ColumnSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::hwinfo()
    }
}

impl Schema {
    /// Layout of the HWiNFO sensor logs the dashboard was built around.
    pub fn hwinfo() -> Self {
        let mut columns = vec![
            ColumnSpec::required(DIE_TEMPERATURE).alias("CPU (Tctl/Tdie) [Â°C]"),
            ColumnSpec::required(PACKAGE_POWER),
            ColumnSpec::required(CORE_VID_AVG),
            ColumnSpec::required(FAN_RPM),
            ColumnSpec::required(SOC_VOLTAGE),
            ColumnSpec::optional(GPU_TEMPERATURE).alias("GPU Temperature [Â°C]"),
        ];
        columns.extend(POWER_COMPONENTS.iter().map(|c| ColumnSpec::optional(c)));

        Self {
            date_column: "Date".to_string(),
            time_column: "Time".to_string(),
            columns,
        }
    }

    /// Validate one session's header row against the schema.
    pub fn resolve(&self, headers: &[String], session: &str) -> Result<Resolution, NormalizeError> {
        let headers = dedupe_headers(headers);

        let mut missing = Vec::new();
        let date_idx = headers.iter().position(|h| *h == self.date_column);
        let time_idx = headers.iter().position(|h| *h == self.time_column);
        if date_idx.is_none() {
            missing.push(self.date_column.clone());
        }
        if time_idx.is_none() {
            missing.push(self.time_column.clone());
        }
        let (Some(date_idx), Some(time_idx)) = (date_idx, time_idx) else {
            return Err(NormalizeError::MissingTimestampColumns {
                session: session.to_string(),
                missing,
            });
        };

        let mut names: Vec<Option<String>> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                if idx == date_idx || idx == time_idx || is_placeholder(h) {
                    None
                } else {
                    Some(h.clone())
                }
            })
            .collect();

        let mut renames = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut required = Vec::new();

        for expected in &self.columns {
            let present = names
                .iter()
                .any(|n| n.as_deref() == Some(expected.canonical.as_str()));
            let alias_idx = if present {
                None
            } else {
                names
                    .iter()
                    .position(|n| n.as_ref().is_some_and(|n| expected.aliases.contains(n)))
            };

            let found = match alias_idx {
                _ if present => true,
                Some(idx) => {
                    if let Some(old) = names[idx].replace(expected.canonical.clone()) {
                        renames.insert(old, expected.canonical.clone());
                    }
                    true
                }
                None => {
                    warnings.push(SchemaWarning {
                        session: session.to_string(),
                        column: expected.canonical.clone(),
                        available: names.iter().flatten().cloned().collect(),
                    });
                    false
                }
            };

            if found && expected.required {
                required.push(expected.canonical.clone());
            }
        }

        Ok(Resolution {
            date_idx,
            time_idx,
            names,
            renames,
            required,
            warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolution – the schema applied to one header row
// ---------------------------------------------------------------------------

/// Outcome of [`Schema::resolve`] for a single session.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub date_idx: usize,
    pub time_idx: usize,
    /// Output name per raw column index; `None` for dropped columns
    /// (date, time and placeholders).
    pub names: Vec<Option<String>>,
    /// Alias → canonical renames that were applied.
    pub renames: BTreeMap<String, String>,
    /// Required columns present in this session.
    pub required: Vec<String>,
    pub warnings: Vec<SchemaWarning>,
}

impl Resolution {
    /// Output column names in raw order.
    pub fn value_columns(&self) -> Vec<String> {
        self.names.iter().flatten().cloned().collect()
    }
}

/// An expected column that is absent under every known spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    pub session: String,
    pub column: String,
    pub available: Vec<String>,
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' not found in session '{}' ({} other columns available)",
            self.column,
            self.session,
            self.available.len()
        )
    }
}

/// Header cells produced by trailing delimiters: blank, or already labelled
/// `Unnamed: N` by whatever re-saved the file.
pub fn is_placeholder(header: &str) -> bool {
    let header = header.trim();
    header.is_empty()
        || header
            .strip_prefix("Unnamed: ")
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Repeat headers become `name.1`, `name.2`, … in order of appearance.
fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    headers
        .iter()
        .map(|h| {
            let h = h.trim();
            let count = seen.entry(h).or_insert(0);
            let name = if *count == 0 || h.is_empty() {
                h.to_string()
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn full_headers(temp_label: &str) -> Vec<String> {
        headers(&[
            "Date",
            "Time",
            temp_label,
            PACKAGE_POWER,
            CORE_VID_AVG,
            FAN_RPM,
            SOC_VOLTAGE,
            "",
        ])
    }

    #[test]
    fn alias_is_renamed_to_canonical() {
        let res = Schema::hwinfo()
            .resolve(&full_headers("CPU (Tctl/Tdie) [Â°C]"), "alt")
            .unwrap();
        assert_eq!(
            res.renames.get("CPU (Tctl/Tdie) [Â°C]").map(String::as_str),
            Some(DIE_TEMPERATURE)
        );
        assert!(res.value_columns().contains(&DIE_TEMPERATURE.to_string()));
        assert_eq!(res.required.len(), 5);
    }

    #[test]
    fn canonical_and_alias_resolve_to_same_columns() {
        let schema = Schema::hwinfo();
        let a = schema.resolve(&full_headers(DIE_TEMPERATURE), "a").unwrap();
        let b = schema
            .resolve(&full_headers("CPU (Tctl/Tdie) [Â°C]"), "b")
            .unwrap();
        assert_eq!(a.value_columns(), b.value_columns());
    }

    #[test]
    fn date_time_and_placeholder_are_not_value_columns() {
        let res = Schema::hwinfo()
            .resolve(&full_headers(DIE_TEMPERATURE), "s")
            .unwrap();
        assert_eq!(
            res.value_columns(),
            headers(&[
                DIE_TEMPERATURE,
                PACKAGE_POWER,
                CORE_VID_AVG,
                FAN_RPM,
                SOC_VOLTAGE
            ])
        );
        assert_eq!((res.date_idx, res.time_idx), (0, 1));
    }

    #[test]
    fn missing_sensor_column_is_a_warning() {
        let mut h = full_headers(DIE_TEMPERATURE);
        h.retain(|c| c != FAN_RPM);
        let res = Schema::hwinfo().resolve(&h, "s").unwrap();
        let missing: Vec<&str> = res.warnings.iter().map(|w| w.column.as_str()).collect();
        assert!(missing.contains(&FAN_RPM));
        assert!(missing.contains(&GPU_TEMPERATURE));
        assert!(!res.required.contains(&FAN_RPM.to_string()));
    }

    #[test]
    fn missing_time_is_fatal() {
        let err = Schema::hwinfo()
            .resolve(&headers(&["Date", PACKAGE_POWER]), "broken")
            .unwrap_err();
        match err {
            NormalizeError::MissingTimestampColumns { session, missing } => {
                assert_eq!(session, "broken");
                assert_eq!(missing, vec!["Time".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        assert_eq!(
            dedupe_headers(&headers(&["Core Clock", "Core Clock", "x", "Core Clock"])),
            headers(&["Core Clock", "Core Clock.1", "x", "Core Clock.2"])
        );
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("  "));
        assert!(is_placeholder("Unnamed: 55"));
        assert!(!is_placeholder("Unnamed: sensor"));
        assert!(!is_placeholder(FAN_RPM));
    }
}
