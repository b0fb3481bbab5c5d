use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::loader::SessionSource;
use crate::data::stats::DEFAULT_SUMMARY_COLUMNS;
use crate::error::ConfigError;

/// On-disk session manifest.
///
/// ```toml
/// summary_columns = ["CPU (Tctl/Tdie) [°C]", "CPU Package Power [W]"]
///
/// [[session]]
/// label = "7_11_2025_eco"
/// path = "7_11_2025_eco.CSV"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "session")]
    pub sessions: Vec<SessionEntry>,
    pub summary_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionEntry {
    pub path: PathBuf,
    pub label: Option<String>,
}

impl Manifest {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sessions with relative paths resolved against `base_dir`.
    pub fn session_sources(&self, base_dir: &Path) -> Vec<SessionSource> {
        self.sessions
            .iter()
            .map(|entry| {
                let path = if entry.path.is_relative() {
                    base_dir.join(&entry.path)
                } else {
                    entry.path.clone()
                };
                match &entry.label {
                    Some(label) => SessionSource::new(path, label.clone()),
                    None => SessionSource::from_path(path),
                }
            })
            .collect()
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = Manifest::from_toml(&text, path)?;
    log::debug!(
        "Loaded manifest {} with {} session(s)",
        path.display(),
        manifest.sessions.len()
    );
    Ok(manifest)
}

/// Parse a command-line session: `PATH` or `LABEL=PATH`.
pub fn parse_session_arg(arg: &str) -> Result<SessionSource, ConfigError> {
    match arg.split_once('=') {
        Some((label, path)) if !label.is_empty() && !path.is_empty() => {
            Ok(SessionSource::new(path, label))
        }
        Some(_) => Err(ConfigError::InvalidSession(arg.to_string())),
        None if arg.is_empty() => Err(ConfigError::InvalidSession(arg.to_string())),
        None => Ok(SessionSource::from_path(arg)),
    }
}

/// Everything the dashboard needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sessions: Vec<SessionSource>,
    pub summary_columns: Vec<String>,
}

impl Settings {
    /// Manifest sessions first, then command-line ones, order preserved.
    pub fn build(manifest: Option<(&Manifest, &Path)>, cli_sessions: &[String]) -> Result<Self, ConfigError> {
        let mut sessions = Vec::new();
        let mut summary_columns = None;

        if let Some((manifest, manifest_path)) = manifest {
            let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
            sessions.extend(manifest.session_sources(base));
            summary_columns = manifest.summary_columns.clone();
        }
        for arg in cli_sessions {
            sessions.push(parse_session_arg(arg)?);
        }

        Ok(Self {
            sessions,
            summary_columns: summary_columns
                .unwrap_or_else(|| DEFAULT_SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
summary_columns = ["CPU1 [RPM]"]

[[session]]
label = "7_11_2025_eco"
path = "7_11_2025_eco.CSV"

[[session]]
path = "/var/log/hw/01_11_2025.csv"
"#;

    #[test]
    fn manifest_sessions_resolve_relative_paths() {
        let manifest = Manifest::from_toml(MANIFEST, Path::new("m.toml")).unwrap();
        let sources = manifest.session_sources(Path::new("/data"));
        assert_eq!(
            sources,
            vec![
                SessionSource::new("/data/7_11_2025_eco.CSV", "7_11_2025_eco"),
                SessionSource::new("/var/log/hw/01_11_2025.csv", "01_11_2025"),
            ]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Manifest::from_toml("colour = \"red\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn session_args() {
        assert_eq!(
            parse_session_arg("eco=logs/eco.csv").unwrap(),
            SessionSource::new("logs/eco.csv", "eco")
        );
        assert_eq!(
            parse_session_arg("logs/02_11_2025.csv").unwrap(),
            SessionSource::new("logs/02_11_2025.csv", "02_11_2025")
        );
        assert!(parse_session_arg("=logs/eco.csv").is_err());
        assert!(parse_session_arg("eco=").is_err());
    }

    #[test]
    fn settings_put_manifest_sessions_first() {
        let manifest = Manifest::from_toml(MANIFEST, Path::new("m.toml")).unwrap();
        let settings = Settings::build(
            Some((&manifest, Path::new("/data/m.toml"))),
            &["extra=/tmp/x.csv".to_string()],
        )
        .unwrap();
        let labels: Vec<&str> = settings.sessions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["7_11_2025_eco", "01_11_2025", "extra"]);
        assert_eq!(settings.summary_columns, vec!["CPU1 [RPM]".to_string()]);
    }

    #[test]
    fn default_summary_columns_without_manifest() {
        let settings = Settings::build(None, &[]).unwrap();
        assert!(settings.sessions.is_empty());
        assert_eq!(settings.summary_columns.len(), DEFAULT_SUMMARY_COLUMNS.len());
    }
}
