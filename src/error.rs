use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a single session from being normalized.
///
/// Other sessions keep loading when one of these is returned; see
/// [`crate::data::loader::load_sessions`].
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The export could not be read from disk.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited text could not be parsed at all.
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// No header row.
    #[error("Export is empty")]
    EmptyExport,

    /// `Date` and/or `Time` are absent, so no row can get a timestamp.
    #[error("Session '{session}' has no {} column(s)", .missing.join("/"))]
    MissingTimestampColumns {
        session: String,
        missing: Vec<String>,
    },
}

/// A `Date` + `Time` pair that none of the known layouts accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised timestamp '{0}'")]
pub struct TimestampError(pub String);

/// Session manifest problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid session argument '{0}': expected PATH or LABEL=PATH")]
    InvalidSession(String),
}
