// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("schema mismatch in {}: expected columns {expected:?}, found {found:?}", path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid UTC timestamp {input:?}: {source}")]
    TimestampParse {
        input: String,
        source: chrono::ParseError,
    },

    #[error("no input files discovered for {kind}")]
    EmptyInput { kind: &'static str },

    #[error("required column {column:?} not present in {context}")]
    MissingColumn {
        column: &'static str,
        context: String,
    },

    #[error("invalid counter value {value:?} in {}", path.display())]
    ValueParse { value: String, path: PathBuf },

    #[error("CSV error in {}: {source}", path.display())]
    Csv { source: csv::Error, path: PathBuf },

    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Generic error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

// Allow `?` on std::io::Error by converting to StatsError::Io with unknown path.
impl From<std::io::Error> for StatsError {
    fn from(source: std::io::Error) -> Self {
        StatsError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for StatsError {
    fn from(e: walkdir::Error) -> Self {
        StatsError::Other(e.to_string())
    }
}
