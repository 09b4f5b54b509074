use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use thiserror::Error;

/// Why a single sample could not be taken. Never fatal.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("error reading temperature file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error converting temperature {content:?} to int: {source}")]
    Parse {
        content: String,
        #[source]
        source: InvalidContent,
    },
}

/// What made sensor content unparseable.
#[derive(Error, Debug)]
pub enum InvalidContent {
    #[error(transparent)]
    NotInteger(#[from] ParseIntError),

    #[error(transparent)]
    NotUtf8(#[from] Utf8Error),
}

/// Read a millidegree sensor file and return degrees Celsius.
///
/// Exactly one trailing `\n` is stripped; any other whitespace makes the
/// content unparseable.
pub fn read_celsius(path: &Path) -> Result<f64, SampleError> {
    let bytes = std::fs::read(path).map_err(|source| SampleError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = std::str::from_utf8(&bytes).map_err(|source| SampleError::Parse {
        content: String::from_utf8_lossy(&bytes).into_owned(),
        source: source.into(),
    })?;
    parse_millidegrees(raw)
}

/// Convert sensor text such as `45678\n` into `45.678`.
pub fn parse_millidegrees(raw: &str) -> Result<f64, SampleError> {
    let content = raw.strip_suffix('\n').unwrap_or(raw);
    let millis: i64 = content.parse().map_err(|source: ParseIntError| SampleError::Parse {
        content: content.to_string(),
        source: source.into(),
    })?;
    Ok(millis as f64 / 1000.0)
}
