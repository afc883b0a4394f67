use std::path::PathBuf;
use thiserror::Error;

/// Problems with a single line-definition file. Fatal for the whole batch.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("unable to read line file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {file}: {message}")]
    Json { file: String, message: String },
    #[error("missing required field: {field} ({file})")]
    MissingField { field: &'static str, file: String },
    #[error("invalid HEX color: {value} ({file})")]
    InvalidColor { value: String, file: String },
    #[error("stations must be an array or a pipe-delimited string ({file})")]
    StationsType { file: String },
    #[error("stations must contain at least 2 entries ({file})")]
    TooFewStations { file: String },
    #[error("no .json line files found in {0}")]
    NoLineFiles(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("config option {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("line must have at least 2 stations, got {0}")]
    TooFewStations(usize),
    #[error("cannot resize canvas to height {height}")]
    CanvasResize { height: f32 },
    #[error("cannot create background fill {width}x{height}")]
    Background { width: f32, height: f32 },
}
