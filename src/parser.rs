use crate::error::LineError;
use crate::ir::{Line, Rgb};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// On-disk shape of a line file. Every field is optional here so that missing
/// values surface as `LineError::MissingField` instead of a serde message.
#[derive(Debug, Default, Deserialize)]
struct RawLine {
    #[serde(default)]
    system: Option<Value>,
    #[serde(default)]
    region: Option<Value>,
    #[serde(default)]
    line_name: Option<Value>,
    #[serde(default)]
    years: Option<Value>,
    #[serde(default)]
    color: Option<Value>,
    #[serde(default)]
    stations: Option<Value>,
}

/// Strings are trimmed, numbers are taken verbatim, anything else is empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn required(value: Option<&Value>, field: &'static str, file: &str) -> Result<String, LineError> {
    let text = scalar_text(value);
    if text.is_empty() {
        return Err(LineError::MissingField {
            field,
            file: file.to_string(),
        });
    }
    Ok(text)
}

fn station_list(value: Option<&Value>, file: &str) -> Result<Vec<String>, LineError> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(|item| scalar_text(Some(item))).collect(),
        Some(Value::String(piped)) => piped.split('|').map(|part| part.trim().to_string()).collect(),
        _ => {
            return Err(LineError::StationsType {
                file: file.to_string(),
            });
        }
    };
    let stations: Vec<String> = raw.into_iter().filter(|name| !name.is_empty()).collect();
    if stations.len() < 2 {
        return Err(LineError::TooFewStations {
            file: file.to_string(),
        });
    }
    Ok(stations)
}

/// Parses one line definition. `file_name` is only used in error messages.
pub fn parse_line_json(text: &str, file_name: &str) -> Result<Line, LineError> {
    let text = text.trim().trim_start_matches('\u{feff}');
    let raw: RawLine = serde_json::from_str(text).map_err(|err| LineError::Json {
        file: file_name.to_string(),
        message: err.to_string(),
    })?;

    let system = required(raw.system.as_ref(), "system", file_name)?;
    let id = required(raw.region.as_ref(), "region", file_name)?;
    let name = required(raw.line_name.as_ref(), "line_name", file_name)?;
    let color_text = required(raw.color.as_ref(), "color", file_name)?;
    let color = Rgb::from_hex(&color_text).ok_or_else(|| LineError::InvalidColor {
        value: color_text.clone(),
        file: file_name.to_string(),
    })?;
    let stations = station_list(raw.stations.as_ref(), file_name)?;

    Ok(Line {
        system,
        id,
        name,
        years: scalar_text(raw.years.as_ref()),
        color,
        stations,
    })
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn list_line_files(dir: &Path) -> Result<Vec<PathBuf>, LineError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn read_line_file(path: &Path) -> Result<Line, LineError> {
    let text = std::fs::read_to_string(path).map_err(|source| LineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_line_json(&text, &file_name)
}

/// Loads every line from a folder of line files, or a single file. Any bad
/// file fails the whole batch.
pub fn load_lines(path: &Path) -> Result<Vec<Line>, LineError> {
    if path.is_file() {
        return Ok(vec![read_line_file(path)?]);
    }
    let files = list_line_files(path)?;
    if files.is_empty() {
        return Err(LineError::NoLineFiles(path.to_path_buf()));
    }
    files.iter().map(|file| read_line_file(file)).collect()
}
