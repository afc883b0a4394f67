use crate::config::LayoutConfig;
use crate::ir::Line;
use crate::render::rasterize_png;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static RESERVED_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static WINDOWS_DRIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:").unwrap());

/// Replaces characters that are reserved in file names with `_` and collapses
/// whitespace runs to a single space.
pub fn safe_file_name(name: &str) -> String {
    let replaced = RESERVED_CHARS_RE.replace_all(name, "_");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

/// Output file stem for `line`, from `EXPORT_FILENAME_TEMPLATE` with fallbacks
/// to the line name and then `system-id`.
pub fn output_file_stem(line: &Line, config: &LayoutConfig) -> String {
    let from_template = safe_file_name(&line.apply_template(&config.export_filename_template));
    if !from_template.is_empty() {
        return from_template;
    }
    let from_name = safe_file_name(&line.name);
    if !from_name.is_empty() {
        return from_name;
    }
    safe_file_name(&format!("{}-{}", line.system, line.id))
}

fn is_absolute_destination(dest: &str) -> bool {
    dest.starts_with('/') || dest.starts_with('\\') || WINDOWS_DRIVE_RE.is_match(dest)
}

/// Folder every export of the batch lands in. `default_base` is used when no
/// destination is configured; relative destinations are joined onto it.
pub fn resolve_export_base_folder(config: &LayoutConfig, default_base: &Path) -> Result<PathBuf> {
    let dest = config.export_destination_folder.trim();
    if dest.is_empty() {
        return Ok(default_base.to_path_buf());
    }
    let folder = if is_absolute_destination(dest) {
        PathBuf::from(dest)
    } else {
        default_base.join(dest)
    };
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Could not create export destination: {}", folder.display()))?;
    Ok(folder)
}

/// Per-line folder: a subfolder named after the system when grouping is on.
/// Falls back to `base` if the subfolder cannot be created.
pub fn line_target_folder(base: &Path, line: &Line, config: &LayoutConfig) -> PathBuf {
    if !config.export_group_by_system {
        return base.to_path_buf();
    }
    let folder = base.join(safe_file_name(&line.system));
    match std::fs::create_dir_all(&folder) {
        Ok(()) => folder,
        Err(err) => {
            tracing::warn!(folder = %folder.display(), error = %err, "could not create system folder");
            base.to_path_buf()
        }
    }
}

/// Writes the enabled outputs for one line and returns the written paths.
/// Every output is encoded before the first file is written, and files
/// already written are removed again if a later write fails.
pub fn export_line(svg: &str, line: &Line, config: &LayoutConfig, base: &Path) -> Result<Vec<PathBuf>> {
    let folder = line_target_folder(base, line, config);
    let stem = output_file_stem(line, config);

    let mut outputs: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    if config.export_svg {
        outputs.push((folder.join(format!("{stem}.svg")), svg.as_bytes().to_vec()));
    }
    if config.export_png {
        let path = folder.join(format!("{stem}.png"));
        let png = rasterize_png(svg).with_context(|| format!("PNG export failed for {}", path.display()))?;
        outputs.push((path, png));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (path, bytes) in outputs {
        if let Err(err) = std::fs::write(&path, &bytes) {
            for done in &written {
                let _ = std::fs::remove_file(done);
            }
            return Err(err).with_context(|| format!("Export failed for {}", path.display()));
        }
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::sample_line;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("linemap-export-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sanitises_reserved_characters() {
        assert_eq!(safe_file_name(r#"  A/B:C*D?"E"<F>|G\H  "#), "A_B_C_D__E__F__G_H");
        assert_eq!(safe_file_name("Line \t 1\n East"), "Line 1 East");
        assert_eq!(safe_file_name("   "), "");
    }

    #[test]
    fn file_stem_falls_back_to_name_then_system_id() {
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig::default();
        assert_eq!(output_file_stem(&line, &config), "Red Line");

        let config = LayoutConfig {
            export_filename_template: "{system}/{years}".to_string(),
            ..LayoutConfig::default()
        };
        assert_eq!(output_file_stem(&line, &config), "Metro_1999-2024");

        let mut line = sample_line(&["A", "B"]);
        line.years.clear();
        let config = LayoutConfig {
            export_filename_template: "{years}".to_string(),
            ..LayoutConfig::default()
        };
        assert_eq!(output_file_stem(&line, &config), "Red Line");

        line.name = " ".to_string();
        assert_eq!(output_file_stem(&line, &config), "Metro-North");
    }

    #[test]
    fn destination_folder_resolution() {
        let base = scratch_dir("dest");
        let config = LayoutConfig::default();
        assert_eq!(resolve_export_base_folder(&config, &base).unwrap(), base);

        let config = LayoutConfig {
            export_destination_folder: "out/svg".to_string(),
            ..LayoutConfig::default()
        };
        let folder = resolve_export_base_folder(&config, &base).unwrap();
        assert_eq!(folder, base.join("out/svg"));
        assert!(folder.is_dir());

        let absolute = base.join("abs");
        let config = LayoutConfig {
            export_destination_folder: absolute.display().to_string(),
            ..LayoutConfig::default()
        };
        assert_eq!(resolve_export_base_folder(&config, &base).unwrap(), absolute);
        assert!(absolute.is_dir());
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn groups_by_system_folder() {
        let base = scratch_dir("group");
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            export_group_by_system: true,
            ..LayoutConfig::default()
        };
        let written = export_line("<svg/>", &line, &config, &base).unwrap();
        assert_eq!(written, vec![base.join("Metro").join("Red Line.svg")]);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "<svg/>");
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn group_folder_failure_falls_back_to_base() {
        let base = scratch_dir("blocked");
        // a plain file where the system folder would go
        std::fs::write(base.join("Metro"), "").unwrap();
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            export_group_by_system: true,
            ..LayoutConfig::default()
        };
        assert_eq!(line_target_folder(&base, &line, &config), base);
        let _ = std::fs::remove_dir_all(&base);
    }

    #[cfg(feature = "png")]
    #[test]
    fn failed_write_leaves_no_partial_export() {
        let base = scratch_dir("partial");
        // a folder where the PNG file would go
        std::fs::create_dir_all(base.join("Red Line.png")).unwrap();
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            export_svg: true,
            export_png: true,
            ..LayoutConfig::default()
        };
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#FFFFFF"/></svg>"##;
        let err = export_line(svg, &line, &config, &base).unwrap_err();
        assert!(err.to_string().contains("Red Line.png"));
        assert!(!base.join("Red Line.svg").exists());
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn unencodable_png_writes_nothing() {
        let base = scratch_dir("unencodable");
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            export_svg: true,
            export_png: true,
            ..LayoutConfig::default()
        };
        assert!(export_line("not an svg", &line, &config, &base).is_err());
        assert!(!base.join("Red Line.svg").exists());
        let _ = std::fs::remove_dir_all(&base);
    }
}
