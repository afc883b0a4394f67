use crate::error::ConfigError;
use crate::ir::Rgb;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT: &str = "ArialMT";
pub const CONFIG_FILE_NAME: &str = "linear-config.json";

/// Station label orientation. Any value other than `vertical` means angled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LabelMode {
    Vertical,
    Angled,
}

impl From<String> for LabelMode {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "vertical" => Self::Vertical,
            "angled" => Self::Angled,
            other => {
                tracing::warn!(mode = other, "unknown LABEL_MODE, using angled");
                Self::Angled
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LayoutConfig {
    pub artboard_width: f32,
    pub artboard_height: f32,
    pub baseline_y: f32,
    pub h_padding: f32,

    pub auto_pad_terminals: bool,
    pub pad_right_margin: f32,
    pub pad_left_margin: f32,
    pub pad_max_extra: f32,
    pub pad_check_left: bool,

    pub line_stroke: f32,
    pub line_outline_enabled: bool,
    pub line_outline_width: f32,
    pub line_outline_color: String,

    pub station_radius: f32,
    pub station_stroke_width: Option<f32>,
    pub station_outline: String,
    pub station_fill: String,

    pub label_mode: LabelMode,
    pub label_tilt: f32,
    pub label_clearance: f32,
    pub label_x_nudge: f32,
    pub label_color: String,

    pub font_label_name: String,
    pub font_title_name: String,
    pub font_subtitle_name: String,
    pub font_footer_name: String,
    pub font_size: f32,

    pub footer_text: String,
    pub footer_font_size: f32,
    pub footer_color: String,
    pub footer_bottom_margin: f32,

    pub draw_title: bool,
    pub title_template: String,
    pub title_font_size: f32,
    pub title_color: String,
    pub title_left: f32,
    pub title_top_from_top: f32,

    pub draw_subtitle: bool,
    pub subtitle_template: String,
    pub subtitle_font_size: f32,
    pub subtitle_color: String,
    pub subtitle_left: f32,
    pub subtitle_top_from_top: f32,

    pub auto_height: bool,
    pub min_height: f32,
    pub reserve_title_band: bool,
    pub title_band_padding: f32,
    pub title_band_line_gap: f32,
    pub background_color: String,

    pub export_svg: bool,
    pub export_png: bool,
    pub export_destination_folder: String,
    pub export_group_by_system: bool,
    pub export_filename_template: String,
    pub outline_text_for_svg: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            artboard_width: 1500.0,
            artboard_height: 300.0,
            baseline_y: 48.0,
            h_padding: 90.0,
            auto_pad_terminals: true,
            pad_right_margin: 8.0,
            pad_left_margin: 8.0,
            pad_max_extra: 260.0,
            pad_check_left: false,
            line_stroke: 16.0,
            line_outline_enabled: false,
            line_outline_width: 3.0,
            line_outline_color: "#000000".to_string(),
            station_radius: 10.0,
            station_stroke_width: None,
            station_outline: "#000000".to_string(),
            station_fill: "#FFFFFF".to_string(),
            label_mode: LabelMode::Angled,
            label_tilt: -20.0,
            label_clearance: 10.0,
            label_x_nudge: -6.0,
            label_color: "#000000".to_string(),
            font_label_name: DEFAULT_FONT.to_string(),
            font_title_name: DEFAULT_FONT.to_string(),
            font_subtitle_name: DEFAULT_FONT.to_string(),
            font_footer_name: DEFAULT_FONT.to_string(),
            font_size: 18.0,
            footer_text: "Rail Fans Canada \u{2014} 2026".to_string(),
            footer_font_size: 11.0,
            footer_color: "#9B9B9B".to_string(),
            footer_bottom_margin: 15.0,
            draw_title: true,
            title_template: "{name}{years_paren}".to_string(),
            title_font_size: 44.0,
            title_color: "#000000".to_string(),
            title_left: 14.0,
            title_top_from_top: 18.0,
            draw_subtitle: false,
            subtitle_template: "{system}".to_string(),
            subtitle_font_size: 18.0,
            subtitle_color: "#5A5A5A".to_string(),
            subtitle_left: 14.0,
            subtitle_top_from_top: 70.0,
            auto_height: true,
            min_height: 220.0,
            reserve_title_band: true,
            title_band_padding: 10.0,
            title_band_line_gap: 10.0,
            background_color: "#FFFFFF".to_string(),
            export_svg: true,
            export_png: false,
            export_destination_folder: String::new(),
            export_group_by_system: false,
            export_filename_template: "{name}".to_string(),
            outline_text_for_svg: true,
        }
    }
}

impl LayoutConfig {
    /// Label rotation in degrees, counter-clockwise.
    pub fn label_rotation(&self) -> f32 {
        match self.label_mode {
            LabelMode::Vertical => 90.0,
            LabelMode::Angled => 90.0 + self.label_tilt,
        }
    }

    pub fn resolved_station_stroke_width(&self) -> f32 {
        self.station_stroke_width
            .unwrap_or_else(|| (self.line_stroke * 0.35).round().max(2.0))
    }

    /// Height of the band kept free for the title, measured from the top edge.
    pub fn title_band_reserve(&self) -> f32 {
        if !(self.draw_title && self.reserve_title_band) {
            return 0.0;
        }
        self.title_font_size * 1.35
            + self.title_band_padding
            + self.title_top_from_top
            + self.title_band_line_gap
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ARTBOARD_WIDTH", self.artboard_width),
            ("ARTBOARD_HEIGHT", self.artboard_height),
            ("FONT_SIZE", self.font_size),
            ("TITLE_FONT_SIZE", self.title_font_size),
            ("SUBTITLE_FONT_SIZE", self.subtitle_font_size),
            ("FOOTER_FONT_SIZE", self.footer_font_size),
            ("MIN_HEIGHT", self.min_height),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        let non_negative = [
            ("H_PADDING", self.h_padding),
            ("PAD_MAX_EXTRA", self.pad_max_extra),
            ("LINE_STROKE", self.line_stroke),
            ("STATION_RADIUS", self.station_radius),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must not be negative, got {value}"),
                });
            }
        }
        if self.h_padding * 2.0 >= self.artboard_width {
            return Err(ConfigError::Invalid {
                key: "H_PADDING",
                reason: format!(
                    "must be less than half of ARTBOARD_WIDTH ({}), got {}",
                    self.artboard_width, self.h_padding
                ),
            });
        }
        for (key, value) in self.color_options() {
            if Rgb::from_hex(value).is_none() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("invalid HEX color {value:?}"),
                });
            }
        }
        Ok(())
    }

    fn color_options(&self) -> [(&'static str, &str); 8] {
        [
            ("LINE_OUTLINE_COLOR", &self.line_outline_color),
            ("STATION_OUTLINE", &self.station_outline),
            ("STATION_FILL", &self.station_fill),
            ("LABEL_COLOR", &self.label_color),
            ("FOOTER_COLOR", &self.footer_color),
            ("TITLE_COLOR", &self.title_color),
            ("SUBTITLE_COLOR", &self.subtitle_color),
            ("BACKGROUND_COLOR", &self.background_color),
        ]
    }

    /// Color option as RGB. Options are validated on load, black otherwise.
    pub fn color(&self, value: &str) -> Rgb {
        Rgb::from_hex(value).unwrap_or(Rgb::BLACK)
    }

    fn fill_blank_fonts(&mut self) {
        for name in [
            &mut self.font_label_name,
            &mut self.font_title_name,
            &mut self.font_subtitle_name,
            &mut self.font_footer_name,
        ] {
            if name.trim().is_empty() {
                *name = DEFAULT_FONT.to_string();
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub layout: LayoutConfig,
    pub source: Option<PathBuf>,
    pub unknown_keys: Vec<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            layout: LayoutConfig::default(),
            source: None,
            unknown_keys: Vec::new(),
        });
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut loaded = parse_config(&contents).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    loaded.source = Some(path.to_path_buf());
    if !loaded.unknown_keys.is_empty() {
        tracing::warn!(
            config = %path.display(),
            keys = %loaded.unknown_keys.join(", "),
            "config contains {} unknown key(s); they are kept but double-check for typos",
            loaded.unknown_keys.len()
        );
    }
    loaded.layout.validate()?;
    Ok(loaded)
}

/// Merges a config document over the defaults. Errors are plain messages; the
/// caller attaches the path.
pub fn parse_config(contents: &str) -> Result<LoadedConfig, String> {
    let raw = contents.trim().trim_start_matches('\u{feff}');
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(strict_err) => json5::from_str(raw).map_err(|_| strict_err.to_string())?,
    };
    let overrides = match parsed {
        Value::Object(mut map) => match map.remove("CFG") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("CFG".to_string(), other);
                map
            }
            None => map,
        },
        _ => return Err("config root must be a JSON object".to_string()),
    };

    let defaults = serde_json::to_value(LayoutConfig::default()).map_err(|err| err.to_string())?;
    let Value::Object(mut merged) = defaults else {
        return Err("default config is not an object".to_string());
    };
    let unknown_keys: Vec<String> = overrides
        .keys()
        .filter(|key| !merged.contains_key(key.as_str()))
        .cloned()
        .collect();
    merge_deep(&mut merged, overrides);

    let mut layout: LayoutConfig =
        serde_json::from_value(Value::Object(merged)).map_err(|err| err.to_string())?;
    layout.fill_blank_fonts();
    Ok(LoadedConfig {
        layout,
        source: None,
        unknown_keys,
    })
}

fn merge_deep(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        match value {
            Value::Object(nested) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    merge_deep(existing, nested);
                } else {
                    base.insert(key, Value::Object(nested));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// `linear-config.json` next to the lines folder or in the working directory.
pub fn discover_config(lines_dir: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(parent) = lines_dir.parent() {
        candidates.push(parent.join(CONFIG_FILE_NAME));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));
    candidates.into_iter().find(|path| path.is_file())
}
