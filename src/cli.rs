use crate::config::{discover_config, load_config, LayoutConfig};
use crate::export::{export_line, output_file_stem, resolve_export_base_folder};
use crate::fonts::FontBook;
use crate::layout::compute_placement;
use crate::layout_dump::write_layout_dump;
use crate::parser::load_lines;
use crate::render::render_svg;
use crate::text_metrics::{FontMeasurer, HeuristicMeasurer, TextMeasure};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

pub const DEFAULT_LINES_DIR: &str = "lines";

#[derive(Parser, Debug)]
#[command(name = "linemap", version, about = "Linear transit line diagrams from JSON line files")]
pub struct Args {
    /// Folder of line .json files, or a single line file
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output folder. Defaults to the parent of the lines folder.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format, overriding EXPORT_SVG / EXPORT_PNG
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Config JSON file (linear-config.json is picked up when present)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write a JSON layout dump per line into this folder
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Measure text with built-in width tables instead of font files
    #[arg(long = "heuristicMetrics")]
    pub heuristic_metrics: bool,

    /// Extra font folder to search (repeatable)
    #[arg(long = "fontDir")]
    pub font_dirs: Vec<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let lines_path = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LINES_DIR));
    let lines_dir = lines_folder(&lines_path);

    let config_path = args.config.clone().or_else(|| discover_config(&lines_dir));
    let loaded = load_config(config_path.as_deref()).context("Failed to load config")?;
    let mut config = loaded.layout;
    if let Some(format) = args.output_format {
        config.export_svg = format == OutputFormat::Svg;
        config.export_png = format == OutputFormat::Png;
    }

    let lines = load_lines(&lines_path)
        .with_context(|| format!("Failed to load line files from {}", lines_path.display()))?;

    let measurer = build_measurer(&args, &config);

    let export_base = if config.export_svg || config.export_png {
        let default_base = match &args.output {
            Some(output) => {
                std::fs::create_dir_all(output)
                    .with_context(|| format!("Could not create output folder {}", output.display()))?;
                output.clone()
            }
            None => parent_or_current(&lines_dir),
        };
        Some(resolve_export_base_folder(&config, &default_base)?)
    } else {
        None
    };

    if let Some(dir) = &args.dump_layout {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create layout dump folder {}", dir.display()))?;
    }

    for line in &lines {
        let result = compute_placement(line, &config, measurer.as_ref())
            .with_context(|| format!("Layout failed for line {}", line.name))?;
        let svg = render_svg(&result, line, &config, measurer.as_ref());

        if let Some(base) = &export_base {
            let written = export_line(&svg, line, &config, base)?;
            for path in &written {
                tracing::info!(line = %line.name, path = %path.display(), "exported");
            }
        }
        if let Some(dir) = &args.dump_layout {
            let path = dir.join(format!("{}.layout.json", output_file_stem(line, &config)));
            write_layout_dump(&path, &result, line)
                .with_context(|| format!("Failed to write layout dump {}", path.display()))?;
        }
        tracing::debug!(
            line = %line.name,
            height = result.canvas_height(),
            spacing = result.spacing(),
            "line laid out"
        );
    }

    let mut summary = format!(
        "Generated {} diagrams from {}",
        lines.len(),
        lines_dir.display()
    );
    if let Some(base) = &export_base {
        summary.push_str(&format!("; exported to {}", base.display()));
        if config.export_group_by_system {
            summary.push_str(" (with system subfolders)");
        }
    }
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Font-backed measurement unless disabled or no usable face exists.
fn build_measurer(args: &Args, config: &LayoutConfig) -> Box<dyn TextMeasure> {
    if args.heuristic_metrics {
        return Box::new(HeuristicMeasurer);
    }
    let mut book = FontBook::system();
    for dir in &args.font_dirs {
        book.load_fonts_dir(dir);
    }
    let families = [
        config.font_label_name.as_str(),
        config.font_title_name.as_str(),
        config.font_subtitle_name.as_str(),
        config.font_footer_name.as_str(),
    ];
    match FontMeasurer::new(&book, &families) {
        Some(measurer) => Box::new(measurer),
        None => {
            tracing::warn!("no usable font found, falling back to heuristic text metrics");
            Box::new(HeuristicMeasurer)
        }
    }
}

/// The folder holding the line files, for a folder or single-file input.
fn lines_folder(input: &Path) -> PathBuf {
    if input.is_file() {
        parent_or_current(input)
    } else {
        input.to_path_buf()
    }
}

fn parent_or_current(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
