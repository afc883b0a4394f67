pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use error::{ConfigError, LayoutError, LineError};
pub use ir::{Line, Rgb};
pub use layout::{PlacementResult, compute_placement};
pub use parser::{load_lines, parse_line_json};
pub use render::render_svg;
pub use text_metrics::{FontMeasurer, HeuristicMeasurer, TextMeasure};
