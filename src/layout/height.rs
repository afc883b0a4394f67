use crate::canvas::Canvas;
use crate::config::LayoutConfig;
use crate::error::LayoutError;

use super::types::PlacedText;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightInput {
    /// Highest measured top among the texts placed so far.
    pub max_text_top: f32,
    pub min_height: f32,
    /// Space kept free above the content for the title band.
    pub reserve: f32,
}

impl HeightInput {
    pub fn new<'a>(texts: impl IntoIterator<Item = &'a PlacedText>, config: &LayoutConfig) -> Self {
        Self {
            max_text_top: max_text_top(texts),
            min_height: config.min_height,
            reserve: config.title_band_reserve(),
        }
    }
}

pub fn max_text_top<'a>(texts: impl IntoIterator<Item = &'a PlacedText>) -> f32 {
    texts
        .into_iter()
        .map(|text| text.bounds.top)
        .fold(0.0, f32::max)
}

pub fn needed_height(input: &HeightInput) -> f32 {
    input
        .min_height
        .max(input.max_text_top + input.reserve)
        .ceil()
}

/// Grows or shrinks the canvas to fit the placed content when auto height is
/// on; otherwise the canvas keeps its configured height.
pub fn resolve_canvas_height(
    canvas: &mut Canvas,
    input: &HeightInput,
    auto_height: bool,
) -> Result<f32, LayoutError> {
    if !auto_height {
        return Ok(canvas.height());
    }
    let height = needed_height(input);
    canvas.resize_height(height)?;
    Ok(height)
}
