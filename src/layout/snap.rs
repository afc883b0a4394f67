use crate::text_metrics::TextMeasure;

use super::types::{PlacedText, TextElement};

#[derive(Debug, Clone, PartialEq)]
pub struct SnappedText {
    pub placed: PlacedText,
    /// Outlined left edge measured after the move.
    pub outline_left: f32,
}

/// Left edge of the element's glyph outlines, or of its nominal box when the
/// backend has no outlines for this font.
pub fn outline_left(measurer: &dyn TextMeasure, element: &TextElement) -> f32 {
    match measurer.outline_bounds(&element.text, &element.style, element.placement) {
        Some(bounds) => bounds.left,
        None => {
            tracing::debug!(text = %element.text, "outline unavailable, aligning nominal box");
            measurer
                .nominal_bounds(&element.text, &element.style, element.placement)
                .left
        }
    }
}

/// Moves `element` so its rendered left edge lands on `target_x` and reports
/// the edge actually achieved.
pub fn snap_outline_left(measurer: &dyn TextMeasure, element: &TextElement, target_x: f32) -> SnappedText {
    let dx = target_x - outline_left(measurer, element);
    let moved = element.translated(dx, 0.0);
    // `measure` prefers outlines and falls back to the nominal box, the same
    // order as `outline_left`.
    let bounds = measurer.measure(&moved.text, &moved.style, moved.placement);
    SnappedText {
        placed: PlacedText {
            element: moved,
            bounds,
        },
        outline_left: bounds.left,
    }
}
