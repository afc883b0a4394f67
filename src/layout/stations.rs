use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::text_metrics::{Placement, TextMeasure, TextStyle};

use super::types::{PaddingDecision, PlacedText, StationLayout, StationMarker, TextElement};

#[derive(Debug, Clone)]
pub struct StationLayoutInput<'a> {
    pub stations: &'a [String],
    pub line_left: f32,
    pub line_right: f32,
    pub baseline_y: f32,
    pub line_stroke: f32,
    pub station_radius: f32,
    pub station_stroke_width: f32,
    pub label_style: TextStyle,
    pub rotation: f32,
    pub clearance: f32,
    pub x_nudge: f32,
}

impl<'a> StationLayoutInput<'a> {
    pub fn new(stations: &'a [String], padding: &PaddingDecision, config: &LayoutConfig) -> Self {
        Self {
            stations,
            line_left: padding.line_left,
            line_right: padding.line_right,
            baseline_y: config.baseline_y,
            line_stroke: config.line_stroke,
            station_radius: config.station_radius,
            station_stroke_width: config.resolved_station_stroke_width(),
            label_style: TextStyle::new(config.font_label_name.clone(), config.font_size),
            rotation: config.label_rotation(),
            clearance: config.label_clearance,
            x_nudge: config.label_x_nudge,
        }
    }

    /// Top edge of the stroked baseline.
    pub fn line_top_y(&self) -> f32 {
        self.baseline_y + self.line_stroke / 2.0
    }
}

/// Evenly spaced anchors; the first is `line_left` and the last is pinned to
/// `line_right` exactly.
pub fn station_anchors(line_left: f32, line_right: f32, count: usize) -> Result<Vec<f32>, LayoutError> {
    if count < 2 {
        return Err(LayoutError::TooFewStations(count));
    }
    let spacing = (line_right - line_left) / (count - 1) as f32;
    let mut anchors: Vec<f32> = (0..count).map(|i| line_left + i as f32 * spacing).collect();
    anchors[count - 1] = line_right;
    Ok(anchors)
}

/// Rotates the label at its anchor and shifts it so its measured left edge sits
/// on `anchor_x`, then applies the optical nudge.
pub(crate) fn align_label_left(
    measurer: &dyn TextMeasure,
    text: &str,
    style: &TextStyle,
    anchor_x: f32,
    baseline_y: f32,
    rotation: f32,
    x_nudge: f32,
) -> TextElement {
    let element = TextElement::new(text, style.clone(), Placement::new(anchor_x, baseline_y, rotation));
    let bounds = measurer.measure(&element.text, &element.style, element.placement);
    element.translated(anchor_x - bounds.left + x_nudge, 0.0)
}

/// Places one station label: rotate, fix horizontal drift, then rest the
/// rendered bottom `clearance` above the line's top edge.
pub fn place_label(
    measurer: &dyn TextMeasure,
    text: &str,
    anchor_x: f32,
    input: &StationLayoutInput<'_>,
) -> PlacedText {
    let element = align_label_left(
        measurer,
        text,
        &input.label_style,
        anchor_x,
        input.baseline_y,
        input.rotation,
        input.x_nudge,
    );
    let bounds = measurer.measure(&element.text, &element.style, element.placement);
    let dy = input.line_top_y() + input.clearance - bounds.bottom;
    PlacedText {
        element: element.translated(0.0, dy),
        bounds: bounds.translate(0.0, dy),
    }
}

pub fn layout_stations(
    measurer: &dyn TextMeasure,
    input: &StationLayoutInput<'_>,
) -> Result<StationLayout, LayoutError> {
    let anchors = station_anchors(input.line_left, input.line_right, input.stations.len())?;
    let spacing = (input.line_right - input.line_left) / (anchors.len() - 1) as f32;

    let markers = anchors
        .iter()
        .map(|&x| StationMarker {
            x,
            y: input.baseline_y,
            radius: input.station_radius,
            stroke_width: input.station_stroke_width,
        })
        .collect();
    let labels = input
        .stations
        .iter()
        .zip(&anchors)
        .map(|(name, &x)| place_label(measurer, name, x, input))
        .collect();

    Ok(StationLayout {
        line_left: input.line_left,
        line_right: input.line_right,
        spacing,
        baseline_y: input.baseline_y,
        markers,
        labels,
    })
}
