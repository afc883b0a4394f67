use crate::canvas::Canvas;
use crate::text_metrics::{MeasuredBox, Placement, TextStyle};

/// A single-line text run positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub style: TextStyle,
    pub placement: Placement,
}

impl TextElement {
    pub fn new(text: impl Into<String>, style: TextStyle, placement: Placement) -> Self {
        Self {
            text: text.into(),
            style,
            placement,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            placement: self.placement.translated(dx, dy),
            ..self.clone()
        }
    }
}

/// Text element plus its last measured extent.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub element: TextElement,
    pub bounds: MeasuredBox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationMarker {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddingExtras {
    pub extra_left: f32,
    pub extra_right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingDecision {
    pub line_left: f32,
    pub line_right: f32,
    pub extras: PaddingExtras,
    /// Computed padding collapsed the baseline and was discarded.
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationLayout {
    pub line_left: f32,
    pub line_right: f32,
    pub spacing: f32,
    pub baseline_y: f32,
    pub markers: Vec<StationMarker>,
    pub labels: Vec<PlacedText>,
}

impl StationLayout {
    pub fn anchors(&self) -> impl Iterator<Item = f32> + '_ {
        self.markers.iter().map(|marker| marker.x)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: Option<PlacedText>,
    pub title_outline_left: Option<f32>,
    pub subtitle: Option<PlacedText>,
    pub subtitle_outline_left: Option<f32>,
}

/// Everything a renderer needs to draw one line's diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementResult {
    pub padding: PaddingDecision,
    pub stations: StationLayout,
    pub footer: Option<PlacedText>,
    pub canvas: Canvas,
    pub titles: TitleBlock,
}

impl PlacementResult {
    pub fn line_left(&self) -> f32 {
        self.stations.line_left
    }

    pub fn line_right(&self) -> f32 {
        self.stations.line_right
    }

    pub fn spacing(&self) -> f32 {
        self.stations.spacing
    }

    pub fn canvas_height(&self) -> f32 {
        self.canvas.height()
    }

    pub fn subtitle_outline_left(&self) -> Option<f32> {
        self.titles.subtitle_outline_left
    }

    /// Every text run in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &PlacedText> {
        self.stations
            .labels
            .iter()
            .chain(self.footer.iter())
            .chain(self.titles.title.iter())
            .chain(self.titles.subtitle.iter())
    }
}
