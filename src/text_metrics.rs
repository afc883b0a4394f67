use crate::fonts::{FontBook, FontData};
use std::collections::HashMap;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Advance used for glyphs the face cannot map, in em.
const MISSING_GLYPH_ADVANCE: f32 = 0.56;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }
}

/// Axis-aligned box in canvas coordinates (y grows upwards, so `top >= bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasuredBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl MeasuredBox {
    pub fn point(x: f32, y: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    fn include(&mut self, x: f32, y: f32) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.bottom = self.bottom.min(y);
        self.top = self.top.max(y);
    }

    fn from_points(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut bounds = Self::point(x, y);
        for (x, y) in iter {
            bounds.include(x, y);
        }
        Some(bounds)
    }
}

/// Where a text run sits: the pre-rotation top-left corner of its nominal box,
/// and a counter-clockwise rotation in degrees about that corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

impl Placement {
    pub fn new(x: f32, y: f32, rotation: f32) -> Self {
        Self { x, y, rotation }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            rotation: self.rotation,
        }
    }

    /// Maps a point of the run's local frame (origin at the top-left corner,
    /// y up) into canvas coordinates.
    pub fn to_canvas(&self, local_x: f32, local_y: f32) -> (f32, f32) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        (
            self.x + local_x * cos - local_y * sin,
            self.y + local_x * sin + local_y * cos,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of the nominal box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the nominal box.
    pub descent: f32,
}

impl LineMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Text measurement backend used by the layout engine.
///
/// Backends provide line metrics, advances and (when they can) glyph outlines;
/// the bounding-box operations are derived from those.
pub trait TextMeasure {
    fn line_metrics(&self, style: &TextStyle) -> LineMetrics;

    fn advance_width(&self, text: &str, style: &TextStyle) -> f32;

    /// Glyph outlines of the run in canvas coordinates, `None` when this
    /// backend cannot produce outlines for the style's font.
    fn glyph_outlines(
        &self,
        _text: &str,
        _style: &TextStyle,
        _placement: Placement,
    ) -> Option<Vec<PathSegment>> {
        None
    }

    /// Rotated advance-width × line-height box.
    fn nominal_bounds(&self, text: &str, style: &TextStyle, placement: Placement) -> MeasuredBox {
        let width = self.advance_width(text, style);
        let height = self.line_metrics(style).height();
        let corners = [(0.0, 0.0), (width, 0.0), (0.0, -height), (width, -height)];
        MeasuredBox::from_points(corners.map(|(x, y)| placement.to_canvas(x, y)))
            .unwrap_or_else(|| MeasuredBox::point(placement.x, placement.y))
    }

    fn outline_bounds(
        &self,
        text: &str,
        style: &TextStyle,
        placement: Placement,
    ) -> Option<MeasuredBox> {
        path_bounds(&self.glyph_outlines(text, style, placement)?)
    }

    /// Rendered extent of the run: outline bounds when available, the nominal
    /// box otherwise, a zero-size box for empty text.
    fn measure(&self, text: &str, style: &TextStyle, placement: Placement) -> MeasuredBox {
        if text.is_empty() {
            return MeasuredBox::point(placement.x, placement.y);
        }
        match self.outline_bounds(text, style, placement) {
            Some(bounds) => bounds,
            None => {
                tracing::debug!(text, font = %style.font_family, "no glyph outlines, using nominal box");
                self.nominal_bounds(text, style, placement)
            }
        }
    }
}

/// Exact bounds of a path, including curve extrema.
pub fn path_bounds(segments: &[PathSegment]) -> Option<MeasuredBox> {
    let mut bounds: Option<MeasuredBox> = None;
    let mut include = |x: f32, y: f32| match bounds.as_mut() {
        Some(existing) => existing.include(x, y),
        None => bounds = Some(MeasuredBox::point(x, y)),
    };
    let mut current = (0.0f32, 0.0f32);
    let mut start = current;
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(x, y) => {
                include(x, y);
                current = (x, y);
                start = current;
            }
            PathSegment::LineTo(x, y) => {
                include(x, y);
                current = (x, y);
            }
            PathSegment::QuadTo(x1, y1, x, y) => {
                for t in [quad_extremum(current.0, x1, x), quad_extremum(current.1, y1, y)]
                    .into_iter()
                    .flatten()
                {
                    include(quad_at(current.0, x1, x, t), quad_at(current.1, y1, y, t));
                }
                include(x, y);
                current = (x, y);
            }
            PathSegment::CubicTo(x1, y1, x2, y2, x, y) => {
                let mut roots = cubic_extrema(current.0, x1, x2, x);
                roots.extend(cubic_extrema(current.1, y1, y2, y));
                for t in roots {
                    include(
                        cubic_at(current.0, x1, x2, x, t),
                        cubic_at(current.1, y1, y2, y, t),
                    );
                }
                include(x, y);
                current = (x, y);
            }
            PathSegment::Close => current = start,
        }
    }
    bounds
}

fn quad_at(p0: f32, p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    mt * mt * p0 + 2.0 * mt * t * p1 + t * t * p2
}

fn quad_extremum(p0: f32, p1: f32, p2: f32) -> Option<f32> {
    let denom = p0 - 2.0 * p1 + p2;
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let t = (p0 - p1) / denom;
    (t > 0.0 && t < 1.0).then_some(t)
}

fn cubic_at(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

fn cubic_extrema(p0: f32, p1: f32, p2: f32, p3: f32) -> Vec<f32> {
    // derivative / 3 = a t^2 + b t + c
    let a = (p1 - p0) - 2.0 * (p2 - p1) + (p3 - p2);
    let b = 2.0 * ((p2 - p1) - (p1 - p0));
    let c = p1 - p0;
    let mut roots = Vec::with_capacity(2);
    if a.abs() < f32::EPSILON {
        if b.abs() >= f32::EPSILON {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-b + sq) / (2.0 * a));
            roots.push((-b - sq) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// Measurement from real font files: metrics and outlines come from the faces
/// resolved once for the batch.
pub struct FontMeasurer {
    faces: HashMap<String, FontData>,
    fallback: FontData,
}

impl FontMeasurer {
    /// Resolves every family up front. Returns `None` when not even the default
    /// face can be found.
    pub fn new(book: &FontBook, families: &[&str]) -> Option<Self> {
        let fallback = book.resolve_default()?;
        let mut faces = HashMap::new();
        for family in families {
            if faces.contains_key(*family) {
                continue;
            }
            let face = match book.resolve(family) {
                Some(face) => face,
                None => {
                    tracing::warn!(font = family, "font not found, using the default face");
                    fallback.clone()
                }
            };
            faces.insert(family.to_string(), face);
        }
        Some(Self { faces, fallback })
    }

    fn with_face<T>(&self, style: &TextStyle, f: impl FnOnce(&Face<'_>) -> T) -> Option<T> {
        let font = self.faces.get(&style.font_family).unwrap_or(&self.fallback);
        let face = Face::parse(font.bytes(), font.index()).ok()?;
        Some(f(&face))
    }
}

impl std::fmt::Debug for FontMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMeasurer")
            .field("families", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TextMeasure for FontMeasurer {
    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        self.with_face(style, |face| {
            let scale = style.font_size / face.units_per_em().max(1) as f32;
            LineMetrics {
                ascent: face.ascender() as f32 * scale,
                descent: -(face.descender() as f32) * scale,
            }
        })
        .unwrap_or_else(|| HeuristicMeasurer.line_metrics(style))
    }

    fn advance_width(&self, text: &str, style: &TextStyle) -> f32 {
        self.with_face(style, |face| {
            let scale = style.font_size / face.units_per_em().max(1) as f32;
            text.chars()
                .map(|ch| match face.glyph_index(ch) {
                    Some(glyph) => face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale,
                    None => style.font_size * MISSING_GLYPH_ADVANCE,
                })
                .sum::<f32>()
        })
        .unwrap_or_else(|| HeuristicMeasurer.advance_width(text, style))
    }

    fn glyph_outlines(
        &self,
        text: &str,
        style: &TextStyle,
        placement: Placement,
    ) -> Option<Vec<PathSegment>> {
        self.with_face(style, |face| {
            let scale = style.font_size / face.units_per_em().max(1) as f32;
            let mut builder = GlyphPathBuilder {
                segments: Vec::new(),
                placement,
                pen_x: 0.0,
                baseline: -(face.ascender() as f32 * scale),
                scale,
            };
            for ch in text.chars() {
                let Some(glyph) = face.glyph_index(ch) else {
                    builder.pen_x += style.font_size * MISSING_GLYPH_ADVANCE;
                    continue;
                };
                face.outline_glyph(glyph, &mut builder);
                builder.pen_x += advance_of(face, glyph) * scale;
            }
            builder.segments
        })
    }
}

fn advance_of(face: &Face<'_>, glyph: GlyphId) -> f32 {
    face.glyph_hor_advance(glyph).unwrap_or(0) as f32
}

struct GlyphPathBuilder {
    segments: Vec<PathSegment>,
    placement: Placement,
    pen_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        self.placement
            .to_canvas(self.pen_x + x * self.scale, self.baseline + y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.segments.push(PathSegment::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.segments.push(PathSegment::LineTo(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.segments.push(PathSegment::QuadTo(x1, y1, x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.segments.push(PathSegment::CubicTo(x1, y1, x2, y2, x, y));
    }

    fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }
}

/// Font-free measurement with calibrated per-character widths. It has no
/// outlines, so every measurement is the nominal box.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasure for HeuristicMeasurer {
    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        LineMetrics {
            ascent: style.font_size * 0.905,
            descent: style.font_size * 0.212,
        }
    }

    fn advance_width(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().map(char_width_factor).sum::<f32>() * style.font_size
    }
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Advance widths of Arial-like sans faces, in em.
    match ch {
        ' ' => 0.278,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '-' => 0.333,
        '\'' => 0.191,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        '\u{2014}' => 1.0,
        _ => MISSING_GLYPH_ADVANCE,
    }
}
