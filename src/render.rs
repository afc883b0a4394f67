use crate::config::LayoutConfig;
use crate::ir::{Line, Rgb};
use crate::layout::{PlacedText, PlacementResult};
use crate::text_metrics::{PathSegment, TextMeasure};
use anyhow::Result;

/// Renders a computed placement as a standalone SVG document.
///
/// Layout coordinates are y-up with the origin at the bottom-left corner, so
/// every y is flipped against the canvas height on the way out.
pub fn render_svg(
    result: &PlacementResult,
    line: &Line,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> String {
    let mut svg = String::new();
    let width = result.canvas.width();
    let height = result.canvas_height();
    let flip = |y: f32| height - y;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    let background = result.canvas.background();
    svg.push_str(&format!(
        "<rect id=\"{}\" x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        background.name, background.width, background.height, background.color
    ));

    let stations = &result.stations;
    let baseline = flip(stations.baseline_y);
    if config.line_outline_enabled {
        svg.push_str(&format!(
            "<path d=\"M {:.2} {baseline:.2} L {:.2} {baseline:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\"/>",
            stations.line_left,
            stations.line_right,
            config.color(&config.line_outline_color),
            config.line_stroke + config.line_outline_width * 2.0
        ));
    }
    svg.push_str(&format!(
        "<path d=\"M {:.2} {baseline:.2} L {:.2} {baseline:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\"/>",
        stations.line_left, stations.line_right, line.color, config.line_stroke
    ));

    let station_fill = config.color(&config.station_fill);
    let station_outline = config.color(&config.station_outline);
    for marker in &stations.markers {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{station_fill}\" stroke=\"{station_outline}\" stroke-width=\"{:.2}\"/>",
            marker.x,
            flip(marker.y),
            marker.radius,
            marker.stroke_width
        ));
    }

    let outlines = config.outline_text_for_svg;
    let label_color = config.color(&config.label_color);
    svg.push_str("<g id=\"labels\">");
    for label in &stations.labels {
        svg.push_str(&text_svg(label, label_color, height, outlines, measurer));
    }
    svg.push_str("</g>");

    if let Some(footer) = &result.footer {
        svg.push_str(&text_svg(footer, config.color(&config.footer_color), height, outlines, measurer));
    }
    if let Some(title) = &result.titles.title {
        svg.push_str(&text_svg(title, config.color(&config.title_color), height, outlines, measurer));
    }
    if let Some(subtitle) = &result.titles.subtitle {
        svg.push_str(&text_svg(
            subtitle,
            config.color(&config.subtitle_color),
            height,
            outlines,
            measurer,
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Glyph outlines when requested and available, a positioned `<text>` otherwise.
fn text_svg(
    placed: &PlacedText,
    fill: Rgb,
    canvas_height: f32,
    outlines: bool,
    measurer: &dyn TextMeasure,
) -> String {
    let element = &placed.element;
    if outlines {
        let segments = measurer.glyph_outlines(&element.text, &element.style, element.placement);
        if let Some(segments) = segments.filter(|segments| !segments.is_empty()) {
            return format!(
                "<path d=\"{}\" fill=\"{fill}\"><title>{}</title></path>",
                segments_to_path(&segments, canvas_height),
                escape_xml(&element.text)
            );
        }
    }

    let placement = element.placement;
    let ascent = measurer.line_metrics(&element.style).ascent;
    let mut transform = format!("translate({:.2} {:.2})", placement.x, canvas_height - placement.y);
    if placement.rotation != 0.0 {
        transform.push_str(&format!(" rotate({:.2})", -placement.rotation));
    }
    format!(
        "<text transform=\"{transform}\" x=\"0\" y=\"{ascent:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\" xml:space=\"preserve\">{}</text>",
        escape_xml(&element.style.font_family),
        element.style.font_size,
        escape_xml(&element.text)
    )
}

fn segments_to_path(segments: &[PathSegment], canvas_height: f32) -> String {
    let flip = |y: f32| canvas_height - y;
    let mut d = String::new();
    for segment in segments {
        if !d.is_empty() {
            d.push(' ');
        }
        match *segment {
            PathSegment::MoveTo(x, y) => d.push_str(&format!("M {x:.2} {:.2}", flip(y))),
            PathSegment::LineTo(x, y) => d.push_str(&format!("L {x:.2} {:.2}", flip(y))),
            PathSegment::QuadTo(x1, y1, x, y) => {
                d.push_str(&format!("Q {x1:.2} {:.2} {x:.2} {:.2}", flip(y1), flip(y)))
            }
            PathSegment::CubicTo(x1, y1, x2, y2, x, y) => d.push_str(&format!(
                "C {x1:.2} {:.2} {x2:.2} {:.2} {x:.2} {:.2}",
                flip(y1),
                flip(y2),
                flip(y)
            )),
            PathSegment::Close => d.push('Z'),
        }
    }
    d
}

/// Rasterises an SVG document to PNG bytes.
#[cfg(feature = "png")]
pub fn rasterize_png(svg: &str) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Arial".to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap.encode_png()?)
}

#[cfg(not(feature = "png"))]
pub fn rasterize_png(_svg: &str) -> Result<Vec<u8>> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::sample_line;
    use crate::layout::compute_placement;
    use crate::text_metrics::HeuristicMeasurer;
    use crate::text_metrics::fake::BoxGlyphs;

    fn render(stations: &[&str], config: &LayoutConfig, measurer: &dyn TextMeasure) -> String {
        let line = sample_line(stations);
        let result = compute_placement(&line, config, measurer).unwrap();
        render_svg(&result, &line, config, measurer)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render(&["Alpha", "Beta", "Gamma"], &LayoutConfig::default(), &HeuristicMeasurer);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("id=\"bg-white\"").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("stroke=\"#D32F2F\""));
        assert!(svg.contains(">Alpha</text>"));
        assert!(svg.contains("rotate(-70.00)"));
    }

    #[test]
    fn outlines_replace_text_when_available() {
        let svg = render(&["A & B", "C"], &LayoutConfig::default(), &BoxGlyphs::default());
        assert!(!svg.contains("<text"));
        assert!(svg.contains("<title>A &amp; B</title>"));
    }

    #[test]
    fn text_elements_when_outlining_disabled() {
        let config = LayoutConfig {
            outline_text_for_svg: false,
            ..LayoutConfig::default()
        };
        let svg = render(&["A", "B"], &config, &BoxGlyphs::default());
        assert!(svg.contains(">A</text>"));
        assert!(svg.contains(">Red Line (1999-2024)</text>"));
    }

    #[test]
    fn line_outline_drawn_under_line() {
        let config = LayoutConfig {
            line_outline_enabled: true,
            ..LayoutConfig::default()
        };
        let svg = render(&["A", "B"], &config, &HeuristicMeasurer);
        let outline = svg.find("stroke-width=\"22.00\"").unwrap();
        let line = svg.find("stroke-width=\"16.00\"").unwrap();
        assert!(outline < line);
    }

    #[test]
    fn path_flips_y() {
        let d = segments_to_path(
            &[
                PathSegment::MoveTo(1.0, 10.0),
                PathSegment::LineTo(2.0, 20.0),
                PathSegment::Close,
            ],
            100.0,
        );
        assert_eq!(d, "M 1.00 90.00 L 2.00 80.00 Z");
    }

    #[cfg(feature = "png")]
    #[test]
    fn rasterizes_rendered_svg() {
        let svg = render(&["A", "B"], &LayoutConfig::default(), &HeuristicMeasurer);
        let png = rasterize_png(&svg).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(rasterize_png("<svg").is_err());
    }
}
