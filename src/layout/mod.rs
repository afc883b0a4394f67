//! Measurement-driven layout of a single line diagram.
//!
//! The pipeline runs in a fixed order, each stage consuming the previous
//! stage's output: terminal padding, station markers and labels, footer, canvas
//! height, then title and subtitle anchored from the resized top edge.

mod height;
mod padding;
mod snap;
mod stations;
pub(crate) mod types;

pub use height::{HeightInput, max_text_top, needed_height, resolve_canvas_height};
pub use padding::{
    MIN_LINE_LENGTH, Overhang, PaddingInput, measure_label_overhang, resolve_padding,
    terminal_extra_padding,
};
pub use snap::{SnappedText, outline_left, snap_outline_left};
pub use stations::{StationLayoutInput, layout_stations, place_label, station_anchors};
pub use types::*;

use crate::canvas::Canvas;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::ir::Line;
use crate::text_metrics::{Placement, TextMeasure, TextStyle};

pub fn compute_placement(
    line: &Line,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> Result<PlacementResult, LayoutError> {
    if line.stations.len() < 2 {
        return Err(LayoutError::TooFewStations(line.stations.len()));
    }

    let padding = resolve_padding(measurer, &PaddingInput::new(&line.stations, config));
    let stations = layout_stations(
        measurer,
        &StationLayoutInput::new(&line.stations, &padding, config),
    )?;
    let footer = place_footer(measurer, config);

    let mut canvas = Canvas::new(
        config.artboard_width,
        config.artboard_height,
        config.color(&config.background_color),
    )?;
    let height_input = HeightInput::new(stations.labels.iter().chain(footer.iter()), config);
    resolve_canvas_height(&mut canvas, &height_input, config.auto_height)?;

    let titles = place_titles(measurer, line, config, canvas.height());

    Ok(PlacementResult {
        padding,
        stations,
        footer,
        canvas,
        titles,
    })
}

/// Footer centered on the canvas width, its top `FOOTER_BOTTOM_MARGIN` above
/// the bottom edge.
pub fn place_footer(measurer: &dyn TextMeasure, config: &LayoutConfig) -> Option<PlacedText> {
    if config.footer_text.is_empty() {
        return None;
    }
    let style = TextStyle::new(config.font_footer_name.clone(), config.footer_font_size);
    let element = TextElement::new(
        config.footer_text.clone(),
        style,
        Placement::new(0.0, config.footer_bottom_margin, 0.0),
    );
    let width = measurer
        .nominal_bounds(&element.text, &element.style, element.placement)
        .width();
    let element = element.translated((config.artboard_width - width) / 2.0, 0.0);
    let bounds = measurer.measure(&element.text, &element.style, element.placement);
    Some(PlacedText { element, bounds })
}

/// Title snapped to `TITLE_LEFT`; subtitle snapped to wherever the title's
/// outline actually landed, or to `SUBTITLE_LEFT` when there is no title.
pub fn place_titles(
    measurer: &dyn TextMeasure,
    line: &Line,
    config: &LayoutConfig,
    canvas_height: f32,
) -> TitleBlock {
    let title = config
        .draw_title
        .then(|| line.apply_template(&config.title_template))
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            let element = TextElement::new(
                text,
                TextStyle::new(config.font_title_name.clone(), config.title_font_size),
                Placement::new(config.title_left, canvas_height - config.title_top_from_top, 0.0),
            );
            snap_outline_left(measurer, &element, config.title_left)
        });
    let title_outline_left = title.as_ref().map(|snapped| snapped.outline_left);

    let subtitle = config
        .draw_subtitle
        .then(|| line.apply_template(&config.subtitle_template))
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            let element = TextElement::new(
                text,
                TextStyle::new(config.font_subtitle_name.clone(), config.subtitle_font_size),
                Placement::new(
                    config.subtitle_left,
                    canvas_height - config.subtitle_top_from_top,
                    0.0,
                ),
            );
            let target = title_outline_left.unwrap_or(config.subtitle_left);
            snap_outline_left(measurer, &element, target)
        });

    TitleBlock {
        title_outline_left,
        title: title.map(|snapped| snapped.placed),
        subtitle_outline_left: subtitle.as_ref().map(|snapped| snapped.outline_left),
        subtitle: subtitle.map(|snapped| snapped.placed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::sample_line;
    use crate::text_metrics::fake::BoxGlyphs;
    use crate::text_metrics::HeuristicMeasurer;

    #[test]
    fn unpadded_three_station_line() {
        let line = sample_line(&["Alpha", "Beta", "Gamma"]);
        let config = LayoutConfig {
            artboard_width: 1500.0,
            h_padding: 90.0,
            auto_pad_terminals: false,
            ..LayoutConfig::default()
        };
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        assert_eq!(result.line_left(), 90.0);
        assert_eq!(result.line_right(), 1410.0);
        assert_eq!(result.spacing(), 660.0);
        let anchors: Vec<f32> = result.stations.anchors().collect();
        assert_eq!(anchors, vec![90.0, 750.0, 1410.0]);
    }

    #[test]
    fn rejects_single_station() {
        let line = sample_line(&["Lonely"]);
        let err = compute_placement(&line, &LayoutConfig::default(), &HeuristicMeasurer).unwrap_err();
        assert!(matches!(err, LayoutError::TooFewStations(1)));
    }

    #[test]
    fn canvas_fits_labels_and_title_band() {
        let line = sample_line(&["Union", "St Andrew", "Osgoode", "Queen's Park", "Museum"]);
        let config = LayoutConfig::default();
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        let top = max_text_top(result.stations.labels.iter().chain(result.footer.iter()));
        let expected = config.min_height.max(top + config.title_band_reserve()).ceil();
        assert_eq!(result.canvas_height(), expected);
        assert!(result.canvas_height() >= config.min_height);
        assert_eq!(result.canvas.background_count(), 1);
        assert_eq!(result.canvas.background().height, result.canvas_height());
        // five labels, footer, title
        assert_eq!(result.texts().count(), 7);
    }

    #[test]
    fn title_hangs_from_resized_top() {
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig::default();
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        let title = result.titles.title.as_ref().unwrap();
        assert_eq!(title.element.text, "Red Line (1999-2024)");
        assert_eq!(
            title.element.placement.y,
            result.canvas_height() - config.title_top_from_top
        );
        assert!((result.titles.title_outline_left.unwrap() - config.title_left).abs() < 1e-3);
    }

    #[test]
    fn subtitle_follows_title_outline() {
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            draw_subtitle: true,
            subtitle_left: 40.0,
            ..LayoutConfig::default()
        };
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        let title_left = result.titles.title_outline_left.unwrap();
        let subtitle_left = result.subtitle_outline_left().unwrap();
        assert!((subtitle_left - title_left).abs() < 1e-3);
        assert_eq!(result.titles.subtitle.as_ref().unwrap().element.text, "Metro");
    }

    #[test]
    fn subtitle_without_title_uses_own_left() {
        let line = sample_line(&["A", "B"]);
        let config = LayoutConfig {
            draw_title: false,
            draw_subtitle: true,
            subtitle_left: 40.0,
            ..LayoutConfig::default()
        };
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        assert!(result.titles.title.is_none());
        assert!((result.subtitle_outline_left().unwrap() - 40.0).abs() < 1e-3);
        assert_eq!(result.canvas_height(), 220.0);
    }

    #[test]
    fn blank_template_draws_nothing() {
        let mut line = sample_line(&["A", "B"]);
        line.years.clear();
        let config = LayoutConfig {
            title_template: "{years}".to_string(),
            ..LayoutConfig::default()
        };
        let result = compute_placement(&line, &config, &BoxGlyphs::default()).unwrap();
        assert!(result.titles.title.is_none());
        assert!(result.titles.title_outline_left.is_none());
    }

    #[test]
    fn footer_is_centered() {
        let config = LayoutConfig {
            footer_text: "abcd".to_string(),
            footer_font_size: 10.0,
            ..LayoutConfig::default()
        };
        let footer = place_footer(&BoxGlyphs::default(), &config).unwrap();
        // nominal width 20 on a 1500 canvas
        assert!((footer.element.placement.x - 740.0).abs() < 1e-3);
        assert_eq!(footer.element.placement.y, 15.0);

        let config = LayoutConfig {
            footer_text: String::new(),
            ..config
        };
        assert!(place_footer(&BoxGlyphs::default(), &config).is_none());
    }

    #[test]
    fn fixed_height_when_auto_height_disabled() {
        let line = sample_line(&["A", "A very long station name indeed", "C"]);
        let config = LayoutConfig {
            auto_height: false,
            ..LayoutConfig::default()
        };
        let result = compute_placement(&line, &config, &HeuristicMeasurer).unwrap();
        assert_eq!(result.canvas_height(), 300.0);
    }
}
