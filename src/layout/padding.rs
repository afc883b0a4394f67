use crate::config::LayoutConfig;
use crate::text_metrics::{TextMeasure, TextStyle};

use super::stations::align_label_left;
use super::types::{PaddingDecision, PaddingExtras};

/// Shortest baseline the padding may leave; anything shorter discards it.
pub const MIN_LINE_LENGTH: f32 = 200.0;

#[derive(Debug, Clone)]
pub struct PaddingInput<'a> {
    pub base_padding: f32,
    pub canvas_width: f32,
    pub stations: &'a [String],
    pub label_style: TextStyle,
    pub rotation: f32,
    pub baseline_y: f32,
    pub x_nudge: f32,
    pub auto_pad: bool,
    pub check_left: bool,
    pub left_margin: f32,
    pub right_margin: f32,
    pub max_extra: f32,
}

impl<'a> PaddingInput<'a> {
    pub fn new(stations: &'a [String], config: &LayoutConfig) -> Self {
        Self {
            base_padding: config.h_padding,
            canvas_width: config.artboard_width,
            stations,
            label_style: TextStyle::new(config.font_label_name.clone(), config.font_size),
            rotation: config.label_rotation(),
            baseline_y: config.baseline_y,
            x_nudge: config.label_x_nudge,
            auto_pad: config.auto_pad_terminals,
            check_left: config.pad_check_left,
            left_margin: config.pad_left_margin,
            right_margin: config.pad_right_margin,
            max_extra: config.pad_max_extra,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overhang {
    pub left: f32,
    pub right: f32,
}

/// How far a label placed at `anchor_x` reaches past the anchor on each side.
pub fn measure_label_overhang(
    measurer: &dyn TextMeasure,
    text: &str,
    anchor_x: f32,
    input: &PaddingInput<'_>,
) -> Overhang {
    let element = align_label_left(
        measurer,
        text,
        &input.label_style,
        anchor_x,
        input.baseline_y,
        input.rotation,
        input.x_nudge,
    );
    // The vertical clearance step is a pure vertical shift, so horizontal
    // extents are final here.
    let bounds = measurer.measure(&element.text, &element.style, element.placement);
    Overhang {
        left: (anchor_x - bounds.left).max(0.0),
        right: (bounds.right - anchor_x).max(0.0),
    }
}

fn clamp_extra(value: f32, max_extra: f32) -> f32 {
    value.max(0.0).min(max_extra.max(0.0))
}

/// Extra padding so the terminal labels stay on the canvas. Only the right
/// terminal is measured unless `check_left` is set.
pub fn terminal_extra_padding(measurer: &dyn TextMeasure, input: &PaddingInput<'_>) -> PaddingExtras {
    let (Some(first), Some(last)) = (input.stations.first(), input.stations.last()) else {
        return PaddingExtras::default();
    };
    let line_left = input.base_padding;
    let line_right = input.canvas_width - input.base_padding;

    let right = measure_label_overhang(measurer, last, line_right, input).right;
    let extra_right = clamp_extra(right + input.right_margin - input.base_padding, input.max_extra);

    let extra_left = if input.check_left {
        let left = measure_label_overhang(measurer, first, line_left, input).left;
        clamp_extra(left + input.left_margin - input.base_padding, input.max_extra)
    } else {
        0.0
    };

    PaddingExtras {
        extra_left,
        extra_right,
    }
}

pub fn resolve_padding(measurer: &dyn TextMeasure, input: &PaddingInput<'_>) -> PaddingDecision {
    let base = input.base_padding;
    let unpadded = PaddingDecision {
        line_left: base,
        line_right: input.canvas_width - base,
        extras: PaddingExtras::default(),
        fell_back: false,
    };
    if !input.auto_pad {
        return unpadded;
    }

    let extras = terminal_extra_padding(measurer, input);
    let line_left = base + extras.extra_left;
    let line_right = input.canvas_width - (base + extras.extra_right);
    if line_right - line_left < MIN_LINE_LENGTH {
        tracing::debug!(
            extra_left = extras.extra_left,
            extra_right = extras.extra_right,
            "terminal padding collapses the line, reverting to base padding"
        );
        return PaddingDecision {
            fell_back: true,
            ..unpadded
        };
    }
    tracing::debug!(
        extra_left = extras.extra_left,
        extra_right = extras.extra_right,
        "terminal padding resolved"
    );
    PaddingDecision {
        line_left,
        line_right,
        extras,
        fell_back: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::fake::BoxGlyphs;
    use crate::text_metrics::{LineMetrics, HeuristicMeasurer};
    use std::cell::RefCell;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Every label is `width` wide and 10 high.
    struct FixedWidth {
        width: f32,
    }

    impl TextMeasure for FixedWidth {
        fn line_metrics(&self, _style: &TextStyle) -> LineMetrics {
            LineMetrics {
                ascent: 8.0,
                descent: 2.0,
            }
        }

        fn advance_width(&self, _text: &str, _style: &TextStyle) -> f32 {
            self.width
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: RefCell<Vec<String>>,
    }

    impl TextMeasure for Recording {
        fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
            HeuristicMeasurer.line_metrics(style)
        }

        fn advance_width(&self, text: &str, style: &TextStyle) -> f32 {
            self.seen.borrow_mut().push(text.to_string());
            HeuristicMeasurer.advance_width(text, style)
        }
    }

    fn unrotated(stations: &[String]) -> PaddingInput<'_> {
        let mut input = PaddingInput::new(stations, &LayoutConfig::default());
        input.rotation = 0.0;
        input
    }

    #[test]
    fn right_overhang_drives_extra_padding() {
        let stations = names(&["First", "Last"]);
        let input = unrotated(&stations);
        // label spans [anchor - 6, anchor + 194]
        let extras = terminal_extra_padding(&FixedWidth { width: 200.0 }, &input);
        assert!((extras.extra_right - (194.0 + 8.0 - 90.0)).abs() < 1e-3);
        assert_eq!(extras.extra_left, 0.0);
    }

    #[test]
    fn small_overhang_needs_no_padding() {
        let stations = names(&["A", "B"]);
        let input = unrotated(&stations);
        let extras = terminal_extra_padding(&FixedWidth { width: 20.0 }, &input);
        assert_eq!(extras, PaddingExtras::default());
    }

    #[test]
    fn extras_are_capped() {
        let stations = names(&["A", "B"]);
        let mut input = unrotated(&stations);
        input.check_left = true;
        input.x_nudge = -500.0;
        let extras = terminal_extra_padding(&FixedWidth { width: 900.0 }, &input);
        assert_eq!(extras.extra_right, 260.0);
        assert_eq!(extras.extra_left, 260.0);
    }

    #[test]
    fn left_terminal_checked_only_on_request() {
        let stations = names(&["Westmost", "Middle", "Eastmost"]);
        let mut input = PaddingInput::new(&stations, &LayoutConfig::default());

        let recording = Recording::default();
        terminal_extra_padding(&recording, &input);
        assert!(recording.seen.borrow().iter().all(|text| text == "Eastmost"));

        input.check_left = true;
        let recording = Recording::default();
        terminal_extra_padding(&recording, &input);
        let seen = recording.seen.borrow();
        assert!(seen.iter().any(|text| text == "Westmost"));
        assert!(!seen.iter().any(|text| text == "Middle"));
    }

    #[test]
    fn left_overhang_uses_left_margin() {
        let stations = names(&["A", "B"]);
        let mut input = unrotated(&stations);
        input.check_left = true;
        input.x_nudge = -120.0;
        input.left_margin = 4.0;
        let extras = terminal_extra_padding(&FixedWidth { width: 10.0 }, &input);
        assert!((extras.extra_left - (120.0 + 4.0 - 90.0)).abs() < 1e-3);
    }

    #[test]
    fn disabled_auto_pad_keeps_base_padding() {
        let stations = names(&["Alpha", "Beta", "Gamma"]);
        let mut input = PaddingInput::new(&stations, &LayoutConfig::default());
        input.auto_pad = false;
        let decision = resolve_padding(&FixedWidth { width: 5000.0 }, &input);
        assert_eq!(decision.line_left, 90.0);
        assert_eq!(decision.line_right, 1410.0);
        assert!(!decision.fell_back);
    }

    #[test]
    fn collapsing_padding_falls_back_to_base() {
        let stations = names(&["A", "Interminable Terminal"]);
        let mut input = unrotated(&stations);
        input.max_extra = 1300.0;
        let decision = resolve_padding(&FixedWidth { width: 2000.0 }, &input);
        assert!(decision.fell_back);
        assert_eq!(decision.line_left, 90.0);
        assert_eq!(decision.line_right, 1410.0);
        assert_eq!(decision.extras, PaddingExtras::default());
    }

    #[test]
    fn padding_is_deterministic() {
        let stations = names(&["Kipling", "Islington", "Royal York", "Old Mill"]);
        let mut input = PaddingInput::new(&stations, &LayoutConfig::default());
        input.check_left = true;
        let measurer = BoxGlyphs::default();
        let a = resolve_padding(&measurer, &input);
        let b = resolve_padding(&measurer, &input);
        assert_eq!(a, b);
        assert!(a.extras.extra_left >= 0.0 && a.extras.extra_left <= input.max_extra);
        assert!(a.extras.extra_right >= 0.0 && a.extras.extra_right <= input.max_extra);
    }
}
