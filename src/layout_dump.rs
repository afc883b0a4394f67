use crate::ir::Line;
use crate::layout::{PlacedText, PlacementResult};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub system: String,
    pub id: String,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub line_left: f32,
    pub line_right: f32,
    pub spacing: f32,
    pub baseline_y: f32,
    pub extra_left: f32,
    pub extra_right: f32,
    pub padding_fell_back: bool,
    pub stations: Vec<StationDump>,
    pub footer: Option<TextDump>,
    pub title: Option<TextDump>,
    pub title_outline_left: Option<f32>,
    pub subtitle: Option<TextDump>,
    pub subtitle_outline_left: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct StationDump {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub label: TextDump,
}

#[derive(Debug, Serialize)]
pub struct TextDump {
    pub text: String,
    pub font: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    /// `[left, top, right, bottom]`, y-up.
    pub bounds: [f32; 4],
}

impl TextDump {
    fn from_placed(placed: &PlacedText) -> Self {
        let element = &placed.element;
        let bounds = placed.bounds;
        TextDump {
            text: element.text.clone(),
            font: element.style.font_family.clone(),
            font_size: element.style.font_size,
            x: element.placement.x,
            y: element.placement.y,
            rotation: element.placement.rotation,
            bounds: [bounds.left, bounds.top, bounds.right, bounds.bottom],
        }
    }
}

impl LayoutDump {
    pub fn from_placement(result: &PlacementResult, line: &Line) -> Self {
        let stations = line
            .stations
            .iter()
            .zip(&result.stations.markers)
            .zip(&result.stations.labels)
            .map(|((name, marker), label)| StationDump {
                name: name.clone(),
                x: marker.x,
                y: marker.y,
                radius: marker.radius,
                label: TextDump::from_placed(label),
            })
            .collect();

        LayoutDump {
            system: line.system.clone(),
            id: line.id.clone(),
            name: line.name.clone(),
            width: result.canvas.width(),
            height: result.canvas_height(),
            line_left: result.line_left(),
            line_right: result.line_right(),
            spacing: result.spacing(),
            baseline_y: result.stations.baseline_y,
            extra_left: result.padding.extras.extra_left,
            extra_right: result.padding.extras.extra_right,
            padding_fell_back: result.padding.fell_back,
            stations,
            footer: result.footer.as_ref().map(TextDump::from_placed),
            title: result.titles.title.as_ref().map(TextDump::from_placed),
            title_outline_left: result.titles.title_outline_left,
            subtitle: result.titles.subtitle.as_ref().map(TextDump::from_placed),
            subtitle_outline_left: result.subtitle_outline_left(),
        }
    }
}

pub fn write_layout_dump(path: &Path, result: &PlacementResult, line: &Line) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_placement(result, line);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::sample_line;
    use crate::layout::compute_placement;
    use crate::text_metrics::HeuristicMeasurer;

    #[test]
    fn dump_lists_every_station() {
        let line = sample_line(&["Union", "King", "Queen"]);
        let result = compute_placement(&line, &LayoutConfig::default(), &HeuristicMeasurer).unwrap();
        let dump = LayoutDump::from_placement(&result, &line);
        assert_eq!(dump.stations.len(), 3);
        assert_eq!(dump.stations[1].name, "King");
        assert_eq!(dump.stations[1].label.text, "King");
        assert_eq!(dump.stations[2].x, dump.line_right);

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["name"], "Red Line");
        assert!(json["title"]["bounds"].is_array());
    }
}
