use crate::error::LayoutError;
use crate::ir::Rgb;

pub const BACKGROUND_NAME: &str = "bg-white";

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundFill {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
}

impl BackgroundFill {
    fn new(width: f32, height: f32, color: Rgb) -> Result<Self, LayoutError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !(valid(width) && valid(height)) {
            return Err(LayoutError::Background { width, height });
        }
        Ok(Self {
            name: BACKGROUND_NAME.to_string(),
            width,
            height,
            color,
        })
    }
}

/// Drawing surface of one diagram. Holds exactly one background fill, kept in
/// step with the canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: f32,
    height: f32,
    fills: Vec<BackgroundFill>,
}

impl Canvas {
    pub fn new(width: f32, height: f32, background: Rgb) -> Result<Self, LayoutError> {
        let fill = BackgroundFill::new(width, height, background)?;
        Ok(Self {
            width,
            height,
            fills: vec![fill],
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> &BackgroundFill {
        &self.fills[0]
    }

    pub fn background_count(&self) -> usize {
        self.fills.len()
    }

    /// Resizes the height (width is fixed) and rebuilds the background. On
    /// failure the previous size and background are kept.
    pub fn resize_height(&mut self, height: f32) -> Result<(), LayoutError> {
        if !(height.is_finite() && height > 0.0) {
            return Err(LayoutError::CanvasResize { height });
        }
        let color = self.background().color;
        let Some(index) = self.fills.iter().position(|f| f.name == BACKGROUND_NAME) else {
            return Err(LayoutError::CanvasResize { height });
        };
        let previous = self.fills.remove(index);
        match BackgroundFill::new(self.width, height, color) {
            Ok(fill) => {
                self.fills.insert(0, fill);
                self.height = height;
                Ok(())
            }
            Err(_) => {
                self.fills.insert(index, previous);
                Err(LayoutError::CanvasResize { height })
            }
        }
    }
}
