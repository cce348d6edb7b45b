use crate::foundation::core::{Canvas, Point, Vec2};

/// Scene units: the frame is [`Space::FRAME_HEIGHT`] units tall, the origin is the frame centre and
/// `y` grows upward. All layout in the explainer is written in these units and converted to
/// canvas pixels here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Space {
    canvas: Canvas,
}

impl Space {
    pub const FRAME_HEIGHT: f64 = 8.0;
    /// Default gap between an object and the frame edge.
    pub const EDGE_BUFF: f64 = 0.5;
    /// Default gap between neighbouring objects.
    pub const NEXT_TO_BUFF: f64 = 0.25;

    /// Text pixel size per font-size point on a 720-pixel-tall canvas.
    const FONT_PX_PER_POINT_720: f64 = 0.95;

    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn frame_width(&self) -> f64 {
        Self::FRAME_HEIGHT * self.canvas.aspect()
    }

    pub fn px_per_unit(&self) -> f64 {
        f64::from(self.canvas.height) / Self::FRAME_HEIGHT
    }

    pub fn units_to_px(&self, units: f64) -> f64 {
        units * self.px_per_unit()
    }

    /// Canvas pixel position of scene point `(x, y)`.
    pub fn point(&self, x: f64, y: f64) -> Point {
        let c = self.center();
        Point::new(c.x + self.units_to_px(x), c.y - self.units_to_px(y))
    }

    /// Pixel offset for a scene-unit displacement (`y` up).
    pub fn offset(&self, dx: f64, dy: f64) -> Vec2 {
        Vec2::new(self.units_to_px(dx), -self.units_to_px(dy))
    }

    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.canvas.width) / 2.0,
            f64::from(self.canvas.height) / 2.0,
        )
    }

    /// Pixel size for a font-size in points, scaled with canvas height.
    pub fn font_px(&self, font_size: f64) -> f32 {
        (font_size * Self::FONT_PX_PER_POINT_720 * f64::from(self.canvas.height) / 720.0) as f32
    }

    /// Pixel stroke width for a stroke weight where `4.0` is a regular line.
    pub fn stroke_px(&self, weight: f64) -> f64 {
        weight * 0.01 * self.px_per_unit()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explainer/space.rs"]
mod tests;
