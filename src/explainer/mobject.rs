use kurbo::Shape;

use crate::{
    composition::model::PathStyle,
    foundation::core::{Affine, BezPath, Point, Rect, Vec2},
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Screen direction used by the placement helpers.
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Text measurement used during layout.
///
/// Layout needs real extents to line rows up; the renderer shapes the same strings again with the
/// same font, so a [`crate::assets::store::TextLayoutEngine`] gives pixel-exact placement.
pub trait TextMetrics {
    /// Width and height in pixels of one unwrapped line.
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<(f64, f64)>;
}

impl TextMetrics for crate::assets::store::TextLayoutEngine {
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<(f64, f64)> {
        let layout = self.layout_plain(text, size_px, Default::default())?;
        Ok((f64::from(layout.width()), f64::from(layout.height())))
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Font-free estimate: fixed advance per character and a 1.2 line height.
pub struct ApproxMetrics;

impl TextMetrics for ApproxMetrics {
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<(f64, f64)> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let size = f64::from(size_px);
        let chars = text.chars().count() as f64;
        Ok((chars * 0.55 * size, 1.2 * size))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text {
        text: String,
        size_px: f32,
        color: [u8; 4],
    },
    /// Path in local pixels, centred on the origin.
    Path {
        path: BezPath,
        style: PathStyle,
        color: [u8; 4],
    },
}

#[derive(Clone, Debug, PartialEq)]
/// A visual object with a position on the canvas, ready to be added to a stage.
pub struct Mobject {
    pub name: String,
    pub content: Content,
    /// Canvas position of the bounds centre.
    pub center: Point,
    /// Unrotated width and height in pixels.
    pub size: Vec2,
    /// Rotation about the centre in radians (pixel space, positive is clockwise).
    pub rotation: f64,
}

impl Mobject {
    pub fn text(
        name: impl Into<String>,
        text: impl Into<String>,
        size_px: f32,
        color: [u8; 4],
        metrics: &mut dyn TextMetrics,
    ) -> ReelResult<Self> {
        let text = text.into();
        let (w, h) = metrics.measure(&text, size_px)?;
        Ok(Self {
            name: name.into(),
            content: Content::Text {
                text,
                size_px,
                color,
            },
            center: Point::ZERO,
            size: Vec2::new(w, h),
            rotation: 0.0,
        })
    }

    /// Wrap a path given in canvas pixels; the object is centred where the path already is.
    pub fn path(
        name: impl Into<String>,
        path: BezPath,
        style: PathStyle,
        color: [u8; 4],
    ) -> ReelResult<Self> {
        if path.elements().is_empty() {
            return Err(ReelError::validation("mobject path must not be empty"));
        }
        let bounds = stroke_bounds(&path, style);
        let center = bounds.center();
        let mut local = path;
        local.apply_affine(Affine::translate(-center.to_vec2()));
        Ok(Self {
            name: name.into(),
            content: Content::Path {
                path: local,
                style,
                color,
            },
            center,
            size: Vec2::new(bounds.width(), bounds.height()),
            rotation: 0.0,
        })
    }

    pub fn rotated(mut self, radians: f64) -> Self {
        self.rotation += radians;
        self
    }

    /// Scale about `pivot`. Text grows with the factor; stroke widths stay as they are.
    pub fn scale_about(&mut self, factor: f64, pivot: Point) {
        self.center = pivot + (self.center - pivot) * factor;
        match &mut self.content {
            Content::Text { size_px, .. } => {
                *size_px = (f64::from(*size_px) * factor) as f32;
                self.size *= factor;
            }
            Content::Path { path, style, .. } => {
                path.apply_affine(Affine::scale(factor));
                let b = stroke_bounds(path, *style);
                self.size = Vec2::new(b.width(), b.height());
            }
        }
    }

    /// Path content translated to canvas pixels, if this is a path.
    pub fn canvas_path(&self) -> Option<BezPath> {
        match &self.content {
            Content::Path { path, .. } => {
                let mut out = path.clone();
                out.apply_affine(
                    Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation),
                );
                Some(out)
            }
            Content::Text { .. } => None,
        }
    }
}

fn stroke_bounds(path: &BezPath, style: PathStyle) -> Rect {
    let bb = path.bounding_box();
    match style {
        PathStyle::Fill => bb,
        PathStyle::Stroke { width_px } => bb.inflate(width_px / 2.0, width_px / 2.0),
    }
}

/// Bounds-based placement shared by single objects and groups.
pub trait Placeable {
    fn bbox(&self) -> Rect;
    fn shift(&mut self, by: Vec2);

    fn move_to(&mut self, p: Point) {
        let c = self.bbox().center();
        self.shift(p - c);
    }

    /// Place beside `target` in `dir`, `buff` pixels away, centred on the other axis.
    fn next_to(&mut self, target: Rect, dir: Dir, buff: f64) {
        let b = self.bbox();
        let d = match dir {
            Dir::Up => Vec2::new(target.center().x - b.center().x, target.y0 - buff - b.y1),
            Dir::Down => Vec2::new(target.center().x - b.center().x, target.y1 + buff - b.y0),
            Dir::Left => Vec2::new(target.x0 - buff - b.x1, target.center().y - b.center().y),
            Dir::Right => Vec2::new(target.x1 + buff - b.x0, target.center().y - b.center().y),
        };
        self.shift(d);
    }

    /// Move so that the `edge` side lines up with the same side of `target`.
    fn align_to(&mut self, target: Rect, edge: Dir) {
        let b = self.bbox();
        let d = match edge {
            Dir::Up => Vec2::new(0.0, target.y0 - b.y0),
            Dir::Down => Vec2::new(0.0, target.y1 - b.y1),
            Dir::Left => Vec2::new(target.x0 - b.x0, 0.0),
            Dir::Right => Vec2::new(target.x1 - b.x1, 0.0),
        };
        self.shift(d);
    }

    /// Push against the `edge` side of `frame`, `buff` pixels inside it.
    fn to_edge(&mut self, frame: Rect, edge: Dir, buff: f64) {
        let b = self.bbox();
        let d = match edge {
            Dir::Up => Vec2::new(0.0, frame.y0 + buff - b.y0),
            Dir::Down => Vec2::new(0.0, frame.y1 - buff - b.y1),
            Dir::Left => Vec2::new(frame.x0 + buff - b.x0, 0.0),
            Dir::Right => Vec2::new(frame.x1 - buff - b.x1, 0.0),
        };
        self.shift(d);
    }
}

impl Placeable for Mobject {
    fn bbox(&self) -> Rect {
        let (s, c) = self.rotation.sin_cos();
        let w = (self.size.x * c).abs() + (self.size.y * s).abs();
        let h = (self.size.x * s).abs() + (self.size.y * c).abs();
        Rect::from_center_size(self.center, (w, h))
    }

    fn shift(&mut self, by: Vec2) {
        self.center += by;
    }
}

impl<P: Placeable> Placeable for [P] {
    fn bbox(&self) -> Rect {
        let mut rects = self.iter().map(Placeable::bbox);
        let Some(first) = rects.next() else {
            return Rect::ZERO;
        };
        rects.fold(first, |acc, r| acc.union(r))
    }

    fn shift(&mut self, by: Vec2) {
        for it in self.iter_mut() {
            it.shift(by);
        }
    }
}

impl<P: Placeable> Placeable for Vec<P> {
    fn bbox(&self) -> Rect {
        self.as_slice().bbox()
    }

    fn shift(&mut self, by: Vec2) {
        self.as_mut_slice().shift(by);
    }
}

/// Stack `items` top to bottom starting at the first item's position, `buff` pixels apart.
///
/// With `align_left` every item shares the first item's left edge; otherwise items are centred
/// on it.
pub fn arrange_down<P: Placeable>(items: &mut [P], buff: f64, align_left: bool) {
    for i in 1..items.len() {
        let (done, rest) = items.split_at_mut(i);
        let prev = done[i - 1].bbox();
        let item = &mut rest[0];
        item.next_to(prev, Dir::Down, buff);
        if align_left {
            item.align_to(prev, Dir::Left);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explainer/mobject.rs"]
mod tests;
