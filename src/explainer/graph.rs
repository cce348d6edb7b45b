use kurbo::Shape;

use crate::{
    composition::model::PathStyle,
    explainer::{
        mobject::{Dir, Mobject, Placeable, TextMetrics},
        space::Space,
    },
    finance::format::decimal,
    foundation::core::{BezPath, Point, Rect, Vec2},
    foundation::error::{ReelError, ReelResult},
};

/// Half-length of a tick mark in scene units.
const TICK_HALF_UNITS: f64 = 0.1;
const TICK_LABEL_FONT: f64 = 36.0;
const AXIS_LABEL_FONT: f64 = 24.0;
const AXIS_STROKE: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
/// `[min, max]` with tick spacing `step`.
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, step: f64) -> ReelResult<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) || max <= min || step <= 0.0
        {
            return Err(ReelError::validation(format!(
                "invalid axis range [{min}, {max}] step {step}"
            )));
        }
        Ok(Self { min, max, step })
    }

    /// Tick values strictly above `min`, up to and including `max`.
    pub fn ticks(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut k = 1u32;
        loop {
            let v = self.min + f64::from(k) * self.step;
            if v > self.max + self.step * 1e-9 {
                return out;
            }
            out.push(v);
            k += 1;
        }
    }

    fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Smallest of `1, 2, 2.5, 5 x 10^k` (or `1, 2, 5 x 10^k` when `integral`) not below `raw`.
pub fn nice_step(raw: f64, integral: bool) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let mantissas: &[f64] = if integral {
        &[1.0, 2.0, 5.0, 10.0]
    } else {
        &[1.0, 2.0, 2.5, 5.0, 10.0]
    };
    let mag = 10f64.powf(raw.log10().floor());
    let step = mantissas
        .iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw * (1.0 - 1e-12))
        .unwrap_or(10.0 * mag);
    if integral { step.max(1.0) } else { step }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Data-to-canvas mapping of a pair of axes.
pub struct Axes {
    /// Canvas position of `(x.min, y.min)`.
    origin: Point,
    x_unit: f64,
    y_unit: f64,
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Axes {
    /// Axes `x_len` by `y_len` pixels, centred on `center`.
    pub fn centered(center: Point, x: AxisRange, y: AxisRange, x_len: f64, y_len: f64) -> Self {
        Self {
            origin: Point::new(center.x - x_len / 2.0, center.y + y_len / 2.0),
            x_unit: x_len / x.span(),
            y_unit: y_len / y.span(),
            x,
            y,
        }
    }

    pub fn coords_to_point(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.origin.x + (x - self.x.min) * self.x_unit,
            self.origin.y - (y - self.y.min) * self.y_unit,
        )
    }

    /// The x axis line, the y axis line and every tick, as one path.
    pub fn axis_path(&self, tick_half_px: f64) -> BezPath {
        let x_cross = 0f64.clamp(self.x.min, self.x.max);
        let y_cross = 0f64.clamp(self.y.min, self.y.max);

        let mut p = BezPath::new();
        p.move_to(self.coords_to_point(self.x.min, y_cross));
        p.line_to(self.coords_to_point(self.x.max, y_cross));
        p.move_to(self.coords_to_point(x_cross, self.y.min));
        p.line_to(self.coords_to_point(x_cross, self.y.max));
        for v in self.x.ticks() {
            let c = self.coords_to_point(v, y_cross);
            p.move_to((c.x, c.y - tick_half_px));
            p.line_to((c.x, c.y + tick_half_px));
        }
        for v in self.y.ticks() {
            let c = self.coords_to_point(x_cross, v);
            p.move_to((c.x - tick_half_px, c.y));
            p.line_to((c.x + tick_half_px, c.y));
        }
        p
    }

    fn x_axis_line(&self) -> Rect {
        let y_cross = 0f64.clamp(self.y.min, self.y.max);
        Rect::from_points(
            self.coords_to_point(self.x.min, y_cross),
            self.coords_to_point(self.x.max, y_cross),
        )
    }

    fn y_axis_line(&self) -> Rect {
        let x_cross = 0f64.clamp(self.x.min, self.x.max);
        Rect::from_points(
            self.coords_to_point(x_cross, self.y.min),
            self.coords_to_point(x_cross, self.y.max),
        )
    }

    fn scale_about(&mut self, factor: f64, pivot: Point) {
        self.origin = pivot + (self.origin - pivot) * factor;
        self.x_unit *= factor;
        self.y_unit *= factor;
    }

    fn shift(&mut self, by: Vec2) {
        self.origin += by;
    }
}

/// Axes with their drawn parts: axis path, tick labels and the two axis titles.
pub struct AxesGroup {
    pub axes: Axes,
    pub lines: Mobject,
    pub x_numbers: Vec<Mobject>,
    pub y_numbers: Vec<Mobject>,
    pub x_label: Mobject,
    pub y_label: Mobject,
}

#[derive(Clone, Debug)]
pub struct AxesSpec<'a> {
    pub x: AxisRange,
    pub y: AxisRange,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub color: [u8; 4],
}

impl AxesGroup {
    /// Lay out full-size axes around the frame centre: `frame_width - 2` by `FRAME_HEIGHT - 2`
    /// units, tick labels below and left of their ticks, axis titles beyond the labels.
    pub fn build(
        space: &Space,
        spec: &AxesSpec<'_>,
        metrics: &mut dyn TextMetrics,
    ) -> ReelResult<Self> {
        let axes = Axes::centered(
            space.center(),
            spec.x,
            spec.y,
            space.units_to_px(space.frame_width() - 2.0),
            space.units_to_px(Space::FRAME_HEIGHT - 2.0),
        );
        let tick_half = space.units_to_px(TICK_HALF_UNITS);
        let buff = space.units_to_px(Space::NEXT_TO_BUFF);
        let lines = Mobject::path(
            "axes",
            axes.axis_path(tick_half),
            PathStyle::Stroke {
                width_px: space.stroke_px(AXIS_STROKE),
            },
            spec.color,
        )?;

        let number_px = space.font_px(TICK_LABEL_FONT);
        let y_cross = 0f64.clamp(spec.y.min, spec.y.max);
        let x_cross = 0f64.clamp(spec.x.min, spec.x.max);
        let mut x_numbers = Vec::new();
        for v in spec.x.ticks() {
            let text = decimal(v, 2);
            let mut m =
                Mobject::text(format!("x-{text}"), text, number_px, spec.color, metrics)?;
            let tick = axes.coords_to_point(v, y_cross);
            m.next_to(point_rect(tick), Dir::Down, buff);
            x_numbers.push(m);
        }
        let mut y_numbers = Vec::new();
        for v in spec.y.ticks() {
            let text = decimal(v, 2);
            let mut m =
                Mobject::text(format!("y-{text}"), text, number_px, spec.color, metrics)?;
            let tick = axes.coords_to_point(x_cross, v);
            m.next_to(point_rect(tick), Dir::Left, buff);
            y_numbers.push(m);
        }

        let label_px = space.font_px(AXIS_LABEL_FONT);
        let mut x_label = Mobject::text("x-label", spec.x_label, label_px, spec.color, metrics)?;
        let x_axis = union_with(axes.x_axis_line().inflate(0.0, tick_half), &x_numbers);
        x_label.next_to(x_axis, Dir::Down, buff);

        let mut y_label = Mobject::text("y-label", spec.y_label, label_px, spec.color, metrics)?;
        let y_axis = union_with(axes.y_axis_line().inflate(tick_half, 0.0), &y_numbers);
        y_label.next_to(y_axis, Dir::Left, buff);
        // Turned after placement, about its own centre, to read bottom to top.
        let y_label = y_label.rotated(-std::f64::consts::FRAC_PI_2);

        Ok(Self {
            axes,
            lines,
            x_numbers,
            y_numbers,
            x_label,
            y_label,
        })
    }

    pub fn scale_about(&mut self, factor: f64, pivot: Point) {
        self.axes.scale_about(factor, pivot);
        for m in self.parts_mut() {
            m.scale_about(factor, pivot);
        }
    }

    fn parts_mut(&mut self) -> impl Iterator<Item = &mut Mobject> {
        std::iter::once(&mut self.lines)
            .chain(self.x_numbers.iter_mut())
            .chain(self.y_numbers.iter_mut())
            .chain(std::iter::once(&mut self.x_label))
            .chain(std::iter::once(&mut self.y_label))
    }

    fn parts(&self) -> impl Iterator<Item = &Mobject> {
        std::iter::once(&self.lines)
            .chain(self.x_numbers.iter())
            .chain(self.y_numbers.iter())
            .chain(std::iter::once(&self.x_label))
            .chain(std::iter::once(&self.y_label))
    }

    /// Every drawable part, axis path first.
    pub fn into_mobjects(self) -> Vec<Mobject> {
        let mut out = vec![self.lines];
        out.extend(self.x_numbers);
        out.extend(self.y_numbers);
        out.push(self.x_label);
        out.push(self.y_label);
        out
    }
}

impl Placeable for AxesGroup {
    fn bbox(&self) -> Rect {
        self.parts()
            .map(Placeable::bbox)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    fn shift(&mut self, by: Vec2) {
        self.axes.shift(by);
        for m in self.parts_mut() {
            m.shift(by);
        }
    }
}

fn point_rect(p: Point) -> Rect {
    Rect::from_points(p, p)
}

fn union_with(r: Rect, items: &[Mobject]) -> Rect {
    items.iter().fold(r, |acc, m| acc.union(m.bbox()))
}

/// Straight segments through `points`.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return p;
    };
    p.move_to(*first);
    if rest.is_empty() {
        p.line_to(*first);
    }
    for q in rest {
        p.line_to(*q);
    }
    p
}

/// Smooth curve through every point, as cubic Béziers from a Catmull-Rom spline.
///
/// The tangent at each interior point is parallel to the chord between its neighbours; the ends
/// use the one-sided chord.
pub fn smooth_path_through(points: &[Point]) -> BezPath {
    if points.len() < 3 {
        return polyline(points);
    }
    let mut p = BezPath::new();
    p.move_to(points[0]);
    let last = points.len() - 1;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];
        let c1 = p1 + (p2 - p0) / 6.0;
        let c2 = p2 - (p3 - p1) / 6.0;
        p.curve_to(c1, c2, p2);
    }
    p
}

/// Filled disc.
pub fn dot(center: Point, radius_px: f64) -> BezPath {
    kurbo::Circle::new(center, radius_px).to_path(0.01)
}

#[cfg(test)]
#[path = "../../tests/unit/explainer/graph.rs"]
mod tests;
