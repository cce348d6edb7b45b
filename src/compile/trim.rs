use kurbo::{
    BezPath, CubicBez, Line, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point, QuadBez,
};

/// Accuracy used for arc-length measurement, in pixels.
pub(crate) const ARCLEN_ACCURACY: f64 = 1e-3;

/// Total arc length of `path`, including implicit close segments.
pub fn path_length(path: &BezPath) -> f64 {
    let mut total = 0.0;
    walk_segments(path, |step| {
        if let Step::Segment { seg, .. } = step {
            total += seg.arclen(ARCLEN_ACCURACY);
        }
        true
    });
    total
}

/// Leading portion of `path` covering `fraction` of its arc length.
///
/// `total_length` must be the value returned by [`path_length`] for the same path. Subpath breaks
/// are kept, so a partially drawn axis with tick marks shows whole ticks up to the cut.
pub fn trim_path_to_fraction(path: &BezPath, fraction: f64, total_length: f64) -> BezPath {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if fraction >= 1.0 {
        return path.clone();
    }

    let mut out = BezPath::new();
    let mut budget = total_length * fraction;
    if budget <= 0.0 {
        return out;
    }

    walk_segments(path, |step| match step {
        Step::MoveTo(p) => {
            out.move_to(p);
            true
        }
        Step::Segment { seg, closes } => {
            let len = seg.arclen(ARCLEN_ACCURACY);
            if len <= budget {
                budget -= len;
                if closes {
                    out.close_path();
                } else {
                    push_seg(&mut out, seg);
                }
                return true;
            }
            let t = seg.inv_arclen(budget, ARCLEN_ACCURACY);
            push_seg(&mut out, seg.subsegment(0.0..t));
            false
        }
    });
    out
}

enum Step {
    MoveTo(Point),
    Segment { seg: PathSeg, closes: bool },
}

/// Visit path elements as explicit segments; `f` returns `false` to stop.
fn walk_segments(path: &BezPath, mut f: impl FnMut(Step) -> bool) {
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    for el in path.elements() {
        let (seg, closes) = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                last = p;
                if !f(Step::MoveTo(p)) {
                    return;
                }
                continue;
            }
            PathEl::LineTo(p) => (PathSeg::Line(Line::new(last, p)), false),
            PathEl::QuadTo(p1, p2) => (PathSeg::Quad(QuadBez::new(last, p1, p2)), false),
            PathEl::CurveTo(p1, p2, p3) => {
                (PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)), false)
            }
            PathEl::ClosePath => (PathSeg::Line(Line::new(last, start)), true),
        };
        last = seg.end();
        if !f(Step::Segment { seg, closes }) {
            return;
        }
    }
}

fn push_seg(out: &mut BezPath, seg: PathSeg) {
    match seg {
        PathSeg::Line(l) => out.line_to(l.p1),
        PathSeg::Quad(q) => out.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => out.curve_to(c.p1, c.p2, c.p3),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/trim.rs"]
mod tests;
