use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Zero-based frame on the reel timeline.
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Frames `start..end`, end exclusive.
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex,
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> ReelResult<Self> {
        if end < start {
            return Err(ReelError::validation(format!(
                "frame range ends at {} before it starts at {}",
                end.0, start.0
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0 - self.start.0
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        (self.start..self.end).contains(&f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Frame rate as the fraction `num / den` frames per second.
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if num == 0 || den == 0 {
            return Err(ReelError::validation(format!("fps {num}/{den} must be positive")));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Nearest frame to `secs`. Stage times are sums of decimal seconds, so flooring would lose a
    /// frame to float noise (`0.1 + 0.2` seconds at 30 fps is frame 9, not 8).
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output size in pixels.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Width over height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// RGBA8 with colour channels already multiplied by alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self::from_straight([0; 4])
    }

    pub fn from_straight([r, g, b, a]: [u8; 4]) -> Self {
        let premul = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Self {
            r: premul(r),
            g: premul(g),
            b: premul(b),
            a,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Placement of a clip's local content on the canvas.
///
/// Applied as `translate * anchor * rotate * scale * anchor⁻¹`, so rotation and scale pivot on
/// `anchor` in local space.
pub struct Transform2D {
    pub translate: Vec2,
    pub rotation_rad: f64,
    pub scale: Vec2,
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn to_affine(self) -> Affine {
        Affine::translate(self.translate + self.anchor)
            * Affine::rotate(self.rotation_rad)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.anchor)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
