use std::collections::{BTreeMap, HashSet};

use crate::{
    animation::anim::Anim,
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Pure-data description of a whole reel.
///
/// The explainer builds one through [`crate::Stage`]; it can be dumped to JSON and read back, and
/// [`crate::render_frame`] / [`crate::render_to_mp4`] turn it into pixels.
pub struct Composition {
    pub fps: Fps,
    pub canvas: Canvas,
    /// Length in frames; every clip ends at or before it.
    pub duration: FrameIndex,
    /// Straight-alpha colour under everything, also used to flatten frames for encoding.
    #[serde(default = "default_background_rgba8")]
    pub background_rgba8: [u8; 4],
    pub assets: BTreeMap<String, Asset>,
    /// Later tracks draw above earlier ones at equal z.
    pub tracks: Vec<Track>,
}

fn default_background_rgba8() -> [u8; 4] {
    [0, 0, 0, 255]
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub name: String,
    /// Added to every clip's `z_offset`.
    pub z_base: i32,
    pub clips: Vec<Clip>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One asset shown over a frame span.
pub struct Clip {
    /// Unique across the composition.
    pub id: String,
    /// Key into [`Composition::assets`].
    pub asset: String,
    /// Frames the clip is drawn on, end exclusive.
    pub range: FrameRange,
    pub props: ClipProps,
    pub z_offset: i32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Animated properties, keyed in clip-local frames.
pub struct ClipProps {
    /// `translate` is where the anchor point lands on the canvas.
    pub transform: Anim<Transform2D>,
    /// Clamped to `[0, 1]` when sampled.
    pub opacity: Anim<f64>,
    /// Draw-on progress in `[0, 1]`: arc length for paths, glyph count for text.
    #[serde(default = "default_reveal")]
    pub reveal: Anim<f64>,
    /// Point of the asset's bounds placed at the transform origin.
    #[serde(default)]
    pub anchor: Anchor,
}

fn default_reveal() -> Anim<f64> {
    Anim::constant(1.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Fractional position inside an asset's bounding box; `(0, 0)` is top-left, `(1, 1)` bottom-right.
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub const TOP_LEFT: Self = Self { x: 0.0, y: 0.0 };
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    pub const BOTTOM_LEFT: Self = Self { x: 0.0, y: 1.0 };
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Asset {
    /// One line of text shaped with the run's font.
    Text(TextAsset),
    /// SVG path data in canvas pixels.
    Path(PathAsset),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextAsset {
    pub text: String,
    pub size_px: f32,
    /// Straight alpha.
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PathAsset {
    /// The `d` attribute of an SVG `<path>`.
    pub svg_path_d: String,
    pub style: PathStyle,
    /// Straight alpha.
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PathStyle {
    Fill,
    Stroke { width_px: f64 },
}

fn default_color_rgba8() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Composition {
    /// Check the invariants evaluation relies on. Every clip must have a unique id, fit inside
    /// the duration and reference a valid asset.
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation(format!(
                "canvas {}x{} has no pixels",
                self.canvas.width, self.canvas.height
            )));
        }
        if self.duration.0 == 0 {
            return Err(ReelError::validation("composition has zero frames"));
        }

        for (key, asset) in &self.assets {
            asset
                .validate()
                .map_err(|e| ReelError::validation(format!("asset '{key}': {e}")))?;
        }

        let mut ids = HashSet::new();
        for clip in self.tracks.iter().flat_map(|t| &t.clips) {
            if !ids.insert(clip.id.as_str()) {
                return Err(ReelError::validation(format!("clip id '{}' is used twice", clip.id)));
            }
            self.validate_clip(clip)
                .map_err(|e| ReelError::validation(format!("clip '{}': {e}", clip.id)))?;
        }
        Ok(())
    }

    fn validate_clip(&self, clip: &Clip) -> ReelResult<()> {
        if !self.assets.contains_key(&clip.asset) {
            return Err(ReelError::validation(format!("unknown asset '{}'", clip.asset)));
        }
        if clip.range.end < clip.range.start || clip.range.end > self.duration {
            return Err(ReelError::validation(format!(
                "frames {}..{} do not fit in 0..{}",
                clip.range.start.0, clip.range.end.0, self.duration.0
            )));
        }
        clip.props.opacity.validate()?;
        clip.props.reveal.validate()?;
        clip.props.transform.validate()
    }
}

impl Asset {
    pub fn validate(&self) -> ReelResult<()> {
        match self {
            Self::Text(t) if !(t.size_px.is_finite() && t.size_px > 0.0) => Err(
                ReelError::validation(format!("text size {} px is not positive", t.size_px)),
            ),
            Self::Path(p) if p.svg_path_d.trim().is_empty() => {
                Err(ReelError::validation("path data is empty"))
            }
            Self::Path(PathAsset {
                style: PathStyle::Stroke { width_px },
                ..
            }) if !(width_px.is_finite() && *width_px > 0.0) => Err(ReelError::validation(
                format!("stroke width {width_px} px is not positive"),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
