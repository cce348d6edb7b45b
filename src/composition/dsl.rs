use std::collections::{BTreeMap, btree_map::Entry};

use crate::{
    animation::anim::Anim,
    composition::model::{
        Anchor, Asset, Clip, ClipProps, Composition, PathAsset, PathStyle, TextAsset, Track,
    },
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    foundation::error::{ReelError, ReelResult},
};

/// Assembles a [`Composition`] and validates it on [`CompositionBuilder::build`].
pub struct CompositionBuilder {
    fps: Fps,
    canvas: Canvas,
    duration: FrameIndex,
    background_rgba8: [u8; 4],
    assets: BTreeMap<String, Asset>,
    tracks: Vec<Track>,
}

impl CompositionBuilder {
    pub fn new(fps: Fps, canvas: Canvas, duration: FrameIndex) -> Self {
        Self {
            fps,
            canvas,
            duration,
            background_rgba8: [0, 0, 0, 255],
            assets: BTreeMap::new(),
            tracks: Vec::new(),
        }
    }

    pub fn background(mut self, rgba8: [u8; 4]) -> Self {
        self.background_rgba8 = rgba8;
        self
    }

    pub fn asset(mut self, key: impl Into<String>, asset: Asset) -> ReelResult<Self> {
        match self.assets.entry(key.into()) {
            Entry::Occupied(e) => {
                return Err(ReelError::validation(format!(
                    "asset key '{}' is already taken",
                    e.key()
                )));
            }
            Entry::Vacant(e) => {
                e.insert(asset);
            }
        }
        Ok(self)
    }

    pub fn text_asset(
        self,
        key: impl Into<String>,
        text: impl Into<String>,
        size_px: f32,
        color_rgba8: [u8; 4],
    ) -> ReelResult<Self> {
        self.asset(key, Asset::Text(text_asset(text, size_px, color_rgba8)))
    }

    pub fn path_asset(
        self,
        key: impl Into<String>,
        svg_path_d: impl Into<String>,
        style: PathStyle,
        color_rgba8: [u8; 4],
    ) -> ReelResult<Self> {
        self.asset(
            key,
            Asset::Path(PathAsset {
                svg_path_d: svg_path_d.into(),
                style,
                color_rgba8,
            }),
        )
    }

    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn build(self) -> ReelResult<Composition> {
        let comp = Composition {
            fps: self.fps,
            canvas: self.canvas,
            duration: self.duration,
            background_rgba8: self.background_rgba8,
            assets: self.assets,
            tracks: self.tracks,
        };
        comp.validate()?;
        Ok(comp)
    }
}

pub fn text_asset(text: impl Into<String>, size_px: f32, color_rgba8: [u8; 4]) -> TextAsset {
    TextAsset {
        text: text.into(),
        size_px,
        color_rgba8,
    }
}

pub struct TrackBuilder {
    track: Track,
}

impl TrackBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            track: Track {
                name: name.into(),
                z_base: 0,
                clips: Vec::new(),
            },
        }
    }

    pub fn z_base(mut self, z: i32) -> Self {
        self.track.z_base = z;
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.track.clips.push(clip);
        self
    }

    pub fn build(self) -> ReelResult<Track> {
        if self.track.name.trim().is_empty() {
            return Err(ReelError::validation("track needs a name"));
        }
        Ok(self.track)
    }
}

/// Starts from a fully visible, untransformed clip anchored at its top-left corner.
pub struct ClipBuilder {
    clip: Clip,
}

impl ClipBuilder {
    pub fn new(id: impl Into<String>, asset_key: impl Into<String>, range: FrameRange) -> Self {
        Self {
            clip: Clip {
                id: id.into(),
                asset: asset_key.into(),
                range,
                props: ClipProps {
                    transform: Anim::constant(Transform2D::default()),
                    opacity: Anim::constant(1.0),
                    reveal: Anim::constant(1.0),
                    anchor: Anchor::TOP_LEFT,
                },
                z_offset: 0,
            },
        }
    }

    pub fn z_offset(mut self, z: i32) -> Self {
        self.clip.z_offset = z;
        self
    }

    pub fn opacity(mut self, a: Anim<f64>) -> Self {
        self.clip.props.opacity = a;
        self
    }

    pub fn reveal(mut self, a: Anim<f64>) -> Self {
        self.clip.props.reveal = a;
        self
    }

    pub fn transform(mut self, t: Anim<Transform2D>) -> Self {
        self.clip.props.transform = t;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.clip.props.anchor = anchor;
        self
    }

    /// Checks what can be checked without the composition; asset references and ranges are
    /// checked by [`Composition::validate`].
    pub fn build(self) -> ReelResult<Clip> {
        let Clip { id, asset, props, .. } = &self.clip;
        if id.trim().is_empty() || asset.trim().is_empty() {
            return Err(ReelError::validation(format!(
                "clip '{id}' needs a non-empty id and asset key"
            )));
        }
        props.opacity.validate()?;
        props.reveal.validate()?;
        props.transform.validate()?;
        Ok(self.clip)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
