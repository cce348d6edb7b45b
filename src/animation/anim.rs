use crate::{
    animation::ease::Ease,
    foundation::core::{Fps, FrameIndex, Transform2D, Vec2},
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Copy, Debug)]
/// Where a clip property is being sampled.
pub struct SampleCtx {
    /// Composition frame.
    pub frame: FrameIndex,
    pub fps: Fps,
    /// `frame - clip.range.start`; keyframes are addressed in this space.
    pub clip_local: FrameIndex,
}

/// Values a keyframe track can blend between.
pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Lerp for Transform2D {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            translate: a.translate.lerp(b.translate, t),
            rotation_rad: f64::lerp(&a.rotation_rad, &b.rotation_rad, t),
            scale: a.scale.lerp(b.scale, t),
            anchor: a.anchor.lerp(b.anchor, t),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Animated clip property. Every explainer property is a keyframe track.
pub enum Anim<T> {
    Keyframes(Keyframes<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone,
{
    pub fn constant(value: T) -> Self {
        Self::Keyframes(Keyframes::single(value))
    }

    /// Interpolated track from `(clip_local_frame, value, ease_toward_next)` triples.
    pub fn linear(keys: impl IntoIterator<Item = (u64, T, Ease)>) -> Self {
        let keys = keys
            .into_iter()
            .map(|(frame, value, ease)| Keyframe {
                frame: FrameIndex(frame),
                value,
                ease,
            })
            .collect();
        Self::Keyframes(Keyframes {
            keys,
            mode: InterpMode::Linear,
            default: None,
        })
    }

    pub fn sample(&self, ctx: SampleCtx) -> ReelResult<T> {
        let Self::Keyframes(kf) = self;
        kf.sample(ctx.clip_local)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let Self::Keyframes(kf) = self;
        kf.validate()
    }

    /// No two frames can sample differently.
    pub fn is_static(&self) -> bool {
        let Self::Keyframes(kf) = self;
        kf.keys.len() <= 1
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Ascending by frame.
    pub keys: Vec<Keyframe<T>>,
    pub mode: InterpMode,
    /// Sampled when `keys` is empty.
    pub default: Option<T>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    fn single(value: T) -> Self {
        Self {
            keys: vec![Keyframe {
                frame: FrameIndex(0),
                value,
                ease: Ease::Linear,
            }],
            mode: InterpMode::Hold,
            default: None,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.keys.is_empty() && self.default.is_none() {
            return Err(ReelError::animation("keyframe track has no keys and no default"));
        }
        if let Some(w) = self.keys.windows(2).find(|w| w[1].frame < w[0].frame) {
            return Err(ReelError::animation(format!(
                "keyframe at frame {} follows frame {}",
                w[1].frame.0, w[0].frame.0
            )));
        }
        Ok(())
    }

    /// Value at clip-local frame `at`; frames outside the keyed span hold the nearest key.
    pub fn sample(&self, at: FrameIndex) -> ReelResult<T> {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return self
                .default
                .clone()
                .ok_or_else(|| ReelError::animation("keyframe track has no keys and no default"));
        };
        if at <= first.frame {
            return Ok(first.value.clone());
        }
        if at >= last.frame {
            return Ok(last.value.clone());
        }

        // `first.frame < at < last.frame`, so a bracketing pair exists.
        let next = self.keys.partition_point(|k| k.frame <= at);
        let (a, b) = (&self.keys[next - 1], &self.keys[next]);
        if self.mode == InterpMode::Hold || b.frame == a.frame {
            return Ok(a.value.clone());
        }
        let t = (at.0 - a.frame.0) as f64 / (b.frame.0 - a.frame.0) as f64;
        Ok(T::lerp(&a.value, &b.value, a.ease.apply(t)))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    pub frame: FrameIndex,
    pub value: T,
    /// Shapes the blend from this key to the next.
    pub ease: Ease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InterpMode {
    Hold,
    Linear,
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
