use crate::{
    animation::anim::SampleCtx,
    composition::model::{Anchor, Clip, Composition},
    foundation::core::FrameIndex,
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Debug, serde::Serialize)]
/// Everything drawn at one frame, bottom first.
pub struct EvaluatedGraph {
    pub frame: FrameIndex,
    pub nodes: Vec<EvaluatedClipNode>,
}

#[derive(Clone, Debug, serde::Serialize)]
/// One visible clip with its properties sampled at the frame.
pub struct EvaluatedClipNode {
    pub clip_id: String,
    /// Key into [`Composition::assets`].
    pub asset: String,
    /// `track.z_base + clip.z_offset`.
    pub z: i32,
    /// Local content to canvas, before anchoring.
    pub transform: kurbo::Affine,
    /// In `(0, 1]`; clips sampled at zero opacity are dropped.
    pub opacity: f64,
    /// Draw-on progress in `[0, 1]`.
    pub reveal: f64,
    /// Resolved against the prepared asset's bounds at compile time.
    pub anchor: Anchor,
}

/// Samples a [`Composition`] at single frames. Holds no state between frames, so frames can be
/// evaluated in any order or in parallel.
pub struct Evaluator;

impl Evaluator {
    #[tracing::instrument(skip(comp))]
    pub fn eval_frame(comp: &Composition, frame: FrameIndex) -> ReelResult<EvaluatedGraph> {
        comp.validate()?;
        Self::eval_frame_unchecked(comp, frame)
    }

    /// [`Evaluator::eval_frame`] for a composition the caller has already validated.
    pub(crate) fn eval_frame_unchecked(
        comp: &Composition,
        frame: FrameIndex,
    ) -> ReelResult<EvaluatedGraph> {
        if frame >= comp.duration {
            return Err(ReelError::evaluation(format!(
                "frame {} is past the end of a {}-frame composition",
                frame.0, comp.duration.0
            )));
        }

        // Painter's order: z, then track order, then start frame, then id for a total order.
        let mut keyed = Vec::new();
        for (track_index, track) in comp.tracks.iter().enumerate() {
            for clip in track.clips.iter().filter(|c| c.range.contains(frame)) {
                let node = sample_clip(comp, clip, frame, track.z_base)?;
                if node.opacity > 0.0 {
                    keyed.push(((node.z, track_index, clip.range.start), node));
                }
            }
        }
        keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.clip_id.cmp(&b.clip_id)));

        Ok(EvaluatedGraph {
            frame,
            nodes: keyed.into_iter().map(|(_, node)| node).collect(),
        })
    }
}

fn sample_clip(
    comp: &Composition,
    clip: &Clip,
    frame: FrameIndex,
    z_base: i32,
) -> ReelResult<EvaluatedClipNode> {
    let ctx = SampleCtx {
        frame,
        fps: comp.fps,
        clip_local: FrameIndex(frame.0 - clip.range.start.0),
    };
    let props = &clip.props;

    Ok(EvaluatedClipNode {
        clip_id: clip.id.clone(),
        asset: clip.asset.clone(),
        z: z_base + clip.z_offset,
        transform: props.transform.sample(ctx)?.to_affine(),
        opacity: props.opacity.sample(ctx)?.clamp(0.0, 1.0),
        reveal: props.reveal.sample(ctx)?.clamp(0.0, 1.0),
        anchor: props.anchor,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
