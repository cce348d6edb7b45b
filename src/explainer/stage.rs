use std::collections::BTreeMap;

use crate::{
    animation::{anim::Anim, ease::Ease},
    composition::{
        dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
        model::{Anchor, Asset, Clip, Composition, PathAsset},
    },
    explainer::mobject::{Content, Mobject},
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D, Vec2},
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle returned by [`Stage::add`].
pub struct MobjectId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A transition applied to one mobject during a [`Stage::play`] call.
pub enum Action {
    /// Draw text glyph by glyph (or trace a stroke) at a constant rate.
    Write(MobjectId),
    /// Trace a stroke with an eased rate.
    Create(MobjectId),
    FadeIn(MobjectId),
    FadeOut(MobjectId),
}

impl Action {
    fn target(self) -> MobjectId {
        match self {
            Self::Write(id) | Self::Create(id) | Self::FadeIn(id) | Self::FadeOut(id) => id,
        }
    }
}

/// One on-screen interval of a mobject, in absolute frames.
#[derive(Clone, Debug)]
struct Appearance {
    start: u64,
    reveal: Vec<(u64, f64, Ease)>,
    opacity: Vec<(u64, f64, Ease)>,
    end: Option<u64>,
}

struct Entry {
    mobject: Mobject,
    appearances: Vec<Appearance>,
}

impl Entry {
    fn visible(&self) -> bool {
        self.appearances.last().is_some_and(|a| a.end.is_none())
    }
}

/// Play/wait choreography over a set of mobjects.
///
/// The stage keeps a time cursor in seconds and converts to frames with rounding at every call, so
/// the composition length is the sum of all run and wait times rounded once per boundary.
pub struct Stage {
    fps: Fps,
    canvas: Canvas,
    background_rgba8: [u8; 4],
    cursor_secs: f64,
    entries: Vec<Entry>,
}

impl Stage {
    pub fn new(fps: Fps, canvas: Canvas, background_rgba8: [u8; 4]) -> Self {
        Self {
            fps,
            canvas,
            background_rgba8,
            cursor_secs: 0.0,
            entries: Vec::new(),
        }
    }

    /// Register a positioned mobject. It stays hidden until an action shows it.
    pub fn add(&mut self, mobject: Mobject) -> MobjectId {
        self.entries.push(Entry {
            mobject,
            appearances: Vec::new(),
        });
        MobjectId(self.entries.len() - 1)
    }

    pub fn mobject(&self, id: MobjectId) -> ReelResult<&Mobject> {
        self.entry(id).map(|e| &e.mobject)
    }

    pub fn is_visible(&self, id: MobjectId) -> bool {
        self.entries.get(id.0).is_some_and(Entry::visible)
    }

    /// Current time cursor in seconds.
    pub fn time_secs(&self) -> f64 {
        self.cursor_secs
    }

    pub fn current_frame(&self) -> u64 {
        self.fps.secs_to_frames_round(self.cursor_secs)
    }

    /// Run all `actions` together over `run_time` seconds, then advance the cursor.
    pub fn play(&mut self, actions: &[Action], run_time: f64) -> ReelResult<()> {
        check_run_time(run_time)?;
        if actions.is_empty() {
            return Err(ReelError::animation("play needs at least one action"));
        }
        let t0 = self.cursor_secs;
        for &action in actions {
            self.apply(action, t0, t0 + run_time)?;
        }
        self.cursor_secs += run_time;
        Ok(())
    }

    /// Run `actions` one after another with overlap, fitting the whole group into `run_time`.
    ///
    /// Each action lasts `run_time / (1 + lag_ratio * (n - 1))` and action `k` starts
    /// `k * lag_ratio` action-lengths after the first.
    pub fn play_lagged(
        &mut self,
        actions: &[Action],
        run_time: f64,
        lag_ratio: f64,
    ) -> ReelResult<()> {
        check_run_time(run_time)?;
        if actions.is_empty() {
            return Err(ReelError::animation("play_lagged needs at least one action"));
        }
        if !lag_ratio.is_finite() || lag_ratio < 0.0 {
            return Err(ReelError::animation("lag_ratio must be finite and >= 0"));
        }
        let n = actions.len() as f64;
        let each = run_time / (1.0 + lag_ratio * (n - 1.0));
        let t0 = self.cursor_secs;
        for (k, &action) in actions.iter().enumerate() {
            let start = t0 + (k as f64) * lag_ratio * each;
            self.apply(action, start, start + each)?;
        }
        self.cursor_secs += run_time;
        Ok(())
    }

    pub fn wait(&mut self, secs: f64) -> ReelResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ReelError::animation("wait time must be finite and >= 0"));
        }
        self.cursor_secs += secs;
        Ok(())
    }

    /// Turn the recorded choreography into a composition ending at the cursor.
    ///
    /// Mobjects still on screen last until the final frame. Every mobject gets its own asset and
    /// paints above every mobject added before it.
    pub fn finish(self) -> ReelResult<Composition> {
        let duration = self.current_frame();
        if duration == 0 {
            return Err(ReelError::animation(
                "stage has no running time; play or wait before finishing",
            ));
        }

        let mut builder = CompositionBuilder::new(self.fps, self.canvas, FrameIndex(duration))
            .background(self.background_rgba8);
        let mut track = TrackBuilder::new("stage");
        let mut clip_count = 0usize;

        for (index, entry) in self.entries.into_iter().enumerate() {
            if entry.appearances.is_empty() {
                continue;
            }
            let key = format!("{index:03}-{}", entry.mobject.name);
            builder = builder.asset(key.clone(), asset_for(&entry.mobject)?)?;
            for (n, appearance) in entry.appearances.iter().enumerate() {
                let clip = clip_for(&key, n, &entry.mobject, appearance, duration, index)?;
                track = track.clip(clip);
                clip_count += 1;
            }
        }

        tracing::debug!(frames = duration, clips = clip_count, "stage finished");
        builder.track(track.build()?).build()
    }

    fn entry(&self, id: MobjectId) -> ReelResult<&Entry> {
        self.entries
            .get(id.0)
            .ok_or_else(|| ReelError::animation(format!("unknown mobject id {}", id.0)))
    }

    fn apply(&mut self, action: Action, from_secs: f64, to_secs: f64) -> ReelResult<()> {
        let s = self.fps.secs_to_frames_round(from_secs);
        let e = self.fps.secs_to_frames_round(to_secs);
        let id = action.target();
        self.entry(id)?;
        let entry = &mut self.entries[id.0];

        match action {
            Action::Write(_) | Action::Create(_) | Action::FadeIn(_) => {
                if entry.visible() {
                    return Err(ReelError::animation(format!(
                        "mobject '{}' is already on screen",
                        entry.mobject.name
                    )));
                }
                let appearance = match action {
                    Action::Write(_) => Appearance {
                        start: s,
                        reveal: vec![(s, 0.0, Ease::Linear), (e, 1.0, Ease::Linear)],
                        opacity: vec![(s, 1.0, Ease::Linear)],
                        end: None,
                    },
                    Action::Create(_) => Appearance {
                        start: s,
                        reveal: vec![(s, 0.0, Ease::Smooth), (e, 1.0, Ease::Linear)],
                        opacity: vec![(s, 1.0, Ease::Linear)],
                        end: None,
                    },
                    _ => Appearance {
                        start: s,
                        reveal: vec![(s, 1.0, Ease::Linear)],
                        opacity: vec![(s, 0.0, Ease::Smooth), (e, 1.0, Ease::Linear)],
                        end: None,
                    },
                };
                entry.appearances.push(appearance);
            }
            Action::FadeOut(_) => {
                let name = entry.mobject.name.clone();
                let Some(current) = entry.appearances.last_mut().filter(|a| a.end.is_none())
                else {
                    return Err(ReelError::animation(format!(
                        "cannot fade out '{name}': it is not on screen"
                    )));
                };
                let (last_frame, from) = current.opacity.last().map_or((s, 1.0), |k| (k.0, k.1));
                if s < last_frame {
                    return Err(ReelError::animation(format!(
                        "cannot fade out '{name}' while it is still appearing"
                    )));
                }
                current.opacity.push((s.max(current.start), from, Ease::Smooth));
                current.opacity.push((e.max(current.start), 0.0, Ease::Linear));
                current.end = Some(e.max(current.start));
            }
        }
        Ok(())
    }
}

fn check_run_time(run_time: f64) -> ReelResult<()> {
    if !run_time.is_finite() || run_time <= 0.0 {
        return Err(ReelError::animation("run_time must be finite and > 0"));
    }
    Ok(())
}

fn asset_for(m: &Mobject) -> ReelResult<Asset> {
    Ok(match &m.content {
        Content::Text {
            text,
            size_px,
            color,
        } => Asset::Text(crate::composition::dsl::text_asset(
            text.clone(),
            *size_px,
            *color,
        )),
        Content::Path { path, style, color } => {
            let svg_path_d = path.to_svg();
            if svg_path_d.trim().is_empty() {
                return Err(ReelError::validation(format!(
                    "mobject '{}' has an empty path",
                    m.name
                )));
            }
            Asset::Path(PathAsset {
                svg_path_d,
                style: *style,
                color_rgba8: *color,
            })
        }
    })
}

fn clip_for(
    key: &str,
    n: usize,
    m: &Mobject,
    a: &Appearance,
    duration: u64,
    z: usize,
) -> ReelResult<Clip> {
    let end = a.end.unwrap_or(duration).min(duration);
    let range = FrameRange::new(FrameIndex(a.start), FrameIndex(end.max(a.start)))?;
    let local = |keys: &[(u64, f64, Ease)]| {
        Anim::linear(
            keys.iter()
                .map(|&(f, v, ease)| (f.saturating_sub(a.start), v, ease)),
        )
    };
    let transform = Transform2D {
        translate: Vec2::new(m.center.x, m.center.y),
        rotation_rad: m.rotation,
        ..Transform2D::default()
    };

    ClipBuilder::new(format!("{key}#{n}"), key, range)
        .transform(Anim::constant(transform))
        .opacity(local(&a.opacity))
        .reveal(local(&a.reveal))
        .anchor(Anchor::CENTER)
        .z_offset(i32::try_from(z).unwrap_or(i32::MAX))
        .build()
}

/// Show/hide spans per mobject name, for inspection and tests.
pub fn timeline(comp: &Composition) -> BTreeMap<String, Vec<FrameRange>> {
    let mut out = BTreeMap::<String, Vec<FrameRange>>::new();
    for clip in comp.tracks.iter().flat_map(|t| t.clips.iter()) {
        out.entry(clip.asset.clone()).or_default().push(clip.range);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/explainer/stage.rs"]
mod tests;
