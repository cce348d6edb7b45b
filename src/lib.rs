//! compound-reel renders an animated explainer of compound interest.
//!
//! Two layers live in this crate:
//!
//! - The amount generators in [`finance`]: `simple[t] = P(1 + i·t)` and
//!   `compound[t] = P(1 + i)^t` for every yearly period.
//! - A small composition engine that turns those numbers into video. The explainer script lays
//!   out text and paths with a [`Stage`], which produces a pure-data [`Composition`]. Frames are
//!   evaluated, compiled to a render plan, rasterized on the CPU and piped into `ffmpeg`.
//!
//! ```no_run
//! use compound_reel::{ExplainerStyle, Scenario, build_explainer};
//!
//! let comp = build_explainer(&Scenario::default(), &ExplainerStyle::default())?;
//! assert_eq!(comp.duration.0, 1575);
//! # Ok::<(), compound_reel::ReelError>(())
//! ```
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod compile;
pub mod composition;
pub mod config;
pub mod encode;
pub mod eval;
pub mod explainer;
pub mod finance;
pub mod foundation;
pub mod render;

pub use crate::animation::{anim::Anim, ease::Ease};
pub use crate::assets::fonts::{FontSource, ResolvedFont, resolve_font};
pub use crate::assets::store::{PreparedAsset, PreparedAssetStore, TextLayoutEngine};
pub use crate::composition::model::{Anchor, Asset, Clip, Composition, PathStyle, Track};
pub use crate::config::ReelConfig;
pub use crate::explainer::script::{ExplainerStyle, build_explainer, build_explainer_with};
pub use crate::explainer::stage::{Action, MobjectId, Stage};
pub use crate::finance::amounts::{
    AmountComparison, Scenario, YearStep, compare, compound_amounts, compound_interest,
    growth_factor, simple_amounts, year_breakdown,
};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8Premul};
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::render::pipeline::{
    RenderStats, RenderThreading, RenderToMp4Opts, render_frame, render_frames,
    render_frames_with_stats, render_to_mp4, render_to_mp4_with_stats,
};
