use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    assets::store::PreparedAssetStore,
    compile::fingerprint::{FrameFingerprint, fingerprint_eval},
    compile::plan::compile_frame,
    composition::model::Composition,
    encode::ffmpeg::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path},
    eval::evaluator::{EvaluatedGraph, Evaluator},
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{ReelError, ReelResult},
    render::backend::{FrameRGBA, RenderBackend},
    render::cpu::CpuBackend,
    render::passes::execute_plan,
};

/// Evaluate, compile and rasterize one frame.
///
/// Returns **premultiplied** RGBA8 pixels; see [`FrameRGBA::to_straight_rgba8`] for image
/// export.
pub fn render_frame(
    comp: &Composition,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> ReelResult<FrameRGBA> {
    let eval = Evaluator::eval_frame(comp, frame)?;
    let plan = compile_frame(comp, &eval, assets)?;
    execute_plan(backend, &plan, assets)
}

/// Render `range` sequentially with default threading.
pub fn render_frames(
    comp: &Composition,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> ReelResult<Vec<FrameRGBA>> {
    render_frames_with_stats(comp, range, backend, assets, &RenderThreading::default())
        .map(|(frames, _)| frames)
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Rasterize each chunk on a rayon pool with one [`CpuBackend`] per worker.
    pub parallel: bool,
    /// Frames evaluated together; also the reuse window for parallel elision.
    pub chunk_size: usize,
    /// Worker count; `None` lets rayon pick one per core.
    pub threads: Option<usize>,
    /// Rasterize frames with equal fingerprints once.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_elided: u64,
}

impl RenderStats {
    fn count(total: u64, rendered: u64) -> Self {
        Self {
            frames_total: total,
            frames_rendered: rendered,
            frames_elided: total - rendered,
        }
    }

    fn absorb(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

pub fn render_frames_with_stats(
    comp: &Composition,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
) -> ReelResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);
    let stats = drive(comp, range, backend, assets, threading, &mut |frame| {
        out.push(frame);
        Ok(())
    })?;
    Ok((out, stats))
}

/// Options for [`render_to_mp4`].
#[derive(Clone, Debug)]
pub struct RenderToMp4Opts {
    pub range: FrameRange,
    /// Replace an existing file at the output path.
    pub overwrite: bool,
    pub threading: RenderThreading,
}

impl RenderToMp4Opts {
    /// Every frame of `comp`, overwriting, sequential.
    pub fn full(comp: &Composition) -> Self {
        Self {
            range: FrameRange {
                start: FrameIndex(0),
                end: comp.duration,
            },
            overwrite: true,
            threading: RenderThreading::default(),
        }
    }
}

/// Render to an H.264 MP4 by piping frames into the system `ffmpeg`.
///
/// Frames are flattened over the composition background before encoding. Requires integer fps.
pub fn render_to_mp4(
    comp: &Composition,
    out_path: impl Into<std::path::PathBuf>,
    opts: RenderToMp4Opts,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> ReelResult<()> {
    render_to_mp4_with_stats(comp, out_path, opts, backend, assets).map(|_| ())
}

pub fn render_to_mp4_with_stats(
    comp: &Composition,
    out_path: impl Into<std::path::PathBuf>,
    opts: RenderToMp4Opts,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> ReelResult<RenderStats> {
    if comp.fps.den != 1 {
        return Err(ReelError::validation(format!(
            "mp4 output needs an integer frame rate, got {}/{}",
            comp.fps.num, comp.fps.den
        )));
    }
    check_range(comp, opts.range)?;
    if !is_ffmpeg_on_path() {
        return Err(ReelError::evaluation("ffmpeg was not found on PATH"));
    }

    let cfg = EncodeConfig {
        width: comp.canvas.width,
        height: comp.canvas.height,
        fps: comp.fps.num,
        out_path: out_path.into(),
        overwrite: opts.overwrite,
    };
    tracing::info!(
        out = %cfg.out_path.display(),
        width = cfg.width,
        height = cfg.height,
        fps = cfg.fps,
        frames = opts.range.len_frames(),
        parallel = opts.threading.parallel,
        "encoding mp4"
    );

    let mut enc = FfmpegEncoder::new(cfg, comp.background_rgba8)?;
    let stats = drive(comp, opts.range, backend, assets, &opts.threading, &mut |frame| {
        enc.encode_frame(&frame)
    })?;
    enc.finish()?;

    tracing::info!(
        frames_total = stats.frames_total,
        frames_rendered = stats.frames_rendered,
        frames_elided = stats.frames_elided,
        "mp4 complete"
    );
    Ok(stats)
}

/// Render `range` chunk by chunk, handing frames to `sink` in order.
fn drive(
    comp: &Composition,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
    sink: &mut dyn FnMut(FrameRGBA) -> ReelResult<()>,
) -> ReelResult<RenderStats> {
    check_range(comp, range)?;
    comp.validate()?;
    let pool = threading
        .parallel
        .then(|| build_thread_pool(threading.threads))
        .transpose()?;

    let mut stats = RenderStats::default();
    let size = threading.chunk_size.max(1) as u64;
    let mut start = range.start.0;
    while start < range.end.0 {
        let end = (start + size).min(range.end.0);
        let chunk = FrameRange::new(FrameIndex(start), FrameIndex(end))?;
        let (frames, chunk_stats) = match &pool {
            Some(pool) => render_chunk_parallel(comp, chunk, assets, threading, pool)?,
            None => render_chunk_sequential(comp, chunk, backend, assets, threading)?,
        };
        for frame in frames {
            sink(frame)?;
        }
        tracing::debug!(start, end, rendered = chunk_stats.frames_rendered, "chunk done");
        stats.absorb(chunk_stats);
        start = end;
    }
    Ok(stats)
}

fn check_range(comp: &Composition, range: FrameRange) -> ReelResult<()> {
    if range.is_empty() {
        return Err(ReelError::validation("render range is empty"));
    }
    if range.end > comp.duration {
        return Err(ReelError::validation(format!(
            "render range ends at frame {} past the duration {}",
            range.end.0, comp.duration.0
        )));
    }
    Ok(())
}

/// Consecutive frames with the same fingerprint reuse the previous pixels.
fn render_chunk_sequential(
    comp: &Composition,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
) -> ReelResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut out: Vec<FrameRGBA> = Vec::with_capacity(range.len_frames() as usize);
    let mut previous: Option<FrameFingerprint> = None;
    let mut rendered = 0u64;

    for f in range.start.0..range.end.0 {
        let eval = Evaluator::eval_frame_unchecked(comp, FrameIndex(f))?;
        let fp = threading
            .static_frame_elision
            .then(|| fingerprint_eval(&eval));

        if let (Some(fp), Some(last)) = (fp, out.last())
            && previous == Some(fp)
        {
            let held = last.clone();
            out.push(held);
            continue;
        }

        let plan = compile_frame(comp, &eval, assets)?;
        out.push(backend.render_plan(&plan, assets)?);
        previous = fp;
        rendered += 1;
    }

    Ok((out, RenderStats::count(range.len_frames(), rendered)))
}

/// Any two frames in the chunk with the same fingerprint share one rasterization.
fn render_chunk_parallel(
    comp: &Composition,
    range: FrameRange,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
    pool: &rayon::ThreadPool,
) -> ReelResult<(Vec<FrameRGBA>, RenderStats)> {
    let evals = (range.start.0..range.end.0)
        .map(|f| Evaluator::eval_frame_unchecked(comp, FrameIndex(f)))
        .collect::<ReelResult<Vec<EvaluatedGraph>>>()?;

    // `slots[i]` is the index into `unique` of the frame whose pixels frame `i` shows.
    let mut unique: Vec<&EvaluatedGraph> = Vec::new();
    let mut slots: Vec<usize> = Vec::with_capacity(evals.len());
    let mut seen = HashMap::<FrameFingerprint, usize>::new();
    for eval in &evals {
        let slot = if threading.static_frame_elision {
            *seen.entry(fingerprint_eval(eval)).or_insert(unique.len())
        } else {
            unique.len()
        };
        if slot == unique.len() {
            unique.push(eval);
        }
        slots.push(slot);
    }

    let pixels = pool.install(|| {
        unique
            .par_iter()
            .map_init(CpuBackend::new, |worker, eval| {
                let plan = compile_frame(comp, eval, assets)?;
                worker.render_plan(&plan, assets)
            })
            .collect::<ReelResult<Vec<FrameRGBA>>>()
    })?;

    let out = slots.iter().map(|&s| pixels[s].clone()).collect();
    Ok((
        out,
        RenderStats::count(evals.len() as u64, pixels.len() as u64),
    ))
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    match threads {
        Some(0) => return Err(ReelError::validation("threading.threads must be > 0")),
        Some(n) => builder = builder.num_threads(n),
        None => {}
    }
    builder
        .build()
        .map_err(|e| ReelError::evaluation(format!("build render thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
