use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore},
    compile::trim::trim_path_to_fraction,
    composition::model::{Anchor, Composition, PathStyle},
    eval::evaluator::{EvaluatedClipNode, EvaluatedGraph},
    foundation::core::{Affine, BezPath, Canvas, Rect, Rgba8Premul},
    foundation::error::ReelResult,
};

/// Surface the background is cleared into and the scene is composited onto.
pub const FINAL_SURFACE: SurfaceId = SurfaceId(0);
/// Surface every draw op of a frame is painted into.
pub const SCENE_SURFACE: SurfaceId = SurfaceId(1);

#[derive(Clone, Debug)]
/// What a backend must do to produce one frame, with every asset already resolved.
///
/// Passes run in order against the declared `surfaces`; the frame is read back from
/// `final_surface`.
pub struct RenderPlan {
    pub canvas: Canvas,
    pub surfaces: Vec<SurfaceDesc>,
    pub passes: Vec<Pass>,
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
pub enum Pass {
    Scene(ScenePass),
    Composite(CompositePass),
}

#[derive(Clone, Debug)]
pub struct ScenePass {
    pub target: SurfaceId,
    pub ops: Vec<DrawOp>,
    /// Color the target is cleared to before drawing.
    pub clear_to: Rgba8Premul,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Index into [`RenderPlan::surfaces`].
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8Premul,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

#[derive(Clone, Debug)]
/// Blend whole surfaces onto `target`.
pub struct CompositePass {
    pub target: SurfaceId,
    pub ops: Vec<CompositeOp>,
}

#[derive(Clone, Debug)]
pub enum CompositeOp {
    Over { src: SurfaceId, opacity: f32 },
}

#[derive(Clone, Debug)]
/// Draw operation emitted by the compiler, in painter's order.
pub enum DrawOp {
    FillPath {
        path: BezPath,
        transform: Affine,
        color: Rgba8Premul,
        opacity: f32,
        z: i32,
    },
    StrokePath {
        path: BezPath,
        transform: Affine,
        color: Rgba8Premul,
        width: f64,
        opacity: f32,
        z: i32,
    },
    Text {
        asset: AssetId,
        transform: Affine,
        opacity: f32,
        /// Number of leading glyphs to draw.
        glyph_limit: usize,
        z: i32,
    },
}

impl DrawOp {
    pub fn opacity(&self) -> f32 {
        match self {
            Self::FillPath { opacity, .. }
            | Self::StrokePath { opacity, .. }
            | Self::Text { opacity, .. } => *opacity,
        }
    }
}

#[tracing::instrument(skip_all, fields(frame = eval.frame.0, nodes = eval.nodes.len()))]
/// Lower an evaluated frame into a two-surface plan.
///
/// Surface 0 is cleared to the composition background; every visible node is drawn into
/// surface 1, which is then composited over surface 0.
pub fn compile_frame(
    comp: &Composition,
    eval: &EvaluatedGraph,
    assets: &PreparedAssetStore,
) -> ReelResult<RenderPlan> {
    let surface = SurfaceDesc {
        width: comp.canvas.width,
        height: comp.canvas.height,
        format: PixelFormat::Rgba8Premul,
    };

    let mut ops = Vec::<DrawOp>::with_capacity(eval.nodes.len());
    for node in &eval.nodes {
        if let Some(op) = compile_node(node, assets)? {
            ops.push(op);
        }
    }

    let mut passes = vec![Pass::Scene(ScenePass {
        target: FINAL_SURFACE,
        ops: Vec::new(),
        clear_to: Rgba8Premul::from_straight(comp.background_rgba8),
    })];
    if !ops.is_empty() {
        passes.push(Pass::Scene(ScenePass {
            target: SCENE_SURFACE,
            ops,
            clear_to: Rgba8Premul::transparent(),
        }));
        passes.push(Pass::Composite(CompositePass {
            target: FINAL_SURFACE,
            ops: vec![CompositeOp::Over {
                src: SCENE_SURFACE,
                opacity: 1.0,
            }],
        }));
    }

    Ok(RenderPlan {
        canvas: comp.canvas,
        surfaces: vec![surface.clone(), surface],
        passes,
        final_surface: FINAL_SURFACE,
    })
}

fn compile_node(
    node: &EvaluatedClipNode,
    assets: &PreparedAssetStore,
) -> ReelResult<Option<DrawOp>> {
    let opacity = (node.opacity as f32).clamp(0.0, 1.0);
    if opacity <= 0.0 || node.reveal <= 0.0 {
        return Ok(None);
    }

    let asset_id = assets.id_for_key(&node.asset)?;
    let asset = assets.get(asset_id)?;
    let transform = node.transform * anchor_offset(asset.bounds(), node.anchor);

    let op = match asset {
        PreparedAsset::Path(p) => match p.style {
            // Filled shapes have no stroke to trace; they fade in with the reveal instead.
            PathStyle::Fill => DrawOp::FillPath {
                path: p.path.clone(),
                transform,
                color: p.color,
                opacity: opacity * (node.reveal as f32),
                z: node.z,
            },
            PathStyle::Stroke { width_px } => DrawOp::StrokePath {
                path: trim_path_to_fraction(&p.path, node.reveal, p.length),
                transform,
                color: p.color,
                width: width_px,
                opacity,
                z: node.z,
            },
        },
        PreparedAsset::Text(t) => {
            let glyph_limit = ((t.glyph_count as f64) * node.reveal).ceil() as usize;
            if glyph_limit == 0 {
                return Ok(None);
            }
            DrawOp::Text {
                asset: asset_id,
                transform,
                opacity,
                glyph_limit: glyph_limit.min(t.glyph_count),
                z: node.z,
            }
        }
    };
    Ok(Some(op))
}

/// Translation placing the anchor point of `bounds` at the local origin.
pub fn anchor_offset(bounds: Rect, anchor: Anchor) -> Affine {
    Affine::translate((
        -(bounds.x0 + anchor.x * bounds.width()),
        -(bounds.y0 + anchor.y * bounds.height()),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
