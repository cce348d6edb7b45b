use std::collections::HashMap;

use crate::{
    assets::store::{PreparedAsset, PreparedAssetStore},
    compile::plan::{
        CompositeOp, CompositePass, DrawOp, RenderPlan, ScenePass, SurfaceDesc, SurfaceId,
    },
    foundation::core::{Affine, BezPath, Point, Rgba8Premul},
    foundation::error::{ReelError, ReelResult},
    render::backend::{FrameRGBA, RenderBackend},
    render::composite::{fill, over_in_place},
    render::passes::PassBackend,
};

/// CPU rasterizer built on `vello_cpu`.
#[derive(Default)]
pub struct CpuBackend {
    surfaces: HashMap<SurfaceId, CpuSurface>,
    scratch: Option<CpuSurface>,
    // Keyed by the address of the shared font bytes so a backend can outlive one store.
    font: Option<(usize, vello_cpu::peniko::FontData)>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuSurface {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach a surface so it can be drawn into while other surfaces are read.
    fn take_surface(&mut self, id: SurfaceId) -> ReelResult<CpuSurface> {
        self.surfaces
            .remove(&id)
            .ok_or_else(|| ReelError::evaluation(format!("surface {} was never declared", id.0)))
    }

    fn font_data(&mut self, assets: &PreparedAssetStore) -> vello_cpu::peniko::FontData {
        let font = assets.font();
        let key = std::sync::Arc::as_ptr(&font.bytes) as usize;
        if let Some((k, data)) = &self.font
            && *k == key
        {
            return data.clone();
        }
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            font.index,
        );
        self.font = Some((key, data.clone()));
        data
    }
}

impl PassBackend for CpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> ReelResult<()> {
        let (width, height) = surface_size(desc)?;
        match self.surfaces.get_mut(&id) {
            Some(surface) if surface.width == width && surface.height == height => {}
            Some(surface) => *surface = CpuSurface::new(width, height),
            None => {
                self.surfaces.insert(id, CpuSurface::new(width, height));
            }
        }
        Ok(())
    }

    fn exec_scene(&mut self, pass: &ScenePass, assets: &PreparedAssetStore) -> ReelResult<()> {
        let mut surface = self.take_surface(pass.target)?;

        let Rgba8Premul { r, g, b, a } = pass.clear_to;
        fill(surface.pixmap.data_as_u8_slice_mut(), [r, g, b, a]);

        if !pass.ops.is_empty() {
            let mut scratch = match self.scratch.take() {
                Some(s) if s.width == surface.width && s.height == surface.height => s,
                _ => CpuSurface::new(surface.width, surface.height),
            };

            let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
            let drawn = pass
                .ops
                .iter()
                .try_for_each(|op| draw_op(self, &mut ctx, op, assets));
            if let Err(e) = drawn {
                self.surfaces.insert(pass.target, surface);
                return Err(e);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut scratch.pixmap);

            over_in_place(
                surface.pixmap.data_as_u8_slice_mut(),
                scratch.pixmap.data_as_u8_slice(),
                1.0,
            )?;
            self.scratch = Some(scratch);
        }

        self.surfaces.insert(pass.target, surface);
        Ok(())
    }

    fn exec_composite(&mut self, pass: &CompositePass) -> ReelResult<()> {
        let mut dst = self.take_surface(pass.target)?;
        let result = pass.ops.iter().try_for_each(|op| match *op {
            CompositeOp::Over { src, opacity } => {
                let src = self.surfaces.get(&src).ok_or_else(|| {
                    ReelError::evaluation(format!("surface {} was never declared", src.0))
                })?;
                over_in_place(
                    dst.pixmap.data_as_u8_slice_mut(),
                    src.pixmap.data_as_u8_slice(),
                    opacity,
                )
            }
        });
        self.surfaces.insert(pass.target, dst);
        result
    }

    fn readback_rgba8(&mut self, surface: SurfaceId, plan: &RenderPlan) -> ReelResult<FrameRGBA> {
        let data = self
            .surfaces
            .get(&surface)
            .map(|s| s.pixmap.data_as_u8_slice().to_vec())
            .ok_or_else(|| {
                ReelError::evaluation(format!("surface {} was never declared", surface.0))
            })?;
        // Drop surfaces a larger earlier plan declared.
        let declared = plan.surfaces.len() as u32;
        self.surfaces.retain(|id, _| id.0 < declared);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data,
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {}

/// `vello_cpu` pixmaps are addressed with `u16`.
fn surface_size(desc: &SurfaceDesc) -> ReelResult<(u16, u16)> {
    match (u16::try_from(desc.width), u16::try_from(desc.height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ReelError::evaluation(format!(
            "{}x{} is too large for the CPU rasterizer",
            desc.width, desc.height
        ))),
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    assets: &PreparedAssetStore,
) -> ReelResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let opacity = op.opacity();
    if opacity <= 0.0 {
        return Ok(());
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    match op {
        DrawOp::FillPath {
            path,
            transform,
            color,
            ..
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_path(&bezpath_to_cpu(path));
        }
        DrawOp::StrokePath {
            path,
            transform,
            color,
            width,
            ..
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            ctx.stroke_path(&bezpath_to_cpu(path));
        }
        DrawOp::Text {
            asset,
            transform,
            glyph_limit,
            ..
        } => {
            let PreparedAsset::Text(t) = assets.get(*asset)? else {
                return Err(ReelError::evaluation("text draw op points at a path asset"));
            };

            let font = backend.font_data(assets);
            ctx.set_transform(affine_to_cpu(*transform));

            let mut remaining = *glyph_limit;
            'lines: for line in t.layout.lines() {
                for item in line.items() {
                    if remaining == 0 {
                        break 'lines;
                    }
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let glyphs = run
                        .positioned_glyphs()
                        .take(remaining)
                        .map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        })
                        .collect::<Vec<_>>();
                    remaining -= glyphs.len();
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs.into_iter());
                }
            }
        }
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    if c.a == 0 {
        return vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0);
    }
    let a = u32::from(c.a);
    let unpremul = |v: u8| ((u32::from(v) * 255 + a / 2) / a).min(255) as u8;
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
