use crate::{
    assets::store::PreparedAssetStore,
    compile::plan::RenderPlan,
    foundation::error::ReelResult,
    render::passes::{PassBackend, execute_plan},
};

#[derive(Clone, Debug)]
/// Rendered frame pixels in row-major RGBA8.
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// `true` when RGB channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels, as PNG and most image tools expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// A [`PassBackend`] that can render whole plans.
pub trait RenderBackend: PassBackend {
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        assets: &PreparedAssetStore,
    ) -> ReelResult<FrameRGBA> {
        execute_plan(self, plan, assets)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// `vello_cpu` rasterizer.
    #[default]
    Cpu,
}

pub fn create_backend(kind: BackendKind) -> ReelResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
    }
}
