use crate::{
    assets::store::PreparedAssetStore,
    compile::plan::{CompositePass, Pass, RenderPlan, ScenePass, SurfaceDesc, SurfaceId},
    foundation::error::{ReelError, ReelResult},
    render::backend::FrameRGBA,
};

/// Per-pass execution hooks a rasterizer provides to [`execute_plan`].
pub trait PassBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> ReelResult<()>;

    fn exec_scene(&mut self, pass: &ScenePass, assets: &PreparedAssetStore) -> ReelResult<()>;

    fn exec_composite(&mut self, pass: &CompositePass) -> ReelResult<()>;

    fn readback_rgba8(&mut self, surface: SurfaceId, plan: &RenderPlan) -> ReelResult<FrameRGBA>;
}

/// Run every pass of `plan` in order and read back its final surface.
pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
    assets: &PreparedAssetStore,
) -> ReelResult<FrameRGBA> {
    for (idx, desc) in plan.surfaces.iter().enumerate() {
        let id = SurfaceId(
            idx.try_into()
                .map_err(|_| ReelError::evaluation("surface id overflow"))?,
        );
        backend.ensure_surface(id, desc)?;
    }

    for pass in &plan.passes {
        match pass {
            Pass::Scene(p) => backend.exec_scene(p, assets)?,
            Pass::Composite(p) => backend.exec_composite(p)?,
        }
    }

    backend.readback_rgba8(plan.final_surface, plan)
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
