use super::*;
use crate::{
    animation::anim::Anim,
    assets::fonts::ResolvedFont,
    composition::dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    eval::evaluator::Evaluator,
    foundation::core::{Fps, FrameIndex, FrameRange, Point, Transform2D},
};
use std::sync::Arc;

fn no_font() -> ResolvedFont {
    ResolvedFont {
        bytes: Arc::new(Vec::new()),
        index: 0,
        origin: "none".to_string(),
    }
}

fn comp(reveal: f64, opacity: f64) -> Composition {
    let range = FrameRange::new(FrameIndex(0), FrameIndex(2)).unwrap();
    let line = ClipBuilder::new("line", "line", range)
        .transform(Anim::constant(Transform2D::at(50.0, 40.0)))
        .anchor(Anchor::CENTER)
        .reveal(Anim::constant(reveal))
        .opacity(Anim::constant(opacity))
        .build()
        .unwrap();
    let square = ClipBuilder::new("square", "square", range)
        .reveal(Anim::constant(reveal))
        .z_offset(1)
        .build()
        .unwrap();
    CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 100,
            height: 80,
        },
        FrameIndex(2),
    )
    .background([10, 20, 30, 255])
    .path_asset("line", "M0,0 L20,0", PathStyle::Stroke { width_px: 2.0 }, [255; 4])
    .unwrap()
    .path_asset("square", "M0,0 L4,0 L4,4 L0,4 Z", PathStyle::Fill, [255, 0, 0, 255])
    .unwrap()
    .track(TrackBuilder::new("t").clip(line).clip(square).build().unwrap())
    .build()
    .unwrap()
}

fn plan_for(comp: &Composition) -> RenderPlan {
    let store = PreparedAssetStore::prepare(comp, no_font()).unwrap();
    let eval = Evaluator::eval_frame(comp, FrameIndex(0)).unwrap();
    compile_frame(comp, &eval, &store).unwrap()
}

fn scene_ops(plan: &RenderPlan) -> &[DrawOp] {
    plan.passes
        .iter()
        .find_map(|p| match p {
            Pass::Scene(s) if s.target == SCENE_SURFACE => Some(s.ops.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
}

#[test]
fn plan_clears_background_then_composites_scene() {
    let plan = plan_for(&comp(1.0, 1.0));
    assert_eq!(plan.surfaces.len(), 2);
    assert_eq!(plan.final_surface, FINAL_SURFACE);
    let Pass::Scene(bg) = &plan.passes[0] else {
        panic!("first pass must clear the background");
    };
    assert_eq!(bg.target, FINAL_SURFACE);
    assert_eq!(bg.clear_to, Rgba8Premul::from_straight([10, 20, 30, 255]));
    assert!(matches!(plan.passes.last(), Some(Pass::Composite(_))));
    assert_eq!(scene_ops(&plan).len(), 2);
}

#[test]
fn anchor_centers_stroked_path_on_translate() {
    let plan = plan_for(&comp(1.0, 1.0));
    let DrawOp::StrokePath { transform, .. } = &scene_ops(&plan)[0] else {
        panic!("expected stroke");
    };
    // Bounds are (-1,-1)..(21,1); the centre (10,0) lands on (50,40).
    let p = *transform * Point::new(10.0, 0.0);
    assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 40.0).abs() < 1e-9);
}

#[test]
fn partial_reveal_trims_strokes_and_fades_fills() {
    let plan = plan_for(&comp(0.5, 1.0));
    let ops = scene_ops(&plan);
    let DrawOp::StrokePath { path, .. } = &ops[0] else {
        panic!("expected stroke");
    };
    assert!((crate::compile::trim::path_length(path) - 10.0).abs() < 1e-6);
    let DrawOp::FillPath { opacity, .. } = &ops[1] else {
        panic!("expected fill");
    };
    assert!((opacity - 0.5).abs() < 1e-6);
}

#[test]
fn nothing_revealed_means_no_scene_pass() {
    let plan = plan_for(&comp(0.0, 1.0));
    assert_eq!(plan.passes.len(), 1);
    assert!(scene_ops(&plan).is_empty());
}

#[test]
fn anchor_offset_uses_bounds_origin() {
    let off = anchor_offset(Rect::new(2.0, 4.0, 12.0, 8.0), Anchor::BOTTOM_LEFT);
    let p = off * Point::new(2.0, 8.0);
    assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
}
