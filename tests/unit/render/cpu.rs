use super::*;
use crate::{
    animation::anim::Anim,
    assets::fonts::ResolvedFont,
    composition::dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    composition::model::{Composition, PathStyle},
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    render::pipeline::render_frame,
};
use std::sync::Arc;

fn no_font() -> ResolvedFont {
    ResolvedFont {
        bytes: Arc::new(Vec::new()),
        index: 0,
        origin: "none".to_string(),
    }
}

fn square_comp(opacity: f64) -> Composition {
    let clip = ClipBuilder::new(
        "sq",
        "sq",
        FrameRange::new(FrameIndex(0), FrameIndex(1)).unwrap(),
    )
    .transform(Anim::constant(Transform2D::at(4.0, 4.0)))
    .opacity(Anim::constant(opacity))
    .build()
    .unwrap();
    CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 16,
            height: 16,
        },
        FrameIndex(1),
    )
    .background([0, 0, 255, 255])
    .path_asset("sq", "M0,0 L8,0 L8,8 L0,8 Z", PathStyle::Fill, [255, 0, 0, 255])
    .unwrap()
    .track(TrackBuilder::new("main").clip(clip).build().unwrap())
    .build()
    .unwrap()
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn fill_is_drawn_over_background() {
    let comp = square_comp(1.0);
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    let mut backend = CpuBackend::new();
    let frame = render_frame(&comp, FrameIndex(0), &mut backend, &store).unwrap();

    assert_eq!(frame.data.len(), 16 * 16 * 4);
    assert_eq!(px(&frame, 8, 8), [255, 0, 0, 255]);
    assert_eq!(px(&frame, 1, 1), [0, 0, 255, 255]);
    assert_eq!(px(&frame, 14, 14), [0, 0, 255, 255]);
}

#[test]
fn opacity_blends_with_background() {
    let comp = square_comp(0.5);
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    let mut backend = CpuBackend::new();
    let frame = render_frame(&comp, FrameIndex(0), &mut backend, &store).unwrap();
    let [r, _, b, a] = px(&frame, 8, 8);
    assert_eq!(a, 255);
    assert!((120..=135).contains(&r), "r={r}");
    assert!((120..=135).contains(&b), "b={b}");
}

#[test]
fn backend_is_reusable_across_frames() {
    let comp = square_comp(1.0);
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    let mut backend = CpuBackend::new();
    let a = render_frame(&comp, FrameIndex(0), &mut backend, &store).unwrap();
    let b = render_frame(&comp, FrameIndex(0), &mut backend, &store).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn oversized_surfaces_are_rejected() {
    let mut backend = CpuBackend::new();
    let desc = SurfaceDesc {
        width: 70_000,
        height: 10,
        format: crate::compile::plan::PixelFormat::Rgba8Premul,
    };
    assert!(backend.ensure_surface(SurfaceId(0), &desc).is_err());
}
