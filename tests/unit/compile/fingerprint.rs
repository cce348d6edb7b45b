use super::*;
use crate::{
    animation::anim::Anim,
    animation::ease::Ease,
    composition::dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    composition::model::{Composition, PathStyle},
    eval::evaluator::Evaluator,
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange},
};

fn comp_with_reveal(reveal: Anim<f64>) -> Composition {
    let clip = ClipBuilder::new(
        "c0",
        "p0",
        FrameRange::new(FrameIndex(0), FrameIndex(4)).unwrap(),
    )
    .reveal(reveal)
    .build()
    .unwrap();
    CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 64,
            height: 64,
        },
        FrameIndex(4),
    )
    .path_asset("p0", "M0,0 L10,0 L10,10", PathStyle::Stroke { width_px: 2.0 }, [255; 4])
    .unwrap()
    .track(TrackBuilder::new("main").clip(clip).build().unwrap())
    .build()
    .unwrap()
}

#[test]
fn fingerprint_is_deterministic_for_same_eval() {
    let comp = comp_with_reveal(Anim::constant(1.0));
    let eval = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
    assert_eq!(fingerprint_eval(&eval), fingerprint_eval(&eval));
}

#[test]
fn static_frames_share_a_fingerprint() {
    let comp = comp_with_reveal(Anim::constant(1.0));
    let a = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
    let b = Evaluator::eval_frame(&comp, FrameIndex(3)).unwrap();
    assert_eq!(fingerprint_eval(&a), fingerprint_eval(&b));
}

#[test]
fn fingerprint_changes_while_revealing() {
    let comp = comp_with_reveal(Anim::linear([(0, 0.0, Ease::Linear), (3, 1.0, Ease::Linear)]));
    let a = Evaluator::eval_frame(&comp, FrameIndex(1)).unwrap();
    let b = Evaluator::eval_frame(&comp, FrameIndex(2)).unwrap();
    assert_ne!(fingerprint_eval(&a), fingerprint_eval(&b));
}
