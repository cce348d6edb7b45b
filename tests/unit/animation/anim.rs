use super::*;

fn ctx(frame: u64) -> SampleCtx {
    SampleCtx {
        frame: FrameIndex(frame),
        fps: Fps::new(30, 1).unwrap(),
        clip_local: FrameIndex(frame),
    }
}

#[test]
fn keyframes_hold_is_constant_between_keys() {
    let anim = Anim::Keyframes(Keyframes {
        keys: vec![
            Keyframe {
                frame: FrameIndex(0),
                value: 1.0,
                ease: Ease::Linear,
            },
            Keyframe {
                frame: FrameIndex(10),
                value: 3.0,
                ease: Ease::Linear,
            },
        ],
        mode: InterpMode::Hold,
        default: None,
    });
    assert_eq!(anim.sample(ctx(5)).unwrap(), 1.0);
    assert_eq!(anim.sample(ctx(10)).unwrap(), 3.0);
}

#[test]
fn linear_helper_interpolates_and_clamps() {
    let anim = Anim::linear([(0, 0.0, Ease::Linear), (10, 10.0, Ease::Linear)]);
    assert_eq!(anim.sample(ctx(5)).unwrap(), 5.0);
    assert_eq!(anim.sample(ctx(40)).unwrap(), 10.0);
    assert!(!anim.is_static());
    assert!(Anim::constant(2.0).is_static());
}

#[test]
fn leading_frames_hold_first_key() {
    let anim = Anim::linear([(4, 1.0, Ease::Smooth), (8, 0.0, Ease::Linear)]);
    assert_eq!(anim.sample(ctx(0)).unwrap(), 1.0);
    assert_eq!(anim.sample(ctx(8)).unwrap(), 0.0);
}

#[test]
fn unsorted_keys_fail_validation() {
    let anim = Anim::linear([(8, 1.0, Ease::Linear), (4, 0.0, Ease::Linear)]);
    assert!(anim.validate().is_err());
}

#[test]
fn empty_keys_use_default() {
    let anim: Anim<f64> = Anim::Keyframes(Keyframes {
        keys: vec![],
        mode: InterpMode::Linear,
        default: Some(0.25),
    });
    assert!(anim.validate().is_ok());
    assert_eq!(anim.sample(ctx(3)).unwrap(), 0.25);
}

#[test]
fn transform_lerp_moves_translation() {
    let a = Transform2D::at(0.0, 0.0);
    let b = Transform2D::at(10.0, 20.0);
    let mid = <Transform2D as Lerp>::lerp(&a, &b, 0.5);
    assert_eq!(mid.translate, Vec2::new(5.0, 10.0));
}
