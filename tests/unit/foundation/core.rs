use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert!(r.is_empty());
    assert_eq!(r.len_frames(), 0);
}

#[test]
fn fps_rejects_zero_terms() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30000, 1001).unwrap().as_f64(), 30000.0 / 1001.0);
}

#[test]
fn fps_round_absorbs_float_noise() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(0.1 + 0.2), 9);
    assert_eq!(fps.secs_to_frames_round(2.5), 75);
}

#[test]
fn straight_to_premul_scales_channels() {
    let c = Rgba8Premul::from_straight([255, 128, 0, 128]);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 64);
    assert_eq!(c.b, 0);
    assert_eq!(Rgba8Premul::transparent(), Rgba8Premul::from_straight([9, 9, 9, 0]));
}

#[test]
fn transform_rotates_about_anchor() {
    let t = Transform2D {
        rotation_rad: std::f64::consts::PI,
        anchor: Vec2::new(1.0, 0.0),
        ..Transform2D::default()
    };
    let p = t.to_affine() * kurbo::Point::new(2.0, 0.0);
    assert!((p.x - 0.0).abs() < 1e-9 && p.y.abs() < 1e-9);
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let t = Transform2D::default();
    assert_eq!(t.to_affine(), kurbo::Affine::IDENTITY);

    let t = Transform2D::at(10.0, -2.5);
    assert_eq!(
        t.to_affine(),
        kurbo::Affine::translate(Vec2::new(10.0, -2.5))
    );
}
