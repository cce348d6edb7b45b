use super::*;
use crate::foundation::core::Vec2;

fn basic_comp() -> Composition {
    let mut assets = BTreeMap::new();
    assets.insert(
        "t0".to_string(),
        Asset::Text(TextAsset {
            text: "hello".to_string(),
            size_px: 32.0,
            color_rgba8: [255, 255, 255, 255],
        }),
    );
    Composition {
        fps: Fps::new(30, 1).unwrap(),
        canvas: Canvas {
            width: 1280,
            height: 720,
        },
        duration: FrameIndex(60),
        background_rgba8: [0, 0, 0, 255],
        assets,
        tracks: vec![Track {
            name: "main".to_string(),
            z_base: 0,
            clips: vec![Clip {
                id: "c0".to_string(),
                asset: "t0".to_string(),
                range: FrameRange::new(FrameIndex(0), FrameIndex(60)).unwrap(),
                props: ClipProps {
                    transform: Anim::constant(Transform2D {
                        translate: Vec2::new(10.0, 20.0),
                        ..Transform2D::default()
                    }),
                    opacity: Anim::constant(1.0),
                    reveal: Anim::constant(1.0),
                    anchor: Anchor::CENTER,
                },
                z_offset: 0,
            }],
        }],
    }
}

#[test]
fn json_roundtrip_keeps_assets_and_anchor() {
    let comp = basic_comp();
    let s = serde_json::to_string_pretty(&comp).unwrap();
    let de: Composition = serde_json::from_str(&s).unwrap();
    assert_eq!(de.canvas.width, 1280);
    assert_eq!(de.assets, comp.assets);
    assert_eq!(de.tracks[0].clips[0].props.anchor, Anchor::CENTER);
}

#[test]
fn reveal_and_anchor_default_when_missing_from_json() {
    let mut v = serde_json::to_value(basic_comp()).unwrap();
    let props = v["tracks"][0]["clips"][0]["props"].as_object_mut().unwrap();
    props.remove("reveal");
    props.remove("anchor");
    let de: Composition = serde_json::from_value(v).unwrap();
    assert_eq!(de.tracks[0].clips[0].props.anchor, Anchor::TOP_LEFT);
    assert!(de.tracks[0].clips[0].props.reveal.is_static());
}

#[test]
fn validate_rejects_missing_asset() {
    let mut comp = basic_comp();
    comp.tracks[0].clips[0].asset = "missing".to_string();
    assert!(comp.validate().is_err());
}

#[test]
fn validate_rejects_out_of_bounds_range() {
    let mut comp = basic_comp();
    comp.tracks[0].clips[0].range = FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(999),
    };
    assert!(comp.validate().is_err());
}

#[test]
fn validate_rejects_bad_fps() {
    let mut comp = basic_comp();
    comp.fps = Fps { num: 30, den: 0 };
    assert!(comp.validate().is_err());
}

#[test]
fn validate_rejects_duplicate_clip_ids() {
    let mut comp = basic_comp();
    let dup = comp.tracks[0].clips[0].clone();
    comp.tracks[0].clips.push(dup);
    assert!(comp.validate().is_err());
}

#[test]
fn validate_rejects_degenerate_assets() {
    let mut comp = basic_comp();
    comp.assets.insert(
        "p0".to_string(),
        Asset::Path(PathAsset {
            svg_path_d: "M0,0 L10,0".to_string(),
            style: PathStyle::Stroke { width_px: 0.0 },
            color_rgba8: [255, 255, 255, 255],
        }),
    );
    assert!(comp.validate().is_err());

    let mut comp = basic_comp();
    comp.assets.insert(
        "t1".to_string(),
        Asset::Text(TextAsset {
            text: "x".to_string(),
            size_px: f32::NAN,
            color_rgba8: [255, 255, 255, 255],
        }),
    );
    assert!(comp.validate().is_err());
}
