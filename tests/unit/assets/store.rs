use super::*;
use crate::{
    assets::fonts::{FontSource, resolve_font},
    composition::dsl::CompositionBuilder,
    foundation::core::{Canvas, Fps, FrameIndex},
};

fn no_font() -> ResolvedFont {
    ResolvedFont {
        bytes: Arc::new(Vec::new()),
        index: 0,
        origin: "none".to_string(),
    }
}

fn builder() -> CompositionBuilder {
    CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 320,
            height: 180,
        },
        FrameIndex(10),
    )
}

#[test]
fn path_only_compositions_do_not_need_a_font() {
    let comp = builder()
        .path_asset("line", "M0,0 L30,40", PathStyle::Stroke { width_px: 2.0 }, [255; 4])
        .unwrap()
        .build()
        .unwrap();
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    assert!(store.font_family().is_none());

    let id = store.id_for_key("line").unwrap();
    let PreparedAsset::Path(p) = store.get(id).unwrap() else {
        panic!("expected a path");
    };
    assert!((p.length - 50.0).abs() < 1e-6);
}

#[test]
fn stroked_bounds_grow_by_half_the_width() {
    let comp = builder()
        .path_asset("l", "M0,0 L10,0", PathStyle::Stroke { width_px: 4.0 }, [255; 4])
        .unwrap()
        .path_asset("f", "M0,0 L10,0 L10,10 Z", PathStyle::Fill, [255; 4])
        .unwrap()
        .build()
        .unwrap();
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();

    let stroked = store.get(store.id_for_key("l").unwrap()).unwrap().bounds();
    assert_eq!(stroked, Rect::new(-2.0, -2.0, 12.0, 2.0));
    let filled = store.get(store.id_for_key("f").unwrap()).unwrap().bounds();
    assert_eq!(filled, Rect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn identical_assets_share_an_id() {
    let comp = builder()
        .path_asset("a", "M0,0 L1,1", PathStyle::Fill, [255; 4])
        .unwrap()
        .path_asset("b", "M0,0 L1,1", PathStyle::Fill, [255; 4])
        .unwrap()
        .path_asset("c", "M0,0 L1,1", PathStyle::Fill, [0, 0, 0, 255])
        .unwrap()
        .build()
        .unwrap();
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    assert_eq!(store.id_for_key("a").unwrap(), store.id_for_key("b").unwrap());
    assert_ne!(store.id_for_key("a").unwrap(), store.id_for_key("c").unwrap());
}

#[test]
fn unknown_key_and_bad_path_data_are_errors() {
    let comp = builder()
        .path_asset("bad", "M0,0 X5", PathStyle::Fill, [255; 4])
        .unwrap()
        .build()
        .unwrap();
    assert!(PreparedAssetStore::prepare(&comp, no_font()).is_err());

    let comp = builder().build().unwrap();
    let store = PreparedAssetStore::prepare(&comp, no_font()).unwrap();
    assert!(store.id_for_key("nope").is_err());
}

#[test]
fn text_needs_a_parseable_font() {
    let comp = builder()
        .text_asset("t", "hi", 24.0, [255; 4])
        .unwrap()
        .build()
        .unwrap();
    assert!(PreparedAssetStore::prepare(&comp, no_font()).is_err());
}

#[test]
fn text_is_shaped_and_measured_with_a_system_font() {
    let Ok(font) = resolve_font(&FontSource::System) else {
        return;
    };
    let comp = builder()
        .text_asset("t", "Year 1", 24.0, [255; 4])
        .unwrap()
        .build()
        .unwrap();
    let store = PreparedAssetStore::prepare(&comp, font).unwrap();
    let PreparedAsset::Text(t) = store.get(store.id_for_key("t").unwrap()).unwrap() else {
        panic!("expected text");
    };
    assert!(t.glyph_count >= 5);
    assert!(t.width > 0.0 && t.height > 0.0);
    assert!(store.font_family().is_some());
}
