use super::*;

fn range(a: u64, b: u64) -> FrameRange {
    FrameRange::new(FrameIndex(a), FrameIndex(b)).unwrap()
}

#[test]
fn builder_assembles_valid_composition() {
    let clip = ClipBuilder::new("c0", "t0", range(0, 10))
        .anchor(Anchor::CENTER)
        .z_offset(2)
        .build()
        .unwrap();
    let track = TrackBuilder::new("main").z_base(1).clip(clip).build().unwrap();
    let comp = CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 64,
            height: 64,
        },
        FrameIndex(10),
    )
    .background([10, 20, 30, 255])
    .text_asset("t0", "hi", 12.0, [255, 255, 255, 255])
    .unwrap()
    .track(track)
    .build()
    .unwrap();

    assert_eq!(comp.background_rgba8, [10, 20, 30, 255]);
    assert_eq!(comp.tracks[0].z_base, 1);
    assert_eq!(comp.tracks[0].clips[0].z_offset, 2);
}

#[test]
fn duplicate_asset_keys_are_rejected() {
    let b = CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 64,
            height: 64,
        },
        FrameIndex(10),
    )
    .path_asset("p", "M0,0 L1,1", PathStyle::Fill, [255, 255, 255, 255])
    .unwrap();
    assert!(
        b.path_asset("p", "M0,0 L2,2", PathStyle::Fill, [255, 255, 255, 255])
            .is_err()
    );
}

#[test]
fn build_validates_clip_against_duration() {
    let clip = ClipBuilder::new("c0", "t0", range(0, 20)).build().unwrap();
    let track = TrackBuilder::new("main").clip(clip).build().unwrap();
    let res = CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 64,
            height: 64,
        },
        FrameIndex(10),
    )
    .text_asset("t0", "hi", 12.0, [255, 255, 255, 255])
    .unwrap()
    .track(track)
    .build();
    assert!(res.is_err());
}

#[test]
fn empty_names_are_rejected() {
    assert!(TrackBuilder::new("  ").build().is_err());
    assert!(ClipBuilder::new("", "t0", range(0, 1)).build().is_err());
}
