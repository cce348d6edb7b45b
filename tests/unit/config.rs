use super::*;

#[test]
fn defaults_describe_the_classic_run() {
    let cfg = ReelConfig::default();
    assert_eq!(cfg.scenario, Scenario::default());
    assert_eq!(
        cfg.canvas,
        Canvas {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(cfg.fps, 30);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.font_source(), FontSource::System);
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let json = r#"{ "scenario": { "principal": 500.0, "rate": 0.07, "years": 8 }, "fps": 24 }"#;
    let cfg: ReelConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.scenario.years, 8);
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.canvas.height, 720);
    assert!(cfg.threading.static_frame_elision);
    assert_eq!(cfg.style().unwrap().fps, Fps::new(24, 1).unwrap());
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<ReelConfig>(r#"{ "principle": 1 }"#).is_err());
}

#[test]
fn validation_catches_encoder_constraints() {
    let odd = ReelConfig {
        canvas: Canvas {
            width: 1281,
            height: 720,
        },
        ..ReelConfig::default()
    };
    assert!(odd.validate().is_err());

    let no_fps = ReelConfig {
        fps: 0,
        ..ReelConfig::default()
    };
    assert!(no_fps.validate().is_err());

    let bad_rate = ReelConfig {
        scenario: Scenario {
            principal: 1000.0,
            rate: -0.1,
            years: 5,
        },
        ..ReelConfig::default()
    };
    assert!(bad_rate.validate().is_err());
}

#[test]
fn load_reads_a_file_and_reports_missing_ones() {
    let dir = std::env::temp_dir().join(format!("compound-reel-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("reel.json");
    std::fs::write(&path, r#"{ "font_path": "fonts/Inter.ttf" }"#).unwrap();

    let cfg = ReelConfig::load(&path).unwrap();
    assert_eq!(
        cfg.font_source(),
        FontSource::File(PathBuf::from("fonts/Inter.ttf"))
    );

    let missing = ReelConfig::load(&dir.join("nope.json")).unwrap_err();
    assert!(missing.to_string().contains("nope.json"));
    let _ = std::fs::remove_dir_all(&dir);
}
