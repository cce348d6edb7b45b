use super::*;

#[test]
fn missing_font_file_is_an_error_with_path() {
    let err = resolve_font(&FontSource::File(PathBuf::from("does/not/exist.ttf"))).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.ttf"));
}

#[test]
fn font_file_bytes_are_read_verbatim() {
    let dir = std::env::temp_dir().join(format!("compound_reel_fonts_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fake.ttf");
    std::fs::write(&path, b"not really a font").unwrap();

    let font = resolve_font(&FontSource::File(path.clone())).unwrap();
    assert_eq!(font.bytes.as_slice(), b"not really a font");
    assert_eq!(font.index, 0);
    assert!(font.origin.ends_with("fake.ttf"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn debug_output_hides_font_bytes() {
    let font = ResolvedFont {
        bytes: Arc::new(vec![0u8; 1024]),
        index: 0,
        origin: "x".to_string(),
    };
    let s = format!("{font:?}");
    assert!(s.contains("bytes_len: 1024"));
}
