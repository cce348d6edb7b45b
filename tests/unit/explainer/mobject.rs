use super::*;

fn label(text: &str) -> Mobject {
    Mobject::text("label", text, 20.0, [255; 4], &mut ApproxMetrics).unwrap()
}

#[test]
fn approx_metrics_scale_with_length_and_size() {
    let (w, h) = ApproxMetrics.measure("abcd", 10.0).unwrap();
    assert!((w - 22.0).abs() < 1e-9);
    assert!((h - 12.0).abs() < 1e-9);
    assert!(ApproxMetrics.measure("x", 0.0).is_err());
}

#[test]
fn next_to_leaves_the_buffer_and_centres_across() {
    let target = Rect::new(100.0, 100.0, 200.0, 150.0);
    let mut m = label("ab");
    m.next_to(target, Dir::Down, 10.0);
    let b = m.bbox();
    assert!((b.y0 - 160.0).abs() < 1e-9);
    assert!((b.center().x - 150.0).abs() < 1e-9);

    m.next_to(target, Dir::Right, 5.0);
    let b = m.bbox();
    assert!((b.x0 - 205.0).abs() < 1e-9);
    assert!((b.center().y - 125.0).abs() < 1e-9);
}

#[test]
fn to_edge_and_align_to() {
    let frame = Rect::new(0.0, 0.0, 1280.0, 720.0);
    let mut m = label("title");
    m.to_edge(frame, Dir::Up, 45.0);
    assert!((m.bbox().y0 - 45.0).abs() < 1e-9);
    m.to_edge(frame, Dir::Right, 45.0);
    assert!((m.bbox().x1 - 1235.0).abs() < 1e-9);

    m.align_to(Rect::new(10.0, 0.0, 20.0, 5.0), Dir::Left);
    assert!((m.bbox().x0 - 10.0).abs() < 1e-9);
}

#[test]
fn rotated_text_swaps_its_extents() {
    let m = label("Amount").rotated(-std::f64::consts::FRAC_PI_2);
    let b = m.bbox();
    assert!((b.width() - m.size.y).abs() < 1e-9);
    assert!((b.height() - m.size.x).abs() < 1e-9);
}

#[test]
fn paths_are_stored_centred_and_placed_where_drawn() {
    let mut p = BezPath::new();
    p.move_to((10.0, 10.0));
    p.line_to((30.0, 10.0));
    let m = Mobject::path("line", p, PathStyle::Stroke { width_px: 2.0 }, [255; 4]).unwrap();
    assert_eq!(m.center, Point::new(20.0, 10.0));
    assert_eq!(m.bbox(), Rect::new(9.0, 9.0, 31.0, 11.0));

    let back = m.canvas_path().unwrap();
    assert_eq!(back.elements()[0], kurbo::PathEl::MoveTo(Point::new(10.0, 10.0)));

    assert!(Mobject::path("e", BezPath::new(), PathStyle::Fill, [255; 4]).is_err());
}

#[test]
fn scaling_moves_towards_the_pivot_and_keeps_stroke_width() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((100.0, 0.0));
    let mut line =
        Mobject::path("line", p, PathStyle::Stroke { width_px: 4.0 }, [255; 4]).unwrap();
    line.scale_about(0.5, Point::ZERO);
    assert_eq!(line.center, Point::new(25.0, 0.0));
    assert!((line.size.x - 54.0).abs() < 1e-9);
    assert!((line.size.y - 4.0).abs() < 1e-9);

    let mut t = label("abc");
    let w = t.size.x;
    t.scale_about(0.5, Point::ZERO);
    let Content::Text { size_px, .. } = t.content else {
        panic!("expected text");
    };
    assert_eq!(size_px, 10.0);
    assert!((t.size.x - w / 2.0).abs() < 1e-9);
}

#[test]
fn arrange_down_stacks_and_aligns_left() {
    let mut items = vec![label("wide line"), label("a"), label("mid")];
    items[0].move_to(Point::new(300.0, 100.0));
    arrange_down(&mut items, 8.0, true);

    let left = items[0].bbox().x0;
    for pair in items.windows(2) {
        let (a, b) = (pair[0].bbox(), pair[1].bbox());
        assert!((b.y0 - a.y1 - 8.0).abs() < 1e-9);
        assert!((b.x0 - left).abs() < 1e-9);
    }
}

#[test]
fn groups_move_as_one() {
    let mut row = vec![label("Year 1"), label("+100")];
    let first = row[0].bbox();
    row[1].next_to(first, Dir::Right, 10.0);
    let before = row.bbox();
    row.move_to(Point::new(0.0, 0.0));
    let after = row.bbox();
    assert!((after.width() - before.width()).abs() < 1e-9);
    assert!(after.center().distance(Point::ZERO) < 1e-9);
    assert_eq!(row[..].bbox(), after);
}
