use super::*;
use crate::composition::model::Asset;

fn texts(comp: &Composition) -> Vec<String> {
    comp.assets
        .values()
        .filter_map(|a| match a {
            Asset::Text(t) => Some(t.text.clone()),
            Asset::Path(_) => None,
        })
        .collect()
}

#[test]
fn default_run_lasts_fifty_two_and_a_half_seconds() {
    let comp = build_explainer(&Scenario::default(), &ExplainerStyle::default()).unwrap();
    assert_eq!(comp.duration.0, 1575);
    assert_eq!(comp.canvas.width, 1280);
    assert_eq!(comp.tracks.len(), 1);
}

#[test]
fn on_screen_numbers_come_from_the_scenario() {
    let comp = build_explainer(&Scenario::default(), &ExplainerStyle::default()).unwrap();
    let all = texts(&comp);
    for expected in [
        "Example: $1000 invested at 10.0% for 5 years",
        "$1000",
        "$1500.00",
        "$1610.51",
        "Difference: $110.51",
        "Year 0: $1000.00",
        "Year 1: $1000.00 × (1 + 0.1) = $1100.00",
        "Year 5: $1464.10 × (1 + 0.1) = $1610.51",
        "Interest earned: $146.41",
        "= 1000 [(1 + 0.1)⁵ - 1]",
        "= 1000 [1.61051 - 1]",
        "= 1000 × 0.61051",
        "= 610.51",
    ] {
        assert!(all.iter().any(|t| t == expected), "missing '{expected}'");
    }
}

#[test]
fn another_scenario_changes_rows_and_running_time() {
    let sc = Scenario::new(2500.0, 0.05, 3).unwrap();
    let comp = build_explainer(&sc, &ExplainerStyle::default()).unwrap();
    // Two fewer breakdown rows at 1.5 s each.
    assert_eq!(comp.duration.0, 1575 - 2 * 45);

    let all = texts(&comp);
    assert!(all.iter().any(|t| t == "Example: $2500 invested at 5.0% for 3 years"));
    assert!(all.iter().any(|t| t == "= 2500 [(1 + 0.05)³ - 1]"));
    assert!(!all.iter().any(|t| t.starts_with("Year 4")));
}

#[test]
fn zero_years_still_builds() {
    let sc = Scenario::new(1000.0, 0.1, 0).unwrap();
    let comp = build_explainer(&sc, &ExplainerStyle::default()).unwrap();
    assert!(comp.validate().is_ok());
}

#[test]
fn invalid_scenarios_are_rejected() {
    let sc = Scenario {
        principal: -1.0,
        rate: 0.1,
        years: 5,
    };
    assert!(build_explainer(&sc, &ExplainerStyle::default()).is_err());
}

#[test]
fn mobjects_stay_inside_the_frame() {
    let comp = build_explainer(&Scenario::default(), &ExplainerStyle::default()).unwrap();
    for clip in &comp.tracks[0].clips {
        let crate::animation::anim::Anim::Keyframes(kf) = &clip.props.transform;
        let t = kf.keys[0].value.translate;
        assert!(
            (0.0..=1280.0).contains(&t.x) && (0.0..=720.0).contains(&t.y),
            "{} is placed off screen at {t:?}",
            clip.id
        );
    }
}

#[test]
fn superscripts() {
    assert_eq!(superscript(5), "⁵");
    assert_eq!(superscript(10), "¹⁰");
}

fn span_ending(comp: &Composition, name: &str) -> crate::foundation::core::FrameRange {
    let suffix = format!("-{name}");
    let spans = crate::explainer::stage::timeline(comp);
    let (_, ranges) = spans
        .iter()
        .find(|(key, _)| key.ends_with(&suffix))
        .unwrap_or_else(|| panic!("no asset named '{name}'"));
    assert_eq!(ranges.len(), 1, "{name}");
    ranges[0]
}

#[test]
fn axes_stay_up_through_the_breakdown() {
    let comp = build_explainer(&Scenario::default(), &ExplainerStyle::default()).unwrap();
    let axes = span_ending(&comp, "axes");
    let difference = span_ending(&comp, "difference");
    let first_row = span_ending(&comp, "year-0");
    let example = span_ending(&comp, "example");

    assert!(axes.end > difference.end);
    assert!(axes.contains(first_row.start));
    assert_eq!(axes.end, first_row.end);
    assert_eq!(axes.end, example.end);
    // Breakdown fade-out finishes at 39.5 s.
    assert_eq!(axes.end.0, 1185);
}
