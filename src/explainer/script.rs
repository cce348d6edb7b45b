use crate::{
    composition::model::{Composition, PathStyle},
    explainer::{
        graph::{AxesGroup, AxesSpec, AxisRange, dot, nice_step, polyline, smooth_path_through},
        mobject::{ApproxMetrics, Dir, Mobject, Placeable, TextMetrics, arrange_down},
        space::Space,
        stage::{Action, MobjectId, Stage},
    },
    finance::{
        amounts::{
            Scenario, compare, compound_amounts, compound_interest, growth_factor,
            simple_amounts, year_breakdown,
        },
        format::{decimal, money, money_whole, percent},
    },
    foundation::core::{Canvas, Fps, Point, Rect, Vec2},
    foundation::error::ReelResult,
};

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const BLUE: [u8; 4] = [0x58, 0xC4, 0xDD, 255];
pub const GREEN: [u8; 4] = [0x83, 0xC1, 0x67, 255];
pub const YELLOW: [u8; 4] = [0xFF, 0xFF, 0x00, 255];

const FORMULA: &str = "Compound Interest = P [(1 + i)ⁿ - 1]";
const FORMULA_LHS: &str = "Compound Interest ";
/// Stagger between items of a group written together.
const GROUP_LAG: f64 = 0.5;
const DOT_RADIUS_UNITS: f64 = 0.08;
const PLOT_STROKE: f64 = 4.0;
const GRAPH_SCALE: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Output format and palette of the explainer.
pub struct ExplainerStyle {
    pub canvas: Canvas,
    pub fps: Fps,
    pub background_rgba8: [u8; 4],
    pub text_rgba8: [u8; 4],
    pub simple_rgba8: [u8; 4],
    pub compound_rgba8: [u8; 4],
    pub highlight_rgba8: [u8; 4],
}

impl Default for ExplainerStyle {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            fps: Fps { num: 30, den: 1 },
            background_rgba8: [0, 0, 0, 255],
            text_rgba8: WHITE,
            simple_rgba8: BLUE,
            compound_rgba8: GREEN,
            highlight_rgba8: YELLOW,
        }
    }
}

/// Build the explainer with estimated text extents.
///
/// Prefer [`build_explainer_with`] and a [`crate::assets::store::TextLayoutEngine`] when the font
/// is available; it lines rows up on the real glyph advances.
pub fn build_explainer(scenario: &Scenario, style: &ExplainerStyle) -> ReelResult<Composition> {
    build_explainer_with(scenario, style, &mut ApproxMetrics)
}

/// Build the full explainer composition for `scenario`.
#[tracing::instrument(skip(style, metrics))]
pub fn build_explainer_with(
    scenario: &Scenario,
    style: &ExplainerStyle,
    metrics: &mut dyn TextMetrics,
) -> ReelResult<Composition> {
    scenario.validate()?;
    let mut s = Script::new(style, metrics);

    let title = s.title()?;
    s.definition(title)?;
    s.formula(title)?;
    let example = s.example(scenario, title)?;
    let graph = s.graph(scenario)?;
    let axes = s.difference(scenario, graph)?;
    let rows = s.breakdown(scenario, example)?;
    s.final_formula(scenario, title, example, &rows, &axes)?;
    s.remember()?;

    s.stage.finish()
}

/// Ids shown on the graph that later sections fade out.
struct GraphIds {
    axes: Vec<MobjectId>,
    plotted: Vec<MobjectId>,
    last_simple_dot: Rect,
    last_compound_dot: Rect,
}

struct Script<'a> {
    stage: Stage,
    space: Space,
    style: &'a ExplainerStyle,
    metrics: &'a mut dyn TextMetrics,
}

impl<'a> Script<'a> {
    fn new(style: &'a ExplainerStyle, metrics: &'a mut dyn TextMetrics) -> Self {
        Self {
            stage: Stage::new(style.fps, style.canvas, style.background_rgba8),
            space: Space::new(style.canvas),
            style,
            metrics,
        }
    }

    fn frame(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.style.canvas.width),
            f64::from(self.style.canvas.height),
        )
    }

    fn buff(&self, units: f64) -> f64 {
        self.space.units_to_px(units)
    }

    fn text(
        &mut self,
        name: &str,
        text: &str,
        font_size: f64,
        color: [u8; 4],
    ) -> ReelResult<Mobject> {
        let px = self.space.font_px(font_size);
        let mut m = Mobject::text(name, text, px, color, &mut *self.metrics)?;
        m.move_to(self.space.center());
        Ok(m)
    }

    fn white(&mut self, name: &str, text: &str, font_size: f64) -> ReelResult<Mobject> {
        let c = self.style.text_rgba8;
        self.text(name, text, font_size, c)
    }

    fn add_all(&mut self, ms: Vec<Mobject>) -> Vec<MobjectId> {
        ms.into_iter().map(|m| self.stage.add(m)).collect()
    }

    fn fade_out(&mut self, ids: &[MobjectId]) -> ReelResult<()> {
        let actions: Vec<Action> = ids.iter().copied().map(Action::FadeOut).collect();
        self.stage.play(&actions, 1.0)
    }

    fn bbox(&self, id: MobjectId) -> ReelResult<Rect> {
        Ok(self.stage.mobject(id)?.bbox())
    }

    fn title(&mut self) -> ReelResult<MobjectId> {
        let mut title = self.white("title", "Understanding Compound Interest", 42.0)?;
        title.to_edge(self.frame(), Dir::Up, self.buff(Space::EDGE_BUFF));
        let title = self.stage.add(title);
        self.stage.play(&[Action::Write(title)], 1.0)?;
        Ok(title)
    }

    fn definition(&mut self, title: MobjectId) -> ReelResult<()> {
        let title_box = self.bbox(title)?;
        let mut definition =
            self.white("definition", "Compound interest is interest on both:", 32.0)?;
        definition.next_to(title_box, Dir::Down, self.buff(0.75));

        let mut bullets = vec![
            self.white("bullet-principal", "• The initial principal", 28.0)?,
            self.white("bullet-interest", "• Previously accumulated interest", 28.0)?,
        ];
        arrange_down(&mut bullets, self.buff(Space::NEXT_TO_BUFF), true);
        bullets.next_to(definition.bbox(), Dir::Down, self.buff(0.5));
        bullets.align_to(definition.bbox(), Dir::Left);

        let definition = self.stage.add(definition);
        let bullets = self.add_all(bullets);

        self.stage.play(&[Action::Write(definition)], 1.0)?;
        let writes: Vec<Action> = bullets.iter().copied().map(Action::Write).collect();
        self.stage.play_lagged(&writes, 2.0, GROUP_LAG)?;
        self.stage.wait(1.0)?;

        let mut all = vec![definition];
        all.extend(bullets);
        self.fade_out(&all)
    }

    fn formula(&mut self, title: MobjectId) -> ReelResult<()> {
        let title_box = self.bbox(title)?;
        let mut heading = self.white("formula-title", "The Formula", 36.0)?;
        heading.next_to(title_box, Dir::Down, self.buff(0.75));
        let mut formula = self.white("formula", FORMULA, 40.0)?;
        formula.next_to(heading.bbox(), Dir::Down, self.buff(0.5));

        let mut variables = vec![
            self.white("var-p", "P = principal (initial investment)", 28.0)?,
            self.white("var-i", "i = annual interest rate (decimal)", 28.0)?,
            self.white("var-n", "n = number of compounding periods", 28.0)?,
        ];
        arrange_down(&mut variables, self.buff(Space::NEXT_TO_BUFF), true);
        variables.next_to(formula.bbox(), Dir::Down, self.buff(0.75));

        let heading = self.stage.add(heading);
        let formula = self.stage.add(formula);
        let variables = self.add_all(variables);

        self.stage.play(&[Action::Write(heading)], 1.0)?;
        self.stage.play(&[Action::Write(formula)], 1.0)?;
        let writes: Vec<Action> = variables.iter().copied().map(Action::Write).collect();
        self.stage.play_lagged(&writes, 2.0, GROUP_LAG)?;
        self.stage.wait(2.0)?;

        let mut all = vec![heading, formula];
        all.extend(variables);
        self.fade_out(&all)
    }

    fn example(&mut self, sc: &Scenario, title: MobjectId) -> ReelResult<MobjectId> {
        let title_box = self.bbox(title)?;
        let line = format!(
            "Example: {} invested at {} for {} years",
            money_whole(sc.principal),
            percent(sc.rate),
            sc.years
        );
        let mut example = self.white("example", &line, 32.0)?;
        example.next_to(title_box, Dir::Down, self.buff(0.75));
        let example = self.stage.add(example);
        self.stage.play(&[Action::Write(example)], 1.0)?;
        self.stage.wait(1.0)?;
        Ok(example)
    }

    fn graph(&mut self, sc: &Scenario) -> ReelResult<GraphIds> {
        let simple = simple_amounts(sc).amounts();
        let compound = compound_amounts(sc).amounts();

        let top = simple
            .iter()
            .chain(compound.iter())
            .copied()
            .fold(sc.principal, f64::max);
        let y_step = nice_step(top / 4.0, false);
        let y_max = (top / y_step).ceil().max(1.0) * y_step;
        let years = f64::from(sc.years);
        let spec = AxesSpec {
            x: AxisRange::new(0.0, years + 0.5, nice_step(years / 6.0, true))?,
            y: AxisRange::new(0.0, y_max, y_step)?,
            x_label: "Years",
            y_label: "Amount ($)",
            color: self.style.text_rgba8,
        };
        let mut group = AxesGroup::build(&self.space, &spec, &mut *self.metrics)?;
        let pivot = group.bbox().center();
        group.scale_about(GRAPH_SCALE, pivot);
        group.to_edge(self.frame(), Dir::Down, self.buff(Space::EDGE_BUFF));
        let axes = group.axes;

        let simple_pts: Vec<Point> = simple
            .iter()
            .enumerate()
            .map(|(t, a)| axes.coords_to_point(t as f64, *a))
            .collect();
        let compound_pts: Vec<Point> = compound
            .iter()
            .enumerate()
            .map(|(t, a)| axes.coords_to_point(t as f64, *a))
            .collect();

        let radius = self.buff(DOT_RADIUS_UNITS);
        let stroke = PathStyle::Stroke {
            width_px: self.space.stroke_px(PLOT_STROKE),
        };
        let (blue, green) = (self.style.simple_rgba8, self.style.compound_rgba8);

        let simple_dots = dots("simple-dot", &simple_pts, radius, blue)?;
        let compound_dots = dots("compound-dot", &compound_pts, radius, green)?;
        let first_dot = simple_dots[0].bbox();
        let last_simple_dot = simple_dots[simple_dots.len() - 1].bbox();
        let last_compound_dot = compound_dots[compound_dots.len() - 1].bbox();

        let simple_ends = [simple_pts[0], simple_pts[simple_pts.len() - 1]];
        let simple_line = Mobject::path("simple-line", polyline(&simple_ends), stroke, blue)?;
        let compound_curve = Mobject::path(
            "compound-curve",
            smooth_path_through(&compound_pts),
            stroke,
            green,
        )?;

        let buff = self.buff(Space::NEXT_TO_BUFF);
        let simple_end = simple_ends[1];
        let compound_end = compound_pts[compound_pts.len() - 1];
        // The two end points sit close together for small rates; the simple label hangs below
        // its point and the compound label sits above its own.
        let mut simple_label = self.text("simple-label", "Simple Interest", 20.0, blue)?;
        simple_label.next_to(Rect::from_points(simple_end, simple_end), Dir::Right, buff);
        simple_label.shift(Vec2::new(0.0, simple_end.y - simple_label.bbox().y0));
        let mut compound_label = self.text("compound-label", "Compound Interest", 20.0, green)?;
        compound_label.next_to(Rect::from_points(compound_end, compound_end), Dir::Right, buff);
        compound_label.shift(Vec2::new(0.0, compound_end.y - compound_label.bbox().y1));

        let mut start_label = self.white("start-label", &money_whole(sc.principal), 20.0)?;
        start_label.next_to(first_dot, Dir::Up, buff);

        let axes_ids = self.add_all(group.into_mobjects());
        let simple_dot_ids = self.add_all(simple_dots);
        let compound_dot_ids = self.add_all(compound_dots);
        let simple_line = self.stage.add(simple_line);
        let compound_curve = self.stage.add(compound_curve);
        let simple_label = self.stage.add(simple_label);
        let compound_label = self.stage.add(compound_label);
        let start_label = self.stage.add(start_label);

        let mut draw = vec![Action::Create(axes_ids[0])];
        draw.extend(axes_ids[1..].iter().copied().map(Action::Write));
        self.stage.play(&draw, 1.0)?;

        self.stage.play(&[Action::FadeIn(simple_dot_ids[0])], 1.0)?;
        self.stage.play(&[Action::Write(start_label)], 1.0)?;
        self.stage.wait(0.5)?;

        let mut line = vec![Action::Create(simple_line)];
        line.extend(simple_dot_ids[1..].iter().copied().map(Action::FadeIn));
        self.stage.play(&line, 2.0)?;
        self.stage.play(&[Action::Write(simple_label)], 1.0)?;

        let mut curve = vec![Action::Create(compound_curve)];
        curve.extend(compound_dot_ids.iter().copied().map(Action::FadeIn));
        self.stage.play(&curve, 2.0)?;
        self.stage.play(&[Action::Write(compound_label)], 1.0)?;
        self.stage.wait(1.0)?;

        let mut plotted = simple_dot_ids;
        plotted.extend(compound_dot_ids);
        plotted.extend([
            simple_line,
            compound_curve,
            simple_label,
            compound_label,
            start_label,
        ]);
        Ok(GraphIds {
            axes: axes_ids,
            plotted,
            last_simple_dot,
            last_compound_dot,
        })
    }

    /// Returns the axes, which stay up behind the breakdown rows.
    fn difference(&mut self, sc: &Scenario, graph: GraphIds) -> ReelResult<Vec<MobjectId>> {
        let cmp = compare(sc);
        let buff = self.buff(Space::NEXT_TO_BUFF);
        let (blue, green, yellow) = (
            self.style.simple_rgba8,
            self.style.compound_rgba8,
            self.style.highlight_rgba8,
        );

        // Below the simple end point so the two totals never collide.
        let mut simple_final = self.text("simple-final", &money(cmp.simple_final), 20.0, blue)?;
        simple_final.next_to(graph.last_simple_dot, Dir::Down, buff);
        let mut compound_final =
            self.text("compound-final", &money(cmp.compound_final), 20.0, green)?;
        compound_final.next_to(graph.last_compound_dot, Dir::Up, buff);

        let diff_line = format!("Difference: {}", money(cmp.difference));
        let mut diff = self.text("difference", &diff_line, 24.0, yellow)?;
        diff.to_edge(self.frame(), Dir::Right, self.buff(Space::EDGE_BUFF));
        diff.shift(self.space.offset(0.0, 1.0));

        let simple_final = self.stage.add(simple_final);
        let compound_final = self.stage.add(compound_final);
        let diff = self.stage.add(diff);

        self.stage.play(
            &[Action::Write(simple_final), Action::Write(compound_final)],
            1.0,
        )?;
        self.stage.play(&[Action::Write(diff)], 1.0)?;
        self.stage.wait(1.0)?;

        let mut all = vec![diff, simple_final, compound_final];
        all.extend(graph.plotted);
        self.fade_out(&all)?;
        Ok(graph.axes)
    }

    fn breakdown(
        &mut self,
        sc: &Scenario,
        example: MobjectId,
    ) -> ReelResult<Vec<Vec<MobjectId>>> {
        let yellow = self.style.highlight_rgba8;
        let rate = decimal(sc.rate, 6);
        let mut rows: Vec<Vec<Mobject>> = Vec::new();
        for step in year_breakdown(sc) {
            let name = format!("year-{}", step.year);
            if step.year == 0 {
                let line = format!("Year 0: {}", money(step.closing));
                rows.push(vec![self.white(&name, &line, 28.0)?]);
                continue;
            }
            let line = format!(
                "Year {}: {} × (1 + {rate}) = {}",
                step.year,
                money(step.opening),
                money(step.closing)
            );
            let calc = self.white(&name, &line, 28.0)?;
            let earned = format!("Interest earned: {}", money(step.interest_earned));
            let mut interest = self.text(&format!("{name}-interest"), &earned, 24.0, yellow)?;
            interest.next_to(calc.bbox(), Dir::Right, self.buff(0.5));
            rows.push(vec![calc, interest]);
        }

        arrange_down(&mut rows, self.buff(0.4), true);
        let example_box = self.bbox(example)?;
        rows.next_to(example_box, Dir::Down, self.buff(0.75));

        // Long runs get more rows than fit; shrink them into the space under the example.
        let floor = self.frame().y1 - self.buff(Space::EDGE_BUFF);
        let b = rows.bbox();
        if b.y1 > floor && b.height() > 0.0 {
            let factor = (floor - b.y0) / b.height();
            let pivot = Point::new(b.center().x, b.y0);
            for m in rows.iter_mut().flatten() {
                m.scale_about(factor, pivot);
            }
        }

        let ids: Vec<Vec<MobjectId>> = rows.into_iter().map(|row| self.add_all(row)).collect();
        for row in &ids {
            let writes: Vec<Action> = row.iter().copied().map(Action::Write).collect();
            self.stage.play(&writes, 1.0)?;
            self.stage.wait(0.5)?;
        }
        Ok(ids)
    }

    fn final_formula(
        &mut self,
        sc: &Scenario,
        title: MobjectId,
        example: MobjectId,
        rows: &[Vec<MobjectId>],
        axes: &[MobjectId],
    ) -> ReelResult<()> {
        let mut leaving: Vec<MobjectId> = rows.iter().flatten().copied().collect();
        leaving.extend_from_slice(axes);
        leaving.push(example);
        self.fade_out(&leaving)?;

        let p = decimal(sc.principal, 2);
        let growth = growth_factor(sc);
        let lines = [
            FORMULA.to_string(),
            format!(
                "= {p} [(1 + {}){} - 1]",
                decimal(sc.rate, 6),
                superscript(sc.years)
            ),
            format!("= {p} [{} - 1]", decimal(growth, 5)),
            format!("= {p} × {}", decimal(growth - 1.0, 5)),
            format!("= {}", decimal(compound_interest(sc), 2)),
        ];

        let px = self.space.font_px(32.0);
        let (lhs_width, _) = self.metrics.measure(FORMULA_LHS, px)?;
        let mut formula = Vec::with_capacity(lines.len());
        for (k, line) in lines.iter().enumerate() {
            formula.push(self.white(&format!("final-formula-{k}"), line, 32.0)?);
        }
        arrange_down(&mut formula, self.buff(Space::NEXT_TO_BUFF), true);
        // Continuation lines start under the first line's "=".
        let eq_x = formula[0].bbox().x0 + lhs_width;
        for m in formula.iter_mut().skip(1) {
            let dx = eq_x - m.bbox().x0;
            m.shift(Vec2::new(dx, 0.0));
        }
        let title_box = self.bbox(title)?;
        formula.next_to(title_box, Dir::Down, self.buff(1.0));

        let yellow = self.style.highlight_rgba8;
        let mut conclusion = self.text(
            "conclusion",
            "The power of compound interest grows over time!",
            32.0,
            yellow,
        )?;
        conclusion.next_to(formula.bbox(), Dir::Down, self.buff(1.0));

        let formula = self.add_all(formula);
        let conclusion = self.stage.add(conclusion);

        let writes: Vec<Action> = formula.iter().copied().map(Action::Write).collect();
        self.stage.play_lagged(&writes, 3.0, GROUP_LAG)?;
        self.stage.wait(1.0)?;
        self.stage.play(&[Action::Write(conclusion)], 1.0)?;
        self.stage.wait(2.0)?;

        let mut all = vec![title];
        all.extend(formula);
        all.push(conclusion);
        self.fade_out(&all)
    }

    fn remember(&mut self) -> ReelResult<()> {
        let mut display = vec![
            self.white("remember", "Remember:", 36.0)?,
            self.white("remember-formula", FORMULA, 48.0)?,
        ];
        arrange_down(&mut display, self.buff(0.75), false);
        display.move_to(self.space.center());

        let ids = self.add_all(display);
        let writes: Vec<Action> = ids.iter().copied().map(Action::Write).collect();
        self.stage.play(&writes, 1.0)?;
        self.stage.wait(2.0)?;
        self.fade_out(&ids)?;
        self.stage.wait(1.0)
    }
}

fn dots(name: &str, points: &[Point], radius: f64, color: [u8; 4]) -> ReelResult<Vec<Mobject>> {
    points
        .iter()
        .enumerate()
        .map(|(t, p)| {
            Mobject::path(
                format!("{name}-{t}"),
                dot(*p, radius),
                PathStyle::Fill,
                color,
            )
        })
        .collect()
}

/// `n` written with Unicode superscript digits.
pub fn superscript(n: u32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    n.to_string()
        .bytes()
        .map(|b| DIGITS[usize::from(b - b'0')])
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/explainer/script.rs"]
mod tests;
