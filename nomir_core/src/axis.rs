// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale line mark generation.
//!
//! A scale is drawn as its line, one tick per kept tick value, labels for the labeled levels and
//! a title past the upper end of the line. All lengths here are paper units: the line itself is
//! mapped through the page transform first, then ticks and labels are laid out around it.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use hashbrown::HashSet;
use kurbo::{Affine, Point, Vec2};
use peniko::Brush;
use peniko::color::palette::css;

use crate::mark::{Mark, TextAnchor, TextBaseline};
use crate::measure::TextMeasurer;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::{Scale, TickSide};
use crate::text_mark::TextMarkSpec;
use crate::topology::AxisLine;
use crate::z_order;

/// Labels closer than this many label extents (along the line) crowd each other.
const LABEL_SPACING: f64 = 1.1;

/// A paint + width pair for stroked paths (scale lines, ticks, isopleths).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in paper units.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 0.02)
    }
}

/// Scale styling defaults. Lengths and font sizes are in paper units (cm).
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Style for the scale line and tick marks.
    pub rule: StrokeStyle,
    /// Tick length per level; deeper levels reuse the last entry.
    pub tick_lengths: [f64; 4],
    /// Gap between the end of a tick and its label.
    pub label_offset: f64,
    /// Fill paint for tick labels.
    pub label_fill: Brush,
    /// Label font size per labeled level; deeper levels reuse the last entry.
    pub label_font_sizes: [f64; 3],
    /// Fill paint for the scale title.
    pub title_fill: Brush,
    /// Font size for the scale title.
    pub title_font_size: f64,
    /// Distance from the upper end of the line to the title.
    pub title_offset: f64,
    /// Minimum distance between ticks when smart thinning is on.
    pub min_tick_spacing: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let rule = StrokeStyle::default();
        Self {
            rule: rule.clone(),
            tick_lengths: [0.4, 0.3, 0.2, 0.15],
            label_offset: 0.1,
            label_fill: rule.brush.clone(),
            label_font_sizes: [0.35, 0.28, 0.22],
            title_fill: rule.brush,
            title_font_size: 0.45,
            title_offset: 0.35,
            min_tick_spacing: 0.06,
        }
    }
}

impl AxisStyle {
    /// Tick length for `level`.
    pub fn tick_length(&self, level: usize) -> f64 {
        self.tick_lengths[level.min(self.tick_lengths.len() - 1)]
    }

    /// Label font size for `level`.
    pub fn label_font_size(&self, level: usize) -> f64 {
        self.label_font_sizes[level.min(self.label_font_sizes.len() - 1)]
    }

    /// Sets the rule stroke.
    pub fn with_rule(mut self, rule: StrokeStyle) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the tick lengths per level.
    pub fn with_tick_lengths(mut self, tick_lengths: [f64; 4]) -> Self {
        self.tick_lengths = tick_lengths;
        self
    }

    /// Sets the label font sizes per level.
    pub fn with_label_font_sizes(mut self, sizes: [f64; 3]) -> Self {
        self.label_font_sizes = sizes;
        self
    }

    /// Sets the title font size.
    pub fn with_title_font_size(mut self, size: f64) -> Self {
        self.title_font_size = size;
        self
    }

    /// Sets the smart-thinning tick spacing.
    pub fn with_min_tick_spacing(mut self, spacing: f64) -> Self {
        self.min_tick_spacing = spacing;
        self
    }
}

/// A line mapped onto paper.
#[derive(Clone, Copy, Debug)]
struct PaperLine {
    p0: Point,
    p1: Point,
    /// Unit vector from `p0` to `p1`.
    dir: Vec2,
    /// Unit normal on the tick side.
    normal: Vec2,
}

impl PaperLine {
    fn new(line: &AxisLine, to_paper: Affine, side: TickSide) -> Option<Self> {
        let (a, b) = line.endpoints();
        let (p0, p1) = (to_paper * a, to_paper * b);
        let along = p1 - p0;
        let len = along.hypot();
        if !(len.is_finite() && len > 0.0) {
            return None;
        }
        let dir = along / len;
        let mut left = Vec2::new(-dir.y, dir.x);
        if left.x > 1e-9 || (left.x.abs() <= 1e-9 && left.y < 0.0) {
            left = -left;
        }
        let normal = match side {
            TickSide::Left => left,
            TickSide::Right => -left,
        };
        Some(Self {
            p0,
            p1,
            dir,
            normal,
        })
    }

    fn along(&self, p: Point) -> f64 {
        (p - self.p0).dot(self.dir)
    }

    /// The end of the line that sits higher in the text frame, and the outward direction there.
    fn upper_end(&self, text_up: Vec2) -> (Point, Vec2) {
        if self.dir.dot(text_up) >= 0.0 {
            (self.p1, self.dir)
        } else {
            (self.p0, -self.dir)
        }
    }
}

fn rotate(v: Vec2, degrees: f64) -> Vec2 {
    let (s, c) = (degrees.to_radians().sin(), degrees.to_radians().cos());
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Marks for a scale line.
pub(crate) struct ScaleAxis<'a> {
    pub(crate) scale: &'a Scale,
    pub(crate) line: &'a AxisLine,
    pub(crate) side: TickSide,
    pub(crate) style: &'a AxisStyle,
    /// Rotation of the page's x axis, in degrees; labels follow it.
    pub(crate) text_angle: f64,
}

impl ScaleAxis<'_> {
    pub(crate) fn marks(&self, to_paper: Affine, measurer: &dyn TextMeasurer) -> Vec<Mark> {
        let mut out = Vec::new();
        let Some(paper) = PaperLine::new(self.line, to_paper, self.side) else {
            tracing::warn!(title = %self.scale.spec().title, "scale line collapses on paper");
            return out;
        };
        out.push(
            RuleMarkSpec::new(paper.p0, paper.p1)
                .with_stroke(self.style.rule.clone())
                .mark(),
        );

        let ticks = self.scale.ticks();
        let positions: Vec<Point> = ticks
            .iter()
            .map(|t| to_paper * self.line.placement.point_for(t.fn_value))
            .collect();
        let along: Vec<f64> = positions.iter().map(|p| paper.along(*p)).collect();
        let smart = self.scale.spec().smart;

        let mut order: Vec<usize> = (0..ticks.len()).collect();
        order.sort_by_key(|&i| ticks[i].level);

        let kept_ticks = if smart {
            thin_ticks(&order, &along, |i| ticks[i].level, self.style.min_tick_spacing)
        } else {
            alloc::vec![true; ticks.len()]
        };

        for (i, tick) in ticks.iter().enumerate() {
            if !kept_ticks[i] {
                continue;
            }
            let len = self.style.tick_length(tick.level);
            out.push(
                RuleMarkSpec::new(positions[i], positions[i] + paper.normal * len)
                    .with_stroke(self.style.rule.clone())
                    .mark(),
            );
        }

        // Label placement in the text frame.
        let normal_t = rotate(paper.normal, -self.text_angle);
        let dir_t = rotate(paper.dir, -self.text_angle);
        let (anchor, baseline) = if normal_t.x > 0.3 {
            (TextAnchor::Start, TextBaseline::Middle)
        } else if normal_t.x < -0.3 {
            (TextAnchor::End, TextBaseline::Middle)
        } else if normal_t.y > 0.0 {
            (TextAnchor::Middle, TextBaseline::Bottom)
        } else {
            (TextAnchor::Middle, TextBaseline::Top)
        };

        let mut placed: Vec<(f64, f64)> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for &i in &order {
            let tick = &ticks[i];
            let Some(label) = tick.label.as_deref() else {
                continue;
            };
            if !kept_ticks[i] {
                continue;
            }
            let font_size = self.style.label_font_size(tick.level);
            if smart {
                let (w, h) = measurer.measure(label, font_size);
                let extent = dir_t.x.abs() * w + dir_t.y.abs() * h;
                let crowded = placed
                    .iter()
                    .any(|(s, e)| (along[i] - s).abs() < 0.5 * (extent + e) * LABEL_SPACING);
                if crowded || !seen.insert(label) {
                    continue;
                }
                placed.push((along[i], extent));
            }
            let offset = self.style.tick_length(tick.level) + self.style.label_offset;
            out.push(
                TextMarkSpec::new(positions[i] + paper.normal * offset, String::from(label))
                    .with_font_size(font_size)
                    .with_fill(self.style.label_fill.clone())
                    .with_anchor(anchor)
                    .with_baseline(baseline)
                    .with_angle(self.text_angle)
                    .with_z_index(z_order::SCALE_LABELS)
                    .mark(),
            );
        }

        let title = &self.scale.spec().title;
        if !title.is_empty() {
            out.push(title_mark(
                &paper,
                title,
                self.style,
                self.text_angle,
                z_order::SCALE_TITLES,
            ));
        }
        out
    }
}

/// Marks for an unlabeled turning line and its optional title.
pub(crate) fn reference_marks(
    line: &AxisLine,
    title: Option<&str>,
    stroke: &StrokeStyle,
    style: &AxisStyle,
    to_paper: Affine,
    text_angle: f64,
) -> Vec<Mark> {
    let mut out = Vec::new();
    let Some(paper) = PaperLine::new(line, to_paper, TickSide::Right) else {
        return out;
    };
    out.push(
        RuleMarkSpec::new(paper.p0, paper.p1)
            .with_stroke(stroke.clone())
            .with_z_index(z_order::REFERENCE_LINES)
            .mark(),
    );
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        out.push(title_mark(
            &paper,
            title,
            style,
            text_angle,
            z_order::SCALE_TITLES,
        ));
    }
    out
}

fn title_mark(
    paper: &PaperLine,
    title: &str,
    style: &AxisStyle,
    text_angle: f64,
    z_index: i32,
) -> Mark {
    let up = rotate(Vec2::new(0.0, 1.0), text_angle);
    let (end, outward) = paper.upper_end(up);
    TextMarkSpec::new(end + outward * style.title_offset, String::from(title))
        .with_font_size(style.title_font_size)
        .with_fill(style.title_fill.clone())
        .with_anchor(TextAnchor::Middle)
        .with_baseline(TextBaseline::Bottom)
        .with_angle(text_angle)
        .with_z_index(z_index)
        .mark()
}

/// Keeps ticks in `order` (coarse levels first) unless they land within `min_spacing` of an
/// already kept tick. Level-0 ticks are always kept.
fn thin_ticks(
    order: &[usize],
    along: &[f64],
    level: impl Fn(usize) -> usize,
    min_spacing: f64,
) -> Vec<bool> {
    let mut keep = alloc::vec![false; along.len()];
    let mut kept: Vec<f64> = Vec::with_capacity(along.len());
    for &i in order {
        let s = along[i];
        let at = kept.partition_point(|&k| k < s);
        let crowded = level(i) > 0
            && (at > 0 && s - kept[at - 1] < min_spacing
                || at < kept.len() && kept[at] - s < min_spacing);
        if !crowded {
            kept.insert(at, s);
            keep[i] = true;
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;
    use crate::mark::MarkKind;
    use crate::measure::HeuristicTextMeasurer;
    use crate::scale::ScaleSpec;
    use crate::topology::{LineKind, Topology};

    fn count_marks(marks: &[Mark]) -> (usize, Vec<&str>) {
        let mut rules = 0;
        let mut texts = Vec::new();
        for m in marks {
            match &m.kind {
                MarkKind::Path(_) => rules += 1,
                MarkKind::Text(t) => texts.push(t.text.as_str()),
            }
        }
        (rules, texts)
    }

    fn single_line(spec: ScaleSpec, length: f64) -> (Scale, AxisLine) {
        let scale = spec.build().unwrap();
        let scales = [scale.clone(), scale.clone(), scale.clone()];
        let layout = Topology::Type1.arrange(1.0, length, &scales).unwrap();
        (scale, layout.lines[0])
    }

    #[test]
    fn smart_thinning_drops_crowded_fine_ticks() {
        let spec = ScaleSpec::new(0.0, 100.0, |u| u).with_tick_levels(3, 1);
        let style = AxisStyle::default();
        let (scale, line) = single_line(spec.clone(), 0.5);
        assert_eq!(line.kind, LineKind::Scale(0));
        let axis = ScaleAxis {
            scale: &scale,
            line: &line,
            side: TickSide::Left,
            style: &style,
            text_angle: 0.0,
        };
        let marks = axis.marks(Affine::IDENTITY, &HeuristicTextMeasurer);
        let (smart_rules, _) = count_marks(&marks);

        let (plain, plain_line) = single_line(spec.with_smart(false), 0.5);
        let axis = ScaleAxis {
            scale: &plain,
            line: &plain_line,
            side: TickSide::Left,
            style: &style,
            text_angle: 0.0,
        };
        let marks = axis.marks(Affine::IDENTITY, &HeuristicTextMeasurer);
        let (plain_rules, _) = count_marks(&marks);
        // Line plus one tick per tick value.
        assert_eq!(plain_rules, 1 + plain.ticks().len());
        assert!(smart_rules < plain_rules, "{smart_rules} vs {plain_rules}");
        // Major ticks survive.
        let majors = scale.ticks().iter().filter(|t| t.level == 0).count();
        assert!(smart_rules > majors);
    }

    #[test]
    fn labels_sit_on_the_requested_side() {
        let style = AxisStyle::default();
        let (scale, line) = single_line(ScaleSpec::new(0.0, 5.0, |u| u).with_title("x"), 10.0);
        for (side, expect_left) in [(TickSide::Left, true), (TickSide::Right, false)] {
            let axis = ScaleAxis {
                scale: &scale,
                line: &line,
                side,
                style: &style,
                text_angle: 0.0,
            };
            let marks = axis.marks(Affine::IDENTITY, &HeuristicTextMeasurer);
            let (_, texts) = count_marks(&marks);
            assert_eq!(texts, ["0", "1", "2", "3", "4", "5", "x"]);
            for m in &marks {
                if let MarkKind::Text(t) = &m.kind
                    && t.text != "x"
                {
                    assert_eq!(t.pos.x < 0.0, expect_left, "{t:?}");
                }
            }
        }
    }

    #[test]
    fn crowded_labels_are_thinned() {
        let style = AxisStyle::default();
        let (scale, line) = single_line(ScaleSpec::new(0.0, 5.0, |u| u).with_tick_levels(2, 2), 1.0);
        let axis = ScaleAxis {
            scale: &scale,
            line: &line,
            side: TickSide::Right,
            style: &style,
            text_angle: 0.0,
        };
        let marks = axis.marks(Affine::IDENTITY, &HeuristicTextMeasurer);
        let (_, texts) = count_marks(&marks);
        let labeled = scale.ticks().iter().filter(|t| t.label.is_some()).count();
        assert!(texts.len() < labeled, "{texts:?}");
        assert!(texts.contains(&"0"));
    }

    #[test]
    fn thin_ticks_keeps_level_zero() {
        let along = [0.0, 0.01, 0.02, 1.0];
        let keep = thin_ticks(&[0, 2, 1, 3], &along, |i| usize::from(i == 1), 0.5);
        assert_eq!(keep, [true, false, true, true]);
    }
}
