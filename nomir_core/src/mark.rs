// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The in-memory drawing a page composes into.
//!
//! Marks are already in paper coordinates (centimetres, y up). Emitters walk
//! [`Drawing::sorted`] and translate each mark into their document format.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Rect, Shape};
use peniko::Brush;

use crate::axis::StrokeStyle;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};

/// Horizontal alignment of a text run relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Text starts at the position.
    Start,
    /// Text is centered on the position.
    Middle,
    /// Text ends at the position.
    End,
}

/// Vertical alignment of a text run relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Top of the text at the position.
    Top,
    /// Vertical center of the text at the position.
    Middle,
    /// Alphabetic baseline at the position.
    Alphabetic,
    /// Bottom of the text at the position.
    Bottom,
}

/// A stroked, unfilled path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMark {
    /// Geometry in paper coordinates.
    pub path: BezPath,
    /// Stroke paint and width.
    pub stroke: StrokeStyle,
}

/// A single run of unshaped text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextMark {
    /// Anchor position in paper coordinates.
    pub pos: Point,
    /// Text content.
    pub text: String,
    /// Font size in paper units.
    pub font_size: f64,
    /// Counter-clockwise rotation in degrees.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

/// Mark payload.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkKind {
    /// A stroked path.
    Path(PathMark),
    /// A text run.
    Text(TextMark),
}

/// A drawable element with a paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Paint order; higher values are drawn later. See [`crate::z_order`].
    pub z_index: i32,
    /// What to draw.
    pub kind: MarkKind,
}

impl Mark {
    /// Rough bounds of the mark in paper coordinates.
    ///
    /// Text bounds use [`HeuristicTextMeasurer`] and ignore rotation beyond its bounding box.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            MarkKind::Path(p) => p.path.bounding_box().inflate(
                0.5 * p.stroke.stroke_width,
                0.5 * p.stroke.stroke_width,
            ),
            MarkKind::Text(t) => estimate_text_bounds(&HeuristicTextMeasurer, t),
        }
    }
}

/// Bounding box of a text mark using `measurer`, including its rotation.
pub fn estimate_text_bounds(measurer: &dyn TextMeasurer, text: &TextMark) -> Rect {
    let (w, h) = measurer.measure(&text.text, text.font_size);
    let x0 = match text.anchor {
        TextAnchor::Start => 0.0,
        TextAnchor::Middle => -0.5 * w,
        TextAnchor::End => -w,
    };
    // Paper frame is y-up: "top" sits above the anchor.
    let y0 = match text.baseline {
        TextBaseline::Top => -h,
        TextBaseline::Middle => -0.5 * h,
        TextBaseline::Alphabetic => -0.2 * h,
        TextBaseline::Bottom => 0.0,
    };
    let local = Rect::new(x0, y0, x0 + w, y0 + h);
    let rotate = kurbo::Affine::translate(text.pos.to_vec2())
        * kurbo::Affine::rotate(text.angle.to_radians());
    rotate.transform_rect_bbox(local)
}

/// An ordered collection of marks in paper coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drawing {
    marks: Vec<Mark>,
}

impl Drawing {
    /// Creates an empty drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mark.
    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Appends several marks.
    pub fn extend(&mut self, marks: impl IntoIterator<Item = Mark>) {
        self.marks.extend(marks);
    }

    /// Marks in insertion order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the drawing has no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Marks in paint order: by `z_index`, ties broken by insertion order.
    pub fn sorted(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.iter().collect();
        // Stable sort keeps insertion order among equal z-indices.
        out.sort_by_key(|m| m.z_index);
        out
    }

    /// Union of all mark bounds, if the drawing is not empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.marks
            .iter()
            .map(Mark::bounds)
            .reduce(|a, b| a.union(b))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::rule_mark::RuleMarkSpec;
    use crate::text_mark::TextMarkSpec;
    use crate::z_order;

    #[test]
    fn sorted_orders_by_z_then_insertion() {
        let mut drawing = Drawing::new();
        drawing.push(
            TextMarkSpec::new(Point::new(0.0, 0.0), "a")
                .with_z_index(z_order::TITLES)
                .mark(),
        );
        drawing.push(RuleMarkSpec::new(Point::ORIGIN, Point::new(1.0, 0.0)).mark());
        drawing.push(
            TextMarkSpec::new(Point::new(0.0, 0.0), "b")
                .with_z_index(z_order::TITLES)
                .mark(),
        );
        let sorted = drawing.sorted();
        assert!(matches!(sorted[0].kind, MarkKind::Path(_)));
        let texts: std::vec::Vec<_> = sorted
            .iter()
            .filter_map(|m| match &m.kind {
                MarkKind::Text(t) => Some(t.text.as_str()),
                MarkKind::Path(_) => None,
            })
            .collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn text_bounds_follow_anchor() {
        let mark = TextMarkSpec::new(Point::new(10.0, 5.0), "abcd")
            .with_font_size(1.0)
            .with_anchor(TextAnchor::End)
            .with_baseline(TextBaseline::Bottom);
        let MarkKind::Text(t) = mark.mark().kind else {
            panic!("expected text");
        };
        let r = estimate_text_bounds(&HeuristicTextMeasurer, &t);
        assert!((r.x1 - 10.0).abs() < 1e-12);
        assert!((r.x0 - 7.6).abs() < 1e-12);
        assert!((r.y0 - 5.0).abs() < 1e-12);
        assert!((r.y1 - 6.0).abs() < 1e-12);
    }
}
