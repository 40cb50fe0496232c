// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule mark generation.
//!
//! A "rule" is a stroked polyline: scale lines, tick marks, turning lines and isopleths are all
//! rules.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{BezPath, Point};

use crate::axis::StrokeStyle;
use crate::mark::{Mark, MarkKind, PathMark};
use crate::z_order;

/// A rule mark spec (a stroked polyline).
#[derive(Clone, Debug)]
pub struct RuleMarkSpec {
    /// Vertices in paper coordinates.
    pub points: Vec<Point>,
    /// Stroke paint and width.
    pub stroke: StrokeStyle,
    /// Rendering order hint (see [`crate::z_order`]).
    pub z_index: i32,
}

impl RuleMarkSpec {
    /// Creates a new rule between two points.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self::polyline([p0, p1])
    }

    /// Creates a rule through several points.
    pub fn polyline(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
            stroke: StrokeStyle::default(),
            z_index: z_order::SCALE_RULES,
        }
    }

    /// Sets the stroke style.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates the rule mark.
    pub fn mark(&self) -> Mark {
        let mut p = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            p.move_to(*first);
            for pt in points {
                p.line_to(*pt);
            }
        }
        Mark {
            z_index: self.z_index,
            kind: MarkKind::Path(PathMark {
                path: p,
                stroke: self.stroke.clone(),
            }),
        }
    }
}
