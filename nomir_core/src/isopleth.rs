// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isopleth solving.
//!
//! An isopleth query names a value for every scale of a block, with at most one left unknown.
//! Known values fix points on their lines; every stage with two fixed lines fixes the third by
//! intersection, until nothing changes. The unknown's line parameter is then mapped back through
//! its placement and its scale function.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use crate::axis::StrokeStyle;
use crate::error::{NomoError, NomoResult};
use crate::placement::collinearity_residual;
use crate::scale::Scale;
use crate::topology::{BlockLayout, Stage};

/// Relative tolerance for the collinearity check, scaled by the larger block dimension.
pub const COLLINEARITY_TOLERANCE: f64 = 1e-6;

/// How solved isopleths are stroked.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoplethStyle {
    /// Stroke for every stage polyline.
    pub stroke: StrokeStyle,
}

impl Default for IsoplethStyle {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle::solid(peniko::color::palette::css::RED, 0.02),
        }
    }
}

/// One entry of an isopleth query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IsoValue {
    /// A value on the scale's domain.
    Known(f64),
    /// The value to solve for.
    Unknown,
}

impl From<f64> for IsoValue {
    fn from(value: f64) -> Self {
        Self::Known(value)
    }
}

/// A sample isopleth: one value per scale of a block.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoplethQuery {
    /// Values in scale order.
    pub values: Vec<IsoValue>,
}

impl IsoplethQuery {
    /// Creates a query from per-scale values.
    pub fn new(values: impl IntoIterator<Item = IsoValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Creates a query with every value known.
    pub fn known(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(IsoValue::Known))
    }

    /// Index of the unknown entry, if any.
    pub fn unknown_index(&self) -> Option<usize> {
        self.values.iter().position(|v| *v == IsoValue::Unknown)
    }
}

/// A solved isopleth.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoplethSolution {
    /// Every scale's value, with the unknown filled in.
    pub values: Vec<f64>,
    /// Index and value of the solved scale, if the query had an unknown.
    pub solved: Option<(usize, f64)>,
    /// Line parameter for every line of the block, where one could be fixed.
    pub coordinates: Vec<Option<f64>>,
    /// Crossing point on every line of the block, where one could be fixed.
    pub points: Vec<Option<Point>>,
    /// Largest distance of a stage's middle point from its outer segment.
    pub max_residual: f64,
    /// Residual above which the isopleth is inconsistent.
    pub tolerance: f64,
}

impl IsoplethSolution {
    /// Whether every stage is collinear within tolerance.
    pub fn is_consistent(&self) -> bool {
        self.max_residual <= self.tolerance
    }

    /// The polyline of every fully determined stage, ordered along its segment.
    pub fn stage_polylines(&self, layout: &BlockLayout) -> Vec<SmallVec<[Point; 3]>> {
        layout
            .stages
            .iter()
            .filter_map(|stage| {
                let mut pts: SmallVec<[Point; 3]> = SmallVec::new();
                for index in stage.lines() {
                    pts.push(self.points.get(index).copied().flatten()?);
                }
                let origin = pts[0];
                let along = pts[2] - pts[0];
                pts.sort_by(|a, b| (*a - origin).dot(along).total_cmp(&(*b - origin).dot(along)));
                Some(pts)
            })
            .collect()
    }
}

impl BlockLayout {
    /// Solves `query` against this layout.
    ///
    /// Errors carry field paths relative to the query (`values`, `scales[i]`).
    pub fn solve(&self, scales: &[Scale], query: &IsoplethQuery) -> NomoResult<IsoplethSolution> {
        if query.values.len() != scales.len() || scales.len() != self.scale_count {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("values"),
                expected: alloc::format!("{} values", self.scale_count),
                actual: query.values.len(),
            });
        }
        let unknowns = query
            .values
            .iter()
            .filter(|v| **v == IsoValue::Unknown)
            .count();
        if unknowns > 1 {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("values"),
                expected: String::from("at most 1 unknown value"),
                actual: unknowns,
            });
        }

        let mut coordinates: Vec<Option<f64>> = alloc::vec![None; self.lines.len()];
        for (i, (value, scale)) in query.values.iter().zip(scales).enumerate() {
            if let IsoValue::Known(u) = *value {
                if !scale.contains(u) {
                    let spec = scale.spec();
                    return Err(NomoError::domain(
                        alloc::format!("scales[{i}]"),
                        alloc::format!(
                            "isopleth value {u} is outside [{}, {}]",
                            spec.u_min, spec.u_max
                        ),
                    ));
                }
                coordinates[i] = Some(self.lines[i].placement.coordinate.apply(scale.eval(u)));
            }
        }

        self.propagate(&mut coordinates);

        let mut values: Vec<f64> = query
            .values
            .iter()
            .map(|v| match v {
                IsoValue::Known(u) => *u,
                IsoValue::Unknown => f64::NAN,
            })
            .collect();
        let solved = match query.unknown_index() {
            Some(i) => {
                let u = self.recover(i, &scales[i], coordinates[i])?;
                values[i] = u;
                Some((i, u))
            }
            None => None,
        };

        let points: Vec<Option<Point>> = self
            .lines
            .iter()
            .zip(&coordinates)
            .map(|(line, c)| c.map(|c| line.placement.point_at(c)))
            .collect();

        let max_residual = self
            .stages
            .iter()
            .filter_map(|stage| stage_residual(stage, &points))
            .fold(0.0, f64::max);
        let tolerance = COLLINEARITY_TOLERANCE * self.width.max(self.height);

        let solution = IsoplethSolution {
            values,
            solved,
            coordinates,
            points,
            max_residual,
            tolerance,
        };
        if solution.is_consistent() {
            tracing::info!(
                topology = self.topology.name(),
                solved = ?solution.solved,
                "solved isopleth"
            );
        } else {
            tracing::warn!(
                topology = self.topology.name(),
                residual = max_residual,
                tolerance,
                "isopleth values do not satisfy the block relation"
            );
        }
        Ok(solution)
    }

    /// Fixes line parameters stage by stage until no stage has exactly one unknown line.
    fn propagate(&self, coordinates: &mut [Option<f64>]) {
        loop {
            let mut progressed = false;
            for stage in &self.stages {
                let [s, m, e] = stage.lines();
                let fixed = |i: usize| {
                    coordinates[i].map(|c| self.lines[i].placement.point_at(c))
                };
                let (target, p, q) = match (fixed(s), fixed(m), fixed(e)) {
                    (None, Some(p), Some(q)) => (s, p, q),
                    (Some(p), None, Some(q)) => (m, p, q),
                    (Some(p), Some(q), None) => (e, p, q),
                    _ => continue,
                };
                if let Some(c) = self.lines[target].placement.intersect(p, q) {
                    coordinates[target] = Some(c);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }

    /// Maps a solved line parameter back to a domain value of scale `index`.
    fn recover(&self, index: usize, scale: &Scale, coordinate: Option<f64>) -> NomoResult<f64> {
        let field = alloc::format!("scales[{index}]");
        let c = coordinate.ok_or_else(|| {
            NomoError::unsolvable(field.clone(), "no stage connects the unknown to known values")
        })?;
        let f = self.lines[index]
            .placement
            .fn_value_at(c)
            .ok_or_else(|| NomoError::unsolvable(field.clone(), "isopleth misses the scale line"))?;
        scale.invert(f).map_err(|err| err.within(&field))
    }
}

fn stage_residual(stage: &Stage, points: &[Option<Point>]) -> Option<f64> {
    let a = points[stage.start]?;
    let m = points[stage.middle]?;
    let b = points[stage.end]?;
    Some(collinearity_residual(a, m, b))
}
