// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blocks: a group of scales bound by one relation.
//!
//! Building a [`BlockSpec`] runs the whole per-block pipeline in a fixed order (topology name,
//! dimensions, scale count, scales, alignment, isopleths) and stops at the first error.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point};
use peniko::color::palette::css;

use crate::axis::{AxisStyle, ScaleAxis, StrokeStyle, reference_marks};
use crate::error::{NomoError, NomoResult};
use crate::isopleth::{IsoplethQuery, IsoplethSolution, IsoplethStyle};
use crate::mark::Drawing;
use crate::measure::TextMeasurer;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::{Scale, ScaleSpec, TickSide};
use crate::topology::{BlockLayout, LineKind, Topology};
use crate::z_order;

/// A block of scales, its topology and its sample isopleths.
#[derive(Clone, Debug)]
pub struct BlockSpec {
    /// Topology name: `"type_1"`, `"type_2"` or `"type_3"`.
    pub topology: String,
    /// Block width in layout units.
    pub width: f64,
    /// Block height in layout units.
    pub height: f64,
    /// Scales in relation order.
    pub scales: Vec<ScaleSpec>,
    /// Titles for the turning lines, in order.
    pub reference_titles: Vec<String>,
    /// Sample isopleths.
    pub isopleths: Vec<IsoplethQuery>,
    /// Styling for scale lines.
    pub axis_style: AxisStyle,
    /// Stroke for turning lines.
    pub reference_stroke: StrokeStyle,
    /// Styling for isopleths.
    pub isopleth_style: IsoplethStyle,
}

impl BlockSpec {
    /// Creates a 10 × 10 block of the named topology with no scales.
    pub fn new(topology: impl Into<String>) -> Self {
        Self {
            topology: topology.into(),
            width: 10.0,
            height: 10.0,
            scales: Vec::new(),
            reference_titles: Vec::new(),
            isopleths: Vec::new(),
            axis_style: AxisStyle::default(),
            reference_stroke: StrokeStyle::solid(css::GRAY, 0.015),
            isopleth_style: IsoplethStyle::default(),
        }
    }

    /// Sets the block size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Appends a scale.
    pub fn with_scale(mut self, scale: ScaleSpec) -> Self {
        self.scales.push(scale);
        self
    }

    /// Sets the turning line titles.
    pub fn with_reference_titles<S: Into<String>>(
        mut self,
        titles: impl IntoIterator<Item = S>,
    ) -> Self {
        self.reference_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a sample isopleth.
    pub fn with_isopleth(mut self, query: IsoplethQuery) -> Self {
        self.isopleths.push(query);
        self
    }

    /// Sets the scale styling.
    pub fn with_axis_style(mut self, style: AxisStyle) -> Self {
        self.axis_style = style;
        self
    }

    /// Sets the isopleth styling.
    pub fn with_isopleth_style(mut self, style: IsoplethStyle) -> Self {
        self.isopleth_style = style;
        self
    }

    /// Validates the block, lays it out and solves its isopleths.
    ///
    /// Field paths in errors are relative to the block.
    pub fn build(&self) -> NomoResult<Block> {
        let topology: Topology = self.topology.parse()?;
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(NomoError::DegenerateLayout {
                    field: String::from(field),
                    value,
                });
            }
        }
        if !topology.accepts(self.scales.len()) {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("scales"),
                expected: String::from(topology.arity()),
                actual: self.scales.len(),
            });
        }

        let scales = self
            .scales
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                spec.build()
                    .map_err(|err| err.within(&alloc::format!("scales[{i}]")))
            })
            .collect::<NomoResult<Vec<Scale>>>()?;

        let layout = topology.arrange(self.width, self.height, &scales)?;
        let references = layout.reference_lines().len();
        if self.reference_titles.len() > references {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("reference_titles"),
                expected: alloc::format!("at most {references} titles"),
                actual: self.reference_titles.len(),
            });
        }

        let solutions = self
            .isopleths
            .iter()
            .enumerate()
            .map(|(i, query)| {
                layout
                    .solve(&scales, query)
                    .map_err(|err| err.within(&alloc::format!("isopleths[{i}]")))
            })
            .collect::<NomoResult<Vec<IsoplethSolution>>>()?;

        Ok(Block {
            spec: self.clone(),
            scales,
            layout,
            solutions,
        })
    }
}

/// A built block, ready to be drawn.
#[derive(Clone, Debug)]
pub struct Block {
    spec: BlockSpec,
    scales: Vec<Scale>,
    layout: BlockLayout,
    solutions: Vec<IsoplethSolution>,
}

impl Block {
    /// The spec this block was built from.
    pub fn spec(&self) -> &BlockSpec {
        &self.spec
    }

    /// Built scales, in spec order.
    pub fn scales(&self) -> &[Scale] {
        &self.scales
    }

    /// The alignment solver's output.
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Solved isopleths, in spec order.
    pub fn solutions(&self) -> &[IsoplethSolution] {
        &self.solutions
    }

    /// Line end points and isopleth points in the block's layout frame.
    pub fn skeleton(&self) -> Vec<Point> {
        let mut out: Vec<Point> = self.layout.skeleton_points().into_iter().collect();
        for solution in &self.solutions {
            out.extend(solution.points.iter().flatten().copied());
        }
        out
    }

    /// Tick side for scale `index`: the explicit choice, else outward from the block center.
    fn tick_side(&self, index: usize) -> TickSide {
        if let Some(side) = self.scales[index].spec().tick_side {
            return side;
        }
        let Some(line) = self.layout.scale_line(index) else {
            return TickSide::Right;
        };
        let (a, b) = line.endpoints();
        if 0.5 * (a.x + b.x) < 0.25 * self.layout.width {
            TickSide::Left
        } else {
            TickSide::Right
        }
    }

    /// Draws the block into `drawing`.
    ///
    /// `to_paper` maps the block's layout frame to paper; `text_angle` is the rotation of the
    /// page's x axis in degrees.
    pub fn draw(
        &self,
        to_paper: Affine,
        text_angle: f64,
        measurer: &dyn TextMeasurer,
        drawing: &mut Drawing,
    ) {
        for line in &self.layout.lines {
            match line.kind {
                LineKind::Scale(i) => {
                    let axis = ScaleAxis {
                        scale: &self.scales[i],
                        line,
                        side: self.tick_side(i),
                        style: &self.spec.axis_style,
                        text_angle,
                    };
                    drawing.extend(axis.marks(to_paper, measurer));
                }
                LineKind::Reference(k) => {
                    drawing.extend(reference_marks(
                        line,
                        self.spec.reference_titles.get(k).map(String::as_str),
                        &self.spec.reference_stroke,
                        &self.spec.axis_style,
                        to_paper,
                        text_angle,
                    ));
                }
            }
        }

        for solution in &self.solutions {
            for polyline in solution.stage_polylines(&self.layout) {
                drawing.push(
                    RuleMarkSpec::polyline(polyline.into_iter().map(|p| to_paper * p))
                        .with_stroke(self.spec.isopleth_style.stroke.clone())
                        .with_z_index(z_order::ISOPLETHS)
                        .mark(),
                );
            }
        }
    }
}
