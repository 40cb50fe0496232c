// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block topologies and the alignment solver.
//!
//! A topology decides where each scale of a block goes so that every valid isopleth crosses
//! its lines collinearly. The result is a [`BlockLayout`]: the scale lines, any turning lines,
//! and the stages (collinear triples) the isopleth solver works through.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::error::{NomoError, NomoResult};
use crate::placement::{Coordinate, Placement};
use crate::scale::Scale;

/// A classical nomograph construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Three parallel scales for `F1 + F2 + F3 = 0`.
    Type1,
    /// A Z chart for `F1 = F2 * F3`.
    Type2,
    /// `F1 + ... + FN = 0` with `N - 3` turning lines.
    Type3,
}

impl Topology {
    /// The name used in block specs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Type1 => "type_1",
            Self::Type2 => "type_2",
            Self::Type3 => "type_3",
        }
    }

    /// Whether a block of this topology accepts `count` scales.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Type1 | Self::Type2 => count == 3,
            Self::Type3 => count >= 3,
        }
    }

    /// Human-readable arity, used in configuration errors.
    pub fn arity(self) -> &'static str {
        match self {
            Self::Type1 | Self::Type2 => "3 scales",
            Self::Type3 => "at least 3 scales",
        }
    }

    /// Places `scales` into a `width` × `height` block.
    pub fn arrange(self, width: f64, height: f64, scales: &[Scale]) -> NomoResult<BlockLayout> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        if !self.accepts(scales.len()) {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("scales"),
                expected: String::from(self.arity()),
                actual: scales.len(),
            });
        }

        let (lines, stages) = match self {
            Self::Type1 | Self::Type3 => sum_layout(width, height, scales),
            Self::Type2 => z_layout(width, height, scales)?,
        };

        tracing::debug!(
            topology = self.name(),
            lines = lines.len(),
            stages = stages.len(),
            "arranged block"
        );

        Ok(BlockLayout {
            topology: self,
            width,
            height,
            scale_count: scales.len(),
            lines,
            stages,
        })
    }
}

impl core::str::FromStr for Topology {
    type Err = NomoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "type_1" => Ok(Self::Type1),
            "type_2" => Ok(Self::Type2),
            "type_3" => Ok(Self::Type3),
            other => Err(NomoError::UnsupportedTopology(String::from(other))),
        }
    }
}

impl core::fmt::Display for Topology {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a line of a block carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// The scale with this index in the block.
    Scale(usize),
    /// An unlabeled turning line.
    Reference(usize),
}

/// A line of a laid-out block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLine {
    /// What the line carries.
    pub kind: LineKind,
    /// Where it sits.
    pub placement: Placement,
    /// Parameter range covered by the drawn line, in drawing order.
    pub extent: (f64, f64),
}

impl AxisLine {
    /// End points of the drawn line.
    pub fn endpoints(&self) -> (kurbo::Point, kurbo::Point) {
        (
            self.placement.point_at(self.extent.0),
            self.placement.point_at(self.extent.1),
        )
    }
}

/// Three lines a valid isopleth crosses collinearly, by index into [`BlockLayout::lines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    /// First outer line.
    pub start: usize,
    /// Line between the two outer ones.
    pub middle: usize,
    /// Second outer line.
    pub end: usize,
}

impl Stage {
    /// The three line indices in `start, middle, end` order.
    pub fn lines(&self) -> [usize; 3] {
        [self.start, self.middle, self.end]
    }
}

/// Output of the alignment solver.
///
/// Lines `0..scale_count` are the block's scales in spec order; turning lines follow.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockLayout {
    /// Construction used.
    pub topology: Topology,
    /// Block width in layout units.
    pub width: f64,
    /// Block height in layout units.
    pub height: f64,
    /// Number of scale lines at the front of `lines`.
    pub scale_count: usize,
    /// Scale lines followed by turning lines.
    pub lines: Vec<AxisLine>,
    /// Collinear triples, in propagation order.
    pub stages: Vec<Stage>,
}

impl BlockLayout {
    /// The line carrying scale `index`.
    pub fn scale_line(&self, index: usize) -> Option<&AxisLine> {
        self.lines.get(index).filter(|_| index < self.scale_count)
    }

    /// Turning lines.
    pub fn reference_lines(&self) -> &[AxisLine] {
        &self.lines[self.scale_count.min(self.lines.len())..]
    }

    /// End points of every line, for bounds computations.
    pub fn skeleton_points(&self) -> SmallVec<[kurbo::Point; 8]> {
        let mut out = SmallVec::new();
        for line in &self.lines {
            let (a, b) = line.endpoints();
            out.push(a);
            out.push(b);
        }
        out
    }
}

fn check_dimension(field: &str, value: f64) -> NomoResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NomoError::DegenerateLayout {
            field: String::from(field),
            value,
        })
    }
}

fn scale_extent(coordinate: Coordinate, scale: &Scale) -> (f64, f64) {
    let (f_start, f_end) = scale.fn_ends();
    (coordinate.apply(f_start), coordinate.apply(f_end))
}

/// Parallel-line layout shared by the sum topologies.
///
/// Inputs `F1..F(N-1)` are spread evenly over the width and each fills `[0, height]`. Stage `k`
/// combines the previous line (the first scale or turning line `k - 1`) with input `k + 1`; the
/// middle line sits at `t = mA / (mA + mB)` between them with `mC = mA mB / (mA + mB)`.
///
/// The last stage holds `F(N-1)` and `FN`. One of them stays a full-height outer line and the
/// other becomes the middle line with its coordinate negated; the middle goes to whichever
/// choice gives the longer middle scale.
fn sum_layout(width: f64, height: f64, scales: &[Scale]) -> (Vec<AxisLine>, Vec<Stage>) {
    let n = scales.len();
    let inputs = n - 1;
    let spacing = width / (inputs - 1) as f64;

    let mut lines: Vec<AxisLine> = Vec::with_capacity(2 * n - 3);
    // (x, m, b) of every input line: y = m * F + b.
    let mut affine: Vec<(f64, f64, f64)> = Vec::with_capacity(inputs);
    for (i, scale) in scales.iter().take(inputs).enumerate() {
        let (lo, hi) = scale.fn_range();
        let m = height / (hi - lo);
        let x = i as f64 * spacing;
        let coordinate = Coordinate::Affine {
            scale: m,
            offset: -m * lo,
        };
        affine.push((x, m, -m * lo));
        lines.push(AxisLine {
            kind: LineKind::Scale(i),
            placement: Placement::vertical(x, coordinate),
            extent: scale_extent(coordinate, scale),
        });
    }

    let last = n - 1;
    let mut references: Vec<AxisLine> = Vec::with_capacity(n - 3);
    let mut stages = Vec::with_capacity(n - 2);
    let mut previous = (0_usize, affine[0]);
    for k in 0..n - 2 {
        let (start, (x_a, m_a, b_a)) = previous;
        let (x_b, m_b, b_b) = affine[k + 1];
        let t = m_a / (m_a + m_b);
        let x = x_a + t * (x_b - x_a);
        let m_c = m_a * m_b / (m_a + m_b);
        let b_c = (1.0 - t) * b_a + t * b_b;

        if k == n - 3 {
            let (lo_n, hi_n) = scales[last].fn_range();
            let m_n = height / (hi_n - lo_n);
            // Middle scale lengths: mC * range of whichever scale is moved to the middle.
            let last_middle = m_c * (hi_n - lo_n);
            let input_middle = m_a * m_n / (m_a + m_n) * (height / m_b);
            if last_middle >= input_middle {
                let coordinate = Coordinate::Affine {
                    scale: -m_c,
                    offset: b_c,
                };
                lines.push(AxisLine {
                    kind: LineKind::Scale(last),
                    placement: Placement::vertical(x, coordinate),
                    extent: scale_extent(coordinate, &scales[last]),
                });
                stages.push(Stage {
                    start,
                    middle: last,
                    end: k + 1,
                });
            } else {
                let outer = Coordinate::Affine {
                    scale: m_n,
                    offset: -m_n * lo_n,
                };
                lines.push(AxisLine {
                    kind: LineKind::Scale(last),
                    placement: Placement::vertical(x_b, outer),
                    extent: scale_extent(outer, &scales[last]),
                });
                let t = m_a / (m_a + m_n);
                let middle = Coordinate::Affine {
                    scale: -m_a * m_n / (m_a + m_n),
                    offset: (1.0 - t) * b_a + t * (-m_n * lo_n),
                };
                lines[k + 1] = AxisLine {
                    kind: LineKind::Scale(k + 1),
                    placement: Placement::vertical(x_a + t * (x_b - x_a), middle),
                    extent: scale_extent(middle, &scales[k + 1]),
                };
                stages.push(Stage {
                    start,
                    middle: k + 1,
                    end: last,
                });
            }
        } else {
            // Turning lines follow all scale lines.
            let index = n + k;
            references.push(AxisLine {
                kind: LineKind::Reference(k),
                placement: Placement::vertical(
                    x,
                    Coordinate::Affine {
                        scale: m_c,
                        offset: b_c,
                    },
                ),
                extent: (0.0, height),
            });
            stages.push(Stage {
                start,
                middle: index,
                end: k + 1,
            });
            previous = (index, (x, m_c, b_c));
        }
    }

    lines.extend(references);
    (lines, stages)
}

/// Z chart: `F1` up the left edge, `F3` down the right edge, `F2` on the diagonal.
fn z_layout(width: f64, height: f64, scales: &[Scale]) -> NomoResult<(Vec<AxisLine>, Vec<Stage>)> {
    let max_abs = |scale: &Scale| {
        let (lo, hi) = scale.fn_range();
        lo.abs().max(hi.abs())
    };
    let m1 = height / max_abs(&scales[0]);
    let m3 = height / max_abs(&scales[2]);

    let (f2_start, f2_end) = scales[1].fn_ends();
    for f2 in [f2_start, f2_end] {
        if m1 * f2 + m3 <= 0.0 {
            return Err(NomoError::domain(
                "scales[1]",
                alloc::format!(
                    "Z chart diagonal is undefined for F2 = {f2}; F2 must stay above {}",
                    -m3 / m1
                ),
            ));
        }
    }

    let left = Coordinate::Affine {
        scale: m1,
        offset: 0.0,
    };
    let diagonal = Coordinate::Ratio { num: m1, den: m3 };
    let right = Coordinate::Affine {
        scale: m3,
        offset: 0.0,
    };

    let lines = alloc::vec![
        AxisLine {
            kind: LineKind::Scale(0),
            placement: Placement::vertical(0.0, left),
            extent: scale_extent(left, &scales[0]),
        },
        AxisLine {
            kind: LineKind::Scale(1),
            placement: Placement {
                anchor: kurbo::Point::ORIGIN,
                direction: kurbo::Vec2::new(width, height),
                coordinate: diagonal,
            },
            extent: scale_extent(diagonal, &scales[1]),
        },
        AxisLine {
            kind: LineKind::Scale(2),
            placement: Placement {
                anchor: kurbo::Point::new(width, height),
                direction: kurbo::Vec2::new(0.0, -1.0),
                coordinate: right,
            },
            extent: scale_extent(right, &scales[2]),
        },
    ];
    let stages = alloc::vec![Stage {
        start: 0,
        middle: 1,
        end: 2,
    }];
    Ok((lines, stages))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;
    use crate::placement::collinearity_residual;
    use crate::scale::{ScaleSpec, ScaleType};

    fn build(specs: &[ScaleSpec]) -> Vec<Scale> {
        specs.iter().map(|s| s.build().unwrap()).collect()
    }

    #[test]
    fn names_round_trip_and_unknown_names_fail() {
        for t in [Topology::Type1, Topology::Type2, Topology::Type3] {
            assert_eq!(t.name().parse::<Topology>().unwrap(), t);
        }
        assert_eq!(
            "nonexistent".parse::<Topology>(),
            Err(NomoError::UnsupportedTopology("nonexistent".into()))
        );
    }

    #[test]
    fn type1_points_for_satisfying_values_are_collinear() {
        let scales = build(&[
            ScaleSpec::new(0.0, 10.0, |u| u),
            ScaleSpec::new(0.0, 5.0, |u| u),
            ScaleSpec::new(-15.0, 0.0, |u| u),
        ]);
        let layout = Topology::Type1.arrange(10.0, 10.0, &scales).unwrap();
        assert_eq!(layout.lines.len(), 3);
        let stage = layout.stages[0];
        // F3 has the widest range, so it takes the middle.
        assert_eq!(stage.middle, 2);
        for (f1, f2) in [(1.0, 4.0), (7.5, 0.5), (10.0, 5.0)] {
            let f = [f1, f2, -(f1 + f2)];
            let p = |i: usize| layout.lines[i].placement.point_for(f[i]);
            let r = collinearity_residual(p(stage.start), p(stage.middle), p(stage.end));
            assert!(r < 1e-9, "residual {r} for {f:?}");
        }
    }

    #[test]
    fn narrow_last_scale_stays_on_the_outside() {
        let scales = build(&[
            ScaleSpec::new(0.0, 10.0, |u| u),
            ScaleSpec::new(0.0, 10.0, |u| u),
            ScaleSpec::new(-10.0, -9.0, |u| u),
        ]);
        let layout = Topology::Type1.arrange(10.0, 10.0, &scales).unwrap();
        let stage = layout.stages[0];
        assert_eq!((stage.start, stage.middle, stage.end), (0, 1, 2));
        assert_eq!(layout.lines[1].kind, LineKind::Scale(1));
        assert!((layout.lines[2].placement.anchor.x - 10.0).abs() < 1e-12);
        for (f1, f3) in [(0.5, -9.5), (9.0, -9.0), (0.0, -10.0)] {
            let f = [f1, -(f1 + f3), f3];
            let p = |i: usize| layout.lines[i].placement.point_for(f[i]);
            let r = collinearity_residual(p(0), p(1), p(2));
            assert!(r < 1e-9, "residual {r} for {f:?}");
        }
    }

    #[test]
    fn type3_psi_scales_all_span_most_of_the_height() {
        let scales = build(&[
            ScaleSpec::new(0.1, 1.5, |u| -1.38 * u * u),
            ScaleSpec::new(0.1, 10.0, |u| 5.03 - 1.91 * (1.0 + u).log10())
                .with_scale_type(ScaleType::Logarithmic),
            ScaleSpec::new(0.0, 5.0, |u| -u),
            ScaleSpec::new(10.0, 2000.0, |u| -0.01 * u.sqrt())
                .with_scale_type(ScaleType::Logarithmic),
        ]);
        let layout = Topology::Type3.arrange(10.0, 10.0, &scales).unwrap();
        for (i, scale) in scales.iter().enumerate() {
            let line = layout.scale_line(i).unwrap();
            let (f_start, f_end) = scale.fn_ends();
            let length =
                (line.placement.point_for(f_end) - line.placement.point_for(f_start)).hypot();
            assert!(length > 5.0, "scale {i} spans only {length}");
        }
        // p moves into the middle and C+P takes the outer slot.
        let last = layout.stages[1];
        assert_eq!((last.middle, last.end), (2, 3));
    }

    #[test]
    fn type3_adds_turning_lines_after_scales() {
        let scales = build(&[
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(-4.0, 0.0, |u| u),
        ]);
        let layout = Topology::Type3.arrange(12.0, 8.0, &scales).unwrap();
        assert_eq!(layout.scale_count, 5);
        assert_eq!(layout.lines.len(), 7);
        assert_eq!(layout.reference_lines().len(), 2);
        assert_eq!(layout.stages.len(), 3);
        assert_eq!(layout.lines[4].kind, LineKind::Scale(4));
        assert_eq!(layout.lines[5].kind, LineKind::Reference(0));
        assert_eq!(layout.stages[2].middle, 4);
        for (i, line) in layout.lines.iter().take(4).enumerate() {
            assert!((line.placement.anchor.x - 4.0 * i as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn z_chart_points_for_products_are_collinear() {
        let scales = build(&[
            ScaleSpec::new(0.5, 20.0, |u| u),
            ScaleSpec::new(0.5, 4.0, |u| u),
            ScaleSpec::new(1.0, 5.0, |u| u),
        ]);
        let layout = Topology::Type2.arrange(10.0, 10.0, &scales).unwrap();
        for (f2, f3) in [(1.0, 2.0), (4.0, 5.0), (0.5, 1.5)] {
            let f1 = f2 * f3;
            let p = |i: usize, f: f64| layout.lines[i].placement.point_for(f);
            let r = collinearity_residual(p(0, f1), p(1, f2), p(2, f3));
            assert!(r < 1e-9, "residual {r}");
        }
    }

    #[test]
    fn bad_dimensions_and_arity_are_rejected() {
        let scales = build(&[
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
            ScaleSpec::new(0.0, 1.0, |u| u),
        ]);
        assert!(matches!(
            Topology::Type1.arrange(0.0, 10.0, &scales[..3]),
            Err(NomoError::DegenerateLayout { .. })
        ));
        assert!(matches!(
            Topology::Type3.arrange(10.0, f64::NAN, &scales),
            Err(NomoError::DegenerateLayout { .. })
        ));
        assert!(matches!(
            Topology::Type1.arrange(10.0, 10.0, &scales),
            Err(NomoError::ConfigurationMismatch { actual: 4, .. })
        ));
        assert!(matches!(
            Topology::Type3.arrange(10.0, 10.0, &scales[..2]),
            Err(NomoError::ConfigurationMismatch { actual: 2, .. })
        ));
    }
}
