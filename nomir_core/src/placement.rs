// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight lines that carry a scale or act as a turning line.
//!
//! A [`Placement`] is an anchor, a direction and a [`Coordinate`]: function values are mapped to
//! a line parameter `c`, and the point for `c` is `anchor + direction * c`. All nomograph
//! constructions in this crate are expressed with these two coordinate kinds.

use kurbo::{Point, Vec2};

/// Denominators below this are treated as parallel or singular.
const EPSILON: f64 = 1e-12;

/// Maps a function value `F` to a line parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coordinate {
    /// `c = scale * F + offset`.
    Affine {
        /// Multiplier applied to the function value.
        scale: f64,
        /// Parameter at `F = 0`.
        offset: f64,
    },
    /// `c = num * F / (num * F + den)`, used for the diagonal of a Z chart.
    Ratio {
        /// Multiplier on the function value.
        num: f64,
        /// Additive term of the denominator.
        den: f64,
    },
}

impl Coordinate {
    /// Line parameter for function value `f`.
    pub fn apply(self, f: f64) -> f64 {
        match self {
            Self::Affine { scale, offset } => scale * f + offset,
            Self::Ratio { num, den } => num * f / (num * f + den),
        }
    }

    /// Function value for line parameter `c`, if the mapping can be inverted there.
    pub fn inverse(self, c: f64) -> Option<f64> {
        let f = match self {
            Self::Affine { scale, offset } => {
                if scale.abs() < EPSILON {
                    return None;
                }
                (c - offset) / scale
            }
            Self::Ratio { num, den } => {
                let denom = num * (1.0 - c);
                if denom.abs() < EPSILON {
                    return None;
                }
                c * den / denom
            }
        };
        f.is_finite().then_some(f)
    }
}

/// A straight line in the block's layout frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Point at parameter 0.
    pub anchor: Point,
    /// Displacement per unit of parameter.
    pub direction: Vec2,
    /// Mapping from function values to parameters.
    pub coordinate: Coordinate,
}

impl Placement {
    /// A vertical line at `x` whose parameter is the height above `y = 0`.
    pub fn vertical(x: f64, coordinate: Coordinate) -> Self {
        Self {
            anchor: Point::new(x, 0.0),
            direction: Vec2::new(0.0, 1.0),
            coordinate,
        }
    }

    /// Point at line parameter `c`.
    pub fn point_at(&self, c: f64) -> Point {
        self.anchor + self.direction * c
    }

    /// Point for function value `f`.
    pub fn point_for(&self, f: f64) -> Point {
        self.point_at(self.coordinate.apply(f))
    }

    /// Function value at line parameter `c`.
    pub fn fn_value_at(&self, c: f64) -> Option<f64> {
        self.coordinate.inverse(c)
    }

    /// Parameter where the line through `p` and `q` crosses this line.
    ///
    /// Returns `None` when the two lines are parallel or `p` and `q` coincide.
    pub fn intersect(&self, p: Point, q: Point) -> Option<f64> {
        let through = q - p;
        let denom = self.direction.cross(through);
        let scale = self.direction.hypot() * through.hypot();
        if scale < EPSILON || denom.abs() <= EPSILON * scale {
            return None;
        }
        let c = (p - self.anchor).cross(through) / denom;
        c.is_finite().then_some(c)
    }
}

/// Distance of `m` from the line through `a` and `b`.
///
/// Falls back to the distance from `a` when `a` and `b` coincide.
pub fn collinearity_residual(a: Point, m: Point, b: Point) -> f64 {
    let ab = b - a;
    let len = ab.hypot();
    if len < EPSILON {
        return (m - a).hypot();
    }
    ab.cross(m - a).abs() / len
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn ratio_coordinate_inverts() {
        let c = Coordinate::Ratio { num: 2.0, den: 3.0 };
        let s = c.apply(1.5);
        assert!((s - 0.5).abs() < 1e-12);
        assert!((c.inverse(s).unwrap() - 1.5).abs() < 1e-12);
        assert!(c.inverse(1.0).is_none());
    }

    #[test]
    fn affine_coordinate_inverts() {
        let c = Coordinate::Affine {
            scale: -4.0,
            offset: 1.0,
        };
        assert!((c.inverse(c.apply(0.25)).unwrap() - 0.25).abs() < 1e-12);
        let flat = Coordinate::Affine {
            scale: 0.0,
            offset: 1.0,
        };
        assert!(flat.inverse(1.0).is_none());
    }

    #[test]
    fn intersect_finds_crossing_parameter() {
        let line = Placement::vertical(
            2.0,
            Coordinate::Affine {
                scale: 1.0,
                offset: 0.0,
            },
        );
        let c = line.intersect(Point::new(0.0, 0.0), Point::new(4.0, 8.0)).unwrap();
        assert!((c - 4.0).abs() < 1e-12);
        assert!(
            line.intersect(Point::new(0.0, 0.0), Point::new(0.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn residual_measures_distance_from_segment_line() {
        let r = collinearity_residual(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        );
        assert!((r - 1.0).abs() < 1e-12);
        let on = collinearity_residual(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        );
        assert!(on < 1e-12);
    }
}
