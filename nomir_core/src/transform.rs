// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page transforms.
//!
//! Transforms are applied in order and fold into a single [`Affine`]; each step is
//! premultiplied onto the result of the previous ones.

extern crate alloc;

use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::{NomoError, NomoResult};

/// A page-level geometric transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Counter-clockwise rotation about the origin, in degrees.
    Rotate(f64),
    /// Fits the skeleton's bounding box to the paper minus its margin, scaling x and y
    /// independently.
    ScalePaper,
    /// Scales x and y about the origin.
    Scale {
        /// Horizontal factor.
        sx: f64,
        /// Vertical factor.
        sy: f64,
    },
}

/// Folds `transforms` into one affine map.
///
/// `skeleton` is measured under the transforms applied so far whenever a
/// [`Transform::ScalePaper`] step needs a bounding box; `target` is the area it fits into.
pub fn fold_transforms(
    transforms: &[Transform],
    skeleton: &[Point],
    target: Rect,
) -> NomoResult<Affine> {
    let mut affine = Affine::IDENTITY;
    for (i, transform) in transforms.iter().enumerate() {
        let field = || alloc::format!("transforms[{i}]");
        let step = match *transform {
            Transform::Rotate(degrees) => {
                if !degrees.is_finite() {
                    return Err(NomoError::DegenerateLayout {
                        field: field(),
                        value: degrees,
                    });
                }
                Affine::rotate(degrees.to_radians())
            }
            Transform::Scale { sx, sy } => {
                for value in [sx, sy] {
                    if !(value.is_finite() && value != 0.0) {
                        return Err(NomoError::DegenerateLayout {
                            field: field(),
                            value,
                        });
                    }
                }
                Affine::scale_non_uniform(sx, sy)
            }
            Transform::ScalePaper => {
                let bounds = bounding_box(skeleton.iter().map(|p| affine * *p)).ok_or_else(|| {
                    NomoError::ConfigurationMismatch {
                        field: field(),
                        expected: String::from("a non-empty skeleton"),
                        actual: 0,
                    }
                })?;
                for value in [bounds.width(), bounds.height()] {
                    if !(value.is_finite() && value > 0.0) {
                        return Err(NomoError::DegenerateLayout {
                            field: field(),
                            value,
                        });
                    }
                }
                Affine::translate(Vec2::new(target.x0, target.y0))
                    * Affine::scale_non_uniform(
                        target.width() / bounds.width(),
                        target.height() / bounds.height(),
                    )
                    * Affine::translate(Vec2::new(-bounds.x0, -bounds.y0))
            }
        };
        affine = step * affine;
    }
    Ok(affine)
}

/// Rotation of the transformed x axis, in degrees.
pub fn text_angle(affine: Affine) -> f64 {
    let v = affine * Point::new(1.0, 0.0) - affine * Point::ORIGIN;
    v.y.atan2(v.x).to_degrees()
}

/// Smallest rectangle containing every point, if there are any.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    points
        .into_iter()
        .map(|p| Rect::from_points(p, p))
        .reduce(|a, b| a.union(b))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn square() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn scale_paper_fits_target_independently() {
        let target = Rect::new(1.0, 1.0, 19.0, 11.0);
        let affine = fold_transforms(&[Transform::ScalePaper], &square(), target).unwrap();
        let fitted = bounding_box(square().iter().map(|p| affine * *p)).unwrap();
        assert!((fitted.x0 - 1.0).abs() < 1e-12);
        assert!((fitted.y0 - 1.0).abs() < 1e-12);
        assert!((fitted.x1 - 19.0).abs() < 1e-12);
        assert!((fitted.y1 - 11.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_then_fit_uses_rotated_bounds() {
        let target = Rect::new(0.0, 0.0, 20.0, 20.0);
        let affine = fold_transforms(
            &[Transform::Rotate(90.0), Transform::ScalePaper],
            &square(),
            target,
        )
        .unwrap();
        // (0, 0) rotates to (0, 0), the right edge of the rotated square.
        let p = affine * Point::ORIGIN;
        assert!((p.x - 20.0).abs() < 1e-9, "{p:?}");
        assert!((p.y - 0.0).abs() < 1e-9, "{p:?}");
        assert!((text_angle(affine) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn transforms_apply_in_order() {
        let affine = fold_transforms(
            &[Transform::Scale { sx: 2.0, sy: 1.0 }, Transform::Rotate(90.0)],
            &[],
            Rect::ZERO,
        )
        .unwrap();
        let p = affine * Point::new(1.0, 0.0);
        assert!((p.x - 0.0).abs() < 1e-9 && (p.y - 2.0).abs() < 1e-9, "{p:?}");
    }

    #[test]
    fn degenerate_steps_are_rejected() {
        assert!(matches!(
            fold_transforms(&[Transform::Scale { sx: 0.0, sy: 1.0 }], &[], Rect::ZERO),
            Err(NomoError::DegenerateLayout { .. })
        ));
        let flat = [Point::new(0.0, 0.0), Point::new(5.0, 0.0)];
        assert!(matches!(
            fold_transforms(&[Transform::ScalePaper], &flat, Rect::new(0.0, 0.0, 1.0, 1.0)),
            Err(NomoError::DegenerateLayout { .. })
        ));
    }
}
