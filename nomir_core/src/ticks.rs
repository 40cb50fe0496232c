// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick selection policies.
//!
//! A policy turns a domain into leveled tick values. Level 0 is the coarsest granularity; each
//! further level fills in finer values that are not already present at a coarser level.
//! Policies only look at the domain, not at the scale function: the scale builder applies the
//! function afterwards and drawing thins out ticks that land too close together on paper.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Upper bound on ticks generated for a single level.
///
/// Finer levels stop being generated once a level would exceed this count.
pub const MAX_TICKS_PER_LEVEL: usize = 2_000;

/// A tick value produced by a [`TickPolicy`], before the scale function is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickValue {
    /// Domain value.
    pub value: f64,
    /// Granularity level (0 = coarsest).
    pub level: usize,
    /// Spacing of the level this value belongs to, used for label precision.
    pub step: f64,
}

/// A tick selection strategy for one kind of scale.
pub trait TickPolicy {
    /// Returns tick values inside `[min, max]` for the first `levels` levels, sorted by value.
    ///
    /// Returns a short reason when the domain cannot be ticked by this policy.
    fn tick_values(&self, min: f64, max: f64, levels: usize) -> Result<Vec<TickValue>, &'static str>;
}

/// Linear "smart" ticks: 1/2/5 × 10^k steps, each level subdividing the previous one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearTicks;

/// Logarithmic ticks: powers of ten, then {2, 5} and {3, 4, 6, 7, 8, 9} multiples.
///
/// Falls back to [`LinearTicks`] when the domain contains fewer than two powers of ten.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTicks;

impl TickPolicy for LinearTicks {
    fn tick_values(&self, min: f64, max: f64, levels: usize) -> Result<Vec<TickValue>, &'static str> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err("linear ticks need a finite, non-empty domain");
        }
        Ok(linear_tick_values(min, max, levels))
    }
}

impl TickPolicy for LogTicks {
    fn tick_values(&self, min: f64, max: f64, levels: usize) -> Result<Vec<TickValue>, &'static str> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err("logarithmic ticks need a finite, non-empty domain");
        }
        if min <= 0.0 {
            return Err("logarithmic ticks need a strictly positive domain");
        }

        let e_min = exponent_floor(min);
        let e_max = exponent_ceil(max);
        let decades = (e_min..=e_max)
            .filter(|&e| in_domain(10_f64.powi(e), min, max))
            .count();
        if decades < 2 {
            return Ok(linear_tick_values(min, max, levels));
        }

        let mut out = Vec::new();
        for (level, mantissas) in LOG_MANTISSAS.iter().enumerate().take(levels) {
            for e in e_min..=e_max {
                let decade = 10_f64.powi(e);
                for m in mantissas.iter() {
                    let value = m * decade;
                    if in_domain(value, min, max) {
                        out.push(TickValue {
                            value,
                            level,
                            step: decade,
                        });
                    }
                }
            }
        }
        out.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(out)
    }
}

const LOG_MANTISSAS: [&[f64]; 3] = [&[1.0], &[2.0, 5.0], &[3.0, 4.0, 6.0, 7.0, 8.0, 9.0]];

fn linear_tick_values(min: f64, max: f64, levels: usize) -> Vec<TickValue> {
    let mut out = Vec::new();
    let mut step = nice_step((max - min) / 5.0);
    let mut coarser: Option<f64> = None;

    for level in 0..levels {
        if step <= 0.0 {
            break;
        }
        let start = (min / step - 1e-9).ceil();
        let stop = (max / step + 1e-9).floor();
        let count = stop - start + 1.0;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "checked against MAX_TICKS_PER_LEVEL before converting"
        )]
        let (start, count) = if count.is_finite() && count >= 0.0 && count <= MAX_TICKS_PER_LEVEL as f64 {
            (start as i64, count as i64)
        } else {
            break;
        };

        // Multiples of the coarser step were already emitted at a coarser level.
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ratio of consecutive 1/2/5 steps is 2 or 5"
        )]
        let ratio = coarser.map(|c| (c / step).round() as i64);
        for i in start..start + count {
            if let Some(r) = ratio
                && r > 0
                && i % r == 0
            {
                continue;
            }
            out.push(TickValue {
                value: i as f64 * step,
                level,
                step,
            });
        }

        coarser = Some(step);
        step = subdivide(step);
    }

    out.sort_by(|a, b| a.value.total_cmp(&b.value));
    out
}

/// Picks the 1/2/5 × 10^k step nearest to `raw`.
pub(crate) fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let base = 10_f64.powi(exponent_floor(raw));
    let error = raw / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Next finer step: 1 → 0.5, 2 → 1, 5 → 1 (times the same power of ten).
fn subdivide(step: f64) -> f64 {
    let base = 10_f64.powi(exponent_floor(step));
    let mantissa = (step / base).round();
    if mantissa >= 5.0 { step / 5.0 } else { step / 2.0 }
}

fn exponent_floor(x: f64) -> i32 {
    let e = (x.log10() + 1e-9).floor().clamp(-300.0, 300.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to +-300")]
    {
        e as i32
    }
}

fn exponent_ceil(x: f64) -> i32 {
    let e = (x.log10() - 1e-9).ceil().clamp(-300.0, 300.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to +-300")]
    {
        e as i32
    }
}

fn in_domain(value: f64, min: f64, max: f64) -> bool {
    let slack = 1e-9 * (max - min).abs().max(min.abs()).max(max.abs());
    value >= min - slack && value <= max + slack
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;

    fn values_at(ticks: &[TickValue], level: usize) -> Vec<f64> {
        ticks
            .iter()
            .filter(|t| t.level == level)
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn linear_zero_to_five_has_unit_major_ticks() {
        let ticks = LinearTicks.tick_values(0.0, 5.0, 1).unwrap();
        let major = values_at(&ticks, 0);
        assert_eq!(major.len(), 6, "{major:?}");
        for (i, v) in major.iter().enumerate() {
            assert!((v - i as f64).abs() < 1e-12, "{major:?}");
        }
    }

    #[test]
    fn linear_levels_subdivide_without_duplicates() {
        let ticks = LinearTicks.tick_values(0.0, 5.0, 3).unwrap();
        // 0.5 steps add 5 ticks, 0.1 steps add the remaining 40.
        assert_eq!(values_at(&ticks, 1).len(), 5);
        assert_eq!(values_at(&ticks, 2).len(), 40);
        for pair in ticks.windows(2) {
            assert!(pair[0].value < pair[1].value, "duplicate or unsorted: {pair:?}");
        }
    }

    #[test]
    fn linear_ticks_skip_values_outside_domain() {
        let ticks = LinearTicks.tick_values(0.1, 1.5, 2).unwrap();
        assert!(ticks.iter().all(|t| t.value >= 0.1 - 1e-12 && t.value <= 1.5 + 1e-12));
        let major = values_at(&ticks, 0);
        assert!((major[0] - 0.2).abs() < 1e-12, "{major:?}");
    }

    #[test]
    fn log_ticks_mark_decades_and_multiples() {
        let ticks = LogTicks.tick_values(0.1, 10.0, 2).unwrap();
        let major = values_at(&ticks, 0);
        assert_eq!(major.len(), 3, "{major:?}");
        let minor = values_at(&ticks, 1);
        assert!(minor.iter().any(|v| (v - 0.2).abs() < 1e-12));
        assert!(minor.iter().any(|v| (v - 5.0).abs() < 1e-12));
        assert!(!minor.iter().any(|v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn log_ticks_reject_non_positive_domains() {
        assert!(LogTicks.tick_values(0.0, 10.0, 2).is_err());
        assert!(LogTicks.tick_values(-5.0, 10.0, 2).is_err());
    }

    #[test]
    fn narrow_log_domain_falls_back_to_linear_ticks() {
        let ticks = LogTicks.tick_values(2.0, 8.0, 1).unwrap();
        assert!(ticks.len() >= 3, "{ticks:?}");
        assert!(ticks.iter().all(|t| t.level == 0));
    }
}
