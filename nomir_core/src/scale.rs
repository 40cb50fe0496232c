// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale specifications and the scale builder.
//!
//! A [`ScaleSpec`] is a domain `[u_min, u_max]` plus a mapping function `F(u)`. Building it
//! validates the function and produces a [`Scale`]: the leveled, labeled tick set with every
//! tick's function value. Where the scale ends up on the page is decided later by the block
//! topology; a scale only knows its own function space.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{NomoError, NomoResult};
use crate::format::format_tick_with_step;
use crate::ticks::{LinearTicks, LogTicks, TickPolicy};

/// A mapping function from domain values to function space.
pub type ScaleFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Number of evenly spaced samples used to validate a scale function.
const VALIDATION_SAMPLES: usize = 64;

/// Tick spacing family of a scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleType {
    /// Ticks on 1/2/5 × 10^k steps.
    Linear,
    /// Ticks on powers of ten and their multiples.
    Logarithmic,
}

impl ScaleType {
    /// Returns the tick policy that implements this scale type.
    pub fn policy(self) -> &'static dyn TickPolicy {
        match self {
            Self::Linear => &LinearTicks,
            Self::Logarithmic => &LogTicks,
        }
    }
}

/// Which side of the scale line ticks and labels are drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickSide {
    /// Towards negative x (or up, for horizontal lines).
    Left,
    /// Towards positive x (or down, for horizontal lines).
    Right,
}

/// A single scale: domain, mapping function and tick options.
#[derive(Clone)]
pub struct ScaleSpec {
    /// Lower domain bound.
    pub u_min: f64,
    /// Upper domain bound.
    pub u_max: f64,
    /// Mapping from domain values to function space.
    pub function: ScaleFn,
    /// Tick spacing family.
    pub scale_type: ScaleType,
    /// Whether drawing thins out ticks and labels that crowd each other on paper.
    pub smart: bool,
    /// Number of nested tick granularities.
    pub tick_levels: usize,
    /// Number of leading granularities that receive labels.
    pub tick_text_levels: usize,
    /// Scale title.
    pub title: String,
    /// Tick side; `None` picks the outer side based on the scale's position in its block.
    pub tick_side: Option<TickSide>,
}

impl core::fmt::Debug for ScaleSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScaleSpec")
            .field("u_min", &self.u_min)
            .field("u_max", &self.u_max)
            .field("scale_type", &self.scale_type)
            .field("smart", &self.smart)
            .field("tick_levels", &self.tick_levels)
            .field("tick_text_levels", &self.tick_text_levels)
            .field("title", &self.title)
            .field("tick_side", &self.tick_side)
            .finish_non_exhaustive()
    }
}

impl ScaleSpec {
    /// Creates a linear smart scale with two tick levels, the first one labeled.
    pub fn new(u_min: f64, u_max: f64, function: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            u_min,
            u_max,
            function: Arc::new(function),
            scale_type: ScaleType::Linear,
            smart: true,
            tick_levels: 2,
            tick_text_levels: 1,
            title: String::new(),
            tick_side: None,
        }
    }

    /// Sets the scale type.
    pub fn with_scale_type(mut self, scale_type: ScaleType) -> Self {
        self.scale_type = scale_type;
        self
    }

    /// Enables or disables smart tick thinning.
    pub fn with_smart(mut self, smart: bool) -> Self {
        self.smart = smart;
        self
    }

    /// Sets the number of tick levels and how many of them are labeled.
    pub fn with_tick_levels(mut self, tick_levels: usize, tick_text_levels: usize) -> Self {
        self.tick_levels = tick_levels;
        self.tick_text_levels = tick_text_levels;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Forces ticks onto one side of the scale line.
    pub fn with_tick_side(mut self, side: TickSide) -> Self {
        self.tick_side = Some(side);
        self
    }

    /// Evaluates the mapping function.
    pub fn eval(&self, u: f64) -> f64 {
        (self.function)(u)
    }

    /// Validates the spec and computes its ticks.
    ///
    /// Errors carry an empty field path; callers prefix it with [`NomoError::within`].
    pub fn build(&self) -> NomoResult<Scale> {
        let (u_min, u_max) = (self.u_min, self.u_max);
        if !(u_min.is_finite() && u_max.is_finite()) || u_min >= u_max {
            return Err(NomoError::domain(
                "",
                alloc::format!(
                    "`{}`: u_min must be less than u_max, got [{u_min}, {u_max}]",
                    self.title
                ),
            ));
        }

        let tick_values = self
            .scale_type
            .policy()
            .tick_values(u_min, u_max, self.tick_levels)
            .map_err(|reason| NomoError::domain("", alloc::format!("`{}`: {reason}", self.title)))?;

        let span = u_max - u_min;
        let mut probes: Vec<f64> = (0..=VALIDATION_SAMPLES)
            .map(|i| u_min + span * i as f64 / VALIDATION_SAMPLES as f64)
            .collect();
        probes.extend(tick_values.iter().map(|t| t.value));
        probes.push(u_max);
        probes.sort_by(f64::total_cmp);
        probes.dedup_by(|a, b| (*a - *b).abs() <= 1e-12 * span);

        let samples: Vec<(f64, f64)> = probes.iter().map(|&u| (u, self.eval(u))).collect();
        if let Some(&(u, f)) = samples.iter().find(|(_, f)| !f.is_finite()) {
            return Err(NomoError::domain(
                "",
                alloc::format!("`{}`: function is not finite at u = {u} (got {f})", self.title),
            ));
        }

        let f_start = self.eval(u_min);
        let f_end = self.eval(u_max);
        if f_start == f_end {
            return Err(NomoError::domain(
                "",
                alloc::format!("`{}`: function is constant over the domain", self.title),
            ));
        }
        let increasing = f_end > f_start;
        for pair in samples.windows(2) {
            let (u0, f0) = pair[0];
            let (u1, f1) = pair[1];
            let rising = f1 > f0;
            if f1 == f0 || rising != increasing {
                return Err(NomoError::domain(
                    "",
                    alloc::format!(
                        "`{}`: function is not strictly monotonic between u = {u0} and u = {u1}",
                        self.title
                    ),
                ));
            }
        }

        let ticks: Vec<Tick> = tick_values
            .into_iter()
            .map(|t| {
                let fn_value = self.eval(t.value);
                Tick {
                    value: t.value,
                    level: t.level,
                    label: (t.level < self.tick_text_levels)
                        .then(|| format_tick_with_step(t.value, t.step)),
                    fn_value,
                    position: (fn_value - f_start) / (f_end - f_start),
                }
            })
            .collect();

        tracing::debug!(
            title = %self.title,
            ticks = ticks.len(),
            f_start,
            f_end,
            "built scale"
        );

        Ok(Scale {
            spec: self.clone(),
            ticks,
            f_start,
            f_end,
        })
    }
}

/// A tick of a built scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Domain value.
    pub value: f64,
    /// Granularity level (0 = coarsest).
    pub level: usize,
    /// Label text, if this level is labeled.
    pub label: Option<String>,
    /// Mapping function applied to `value`.
    pub fn_value: f64,
    /// `fn_value` normalized so `u_min` maps to 0 and `u_max` maps to 1.
    pub position: f64,
}

/// A validated scale with its ticks.
#[derive(Clone, Debug)]
pub struct Scale {
    spec: ScaleSpec,
    ticks: Vec<Tick>,
    f_start: f64,
    f_end: f64,
}

impl Scale {
    /// The spec this scale was built from.
    pub fn spec(&self) -> &ScaleSpec {
        &self.spec
    }

    /// Ticks sorted by domain value.
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Evaluates the mapping function.
    pub fn eval(&self, u: f64) -> f64 {
        self.spec.eval(u)
    }

    /// Function values at `u_min` and `u_max`, in that order.
    pub fn fn_ends(&self) -> (f64, f64) {
        (self.f_start, self.f_end)
    }

    /// Smallest and largest function value over the domain.
    pub fn fn_range(&self) -> (f64, f64) {
        (self.f_start.min(self.f_end), self.f_start.max(self.f_end))
    }

    /// Whether the mapping function increases with `u`.
    pub fn is_increasing(&self) -> bool {
        self.f_end > self.f_start
    }

    /// Whether `u` lies inside the closed domain.
    pub fn contains(&self, u: f64) -> bool {
        let slack = 1e-12 * (self.spec.u_max - self.spec.u_min);
        u.is_finite() && u >= self.spec.u_min - slack && u <= self.spec.u_max + slack
    }

    /// Normalized position of `u` along the scale (0 at `u_min`, 1 at `u_max`).
    pub fn position(&self, u: f64) -> f64 {
        (self.eval(u) - self.f_start) / (self.f_end - self.f_start)
    }

    /// Finds the domain value whose function value is `target`, by bisection.
    ///
    /// Fails with [`NomoError::Unsolvable`] when `target` lies outside the function range of the
    /// domain.
    pub fn invert(&self, target: f64) -> NomoResult<f64> {
        let (lo_f, hi_f) = self.fn_range();
        let slack = 1e-9 * (hi_f - lo_f);
        if !target.is_finite() || target < lo_f - slack || target > hi_f + slack {
            return Err(NomoError::unsolvable(
                "",
                alloc::format!(
                    "`{}`: function value {target} is outside [{lo_f}, {hi_f}]",
                    self.spec.title
                ),
            ));
        }
        let sign = if self.is_increasing() { 1.0 } else { -1.0 };
        let (mut lo, mut hi) = (self.spec.u_min, self.spec.u_max);
        let tolerance = 1e-14 * (hi - lo).max(lo.abs()).max(hi.abs());
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if (hi - lo) <= tolerance {
                break;
            }
            if sign * (self.eval(mid) - target) < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(0.5 * (lo + hi))
    }
}
