// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick label formatting.

extern crate alloc;

use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Number of decimals needed to print multiples of `step` exactly.
///
/// Steps produced by the tick policies carry a single significant digit, so the exponent of the
/// step is all we need.
pub(crate) fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    let exponent = (step.log10() + 1e-9).floor();
    if exponent >= 0.0 {
        0
    } else {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "negative exponent of a finite f64 step, capped at 17"
        )]
        {
            (-exponent).min(17.0) as usize
        }
    }
}

/// Formats a tick value using the precision implied by `step`.
pub(crate) fn format_tick_with_step(value: f64, step: f64) -> String {
    let decimals = decimals_for_step(step);
    // Avoid printing "-0" for values that are zero up to rounding.
    let value = if step > 0.0 && value.abs() < step * 1e-6 {
        0.0
    } else {
        value
    };
    alloc::format!("{value:.decimals$}")
}
