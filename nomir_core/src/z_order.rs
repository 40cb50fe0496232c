// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for generated marks.
//!
//! Every [`crate::Mark`] carries an explicit `z_index`. Emitters sort by
//! `(z_index, insertion order)` for a deterministic tie-break.

/// Turning (reference) lines, drawn behind everything else.
pub const REFERENCE_LINES: i32 = -50;

/// Scale lines and tick marks.
pub const SCALE_RULES: i32 = 10;
/// Isopleths, drawn over the scales they cross.
pub const ISOPLETHS: i32 = 20;

/// Tick labels.
pub const SCALE_LABELS: i32 = 40;
/// Scale titles.
pub const SCALE_TITLES: i32 = 50;

/// Page-level titles and annotations.
pub const TITLES: i32 = 80;
