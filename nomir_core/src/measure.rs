// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for label placement.
//!
//! Labels stay unshaped until the document viewer draws them, so label thinning and the PDF
//! backend's anchoring work from rough extents supplied by a [`TextMeasurer`].

/// Estimates the extent of a text run.
pub trait TextMeasurer {
    /// Returns `(width, height)` in the same units as `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Per-glyph advance estimates for a Helvetica-like face.
///
/// Tick labels are mostly digits and decimal points, so narrow punctuation gets its own advance
/// instead of the average letter width. Height is always one em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl HeuristicTextMeasurer {
    /// Advance of `c` in ems.
    fn advance(c: char) -> f64 {
        match c {
            '.' | ',' | ':' | ';' | '\'' | '|' | 'i' | 'l' => 0.28,
            ' ' | '(' | ')' | '[' | ']' | '-' => 0.33,
            '0'..='9' | '+' | '=' | '^' => 0.556,
            _ => 0.6,
        }
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let ems: f64 = text.chars().map(Self::advance).sum();
        (ems * font_size, font_size)
    }
}
