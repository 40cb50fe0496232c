// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page titles.
//!
//! Titles are placed in paper coordinates after every transform, so they stay horizontal and
//! keep their size regardless of how the chart itself is rotated or stretched.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use peniko::Brush;
use peniko::color::palette::css;

use crate::mark::{Mark, TextAnchor, TextBaseline};
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// A page-level title.
#[derive(Clone, Debug)]
pub struct TitleSpec {
    /// Title text (unshaped).
    pub text: String,
    /// Optional subtitle text (unshaped), drawn below the title.
    pub subtitle: Option<String>,
    /// Font size in paper units.
    pub font_size: f64,
    /// Subtitle font size in paper units.
    pub subtitle_font_size: f64,
    /// Fill paint.
    pub fill: Brush,
    /// Gap between the title and subtitle.
    pub subtitle_gap: f64,
    /// Rendering order hint (see [`crate::z_order`]).
    pub z_index: i32,
}

impl TitleSpec {
    /// Creates a title spec with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subtitle: None,
            font_size: 0.6,
            subtitle_font_size: 0.4,
            fill: Brush::from(css::BLACK),
            subtitle_gap: 0.15,
            z_index: z_order::TITLES,
        }
    }

    /// Sets the subtitle text.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Emits the title centered on `center`; the subtitle hangs below it.
    pub fn marks(&self, center: Point) -> Vec<Mark> {
        let mut out = Vec::new();
        if !self.text.is_empty() {
            out.push(
                TextMarkSpec::new(center, self.text.clone())
                    .with_font_size(self.font_size)
                    .with_fill(self.fill.clone())
                    .with_anchor(TextAnchor::Middle)
                    .with_baseline(TextBaseline::Middle)
                    .with_z_index(self.z_index)
                    .mark(),
            );
        }
        if let Some(subtitle) = &self.subtitle {
            let y = center.y
                - 0.5 * self.font_size
                - self.subtitle_gap.max(0.0)
                - 0.5 * self.subtitle_font_size;
            out.push(
                TextMarkSpec::new(Point::new(center.x, y), subtitle.clone())
                    .with_font_size(self.subtitle_font_size)
                    .with_fill(self.fill.clone())
                    .with_anchor(TextAnchor::Middle)
                    .with_baseline(TextBaseline::Middle)
                    .with_z_index(self.z_index)
                    .mark(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mark::MarkKind;

    #[test]
    fn subtitle_is_placed_below_the_title() {
        let title = TitleSpec::new("Title").with_subtitle("Subtitle");
        let marks = title.marks(Point::new(10.0, 21.0));
        assert_eq!(marks.len(), 2);
        let ys: std::vec::Vec<f64> = marks
            .iter()
            .filter_map(|m| match &m.kind {
                MarkKind::Text(t) => Some(t.pos.y),
                MarkKind::Path(_) => None,
            })
            .collect();
        assert!((ys[0] - 21.0).abs() < 1e-12);
        assert!(ys[1] < ys[0]);
    }

    #[test]
    fn empty_title_emits_nothing() {
        assert!(TitleSpec::new("").marks(Point::ORIGIN).is_empty());
    }
}
