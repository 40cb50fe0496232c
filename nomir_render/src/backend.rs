// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability every document format provides.

use kurbo::{PathEl, Point};
use nomir_core::{MarkKind, Page, StrokeStyle, TextMark};

use crate::RenderError;

/// A vector document being written in memory.
///
/// Coordinates passed to a backend are paper coordinates: centimetres, y up.
pub trait DocumentBackend {
    /// Starts a page of the given size.
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError>;
    /// Strokes an open polyline.
    fn draw_line(&mut self, points: &[Point], stroke: &StrokeStyle) -> Result<(), RenderError>;
    /// Draws a text run.
    fn draw_text(&mut self, text: &TextMark) -> Result<(), RenderError>;
    /// Finishes the current page.
    fn end_page(&mut self) -> Result<(), RenderError>;
    /// Serializes the document.
    fn save(self) -> Result<Vec<u8>, RenderError>;
}

/// Replays a composed page into `backend` in paint order and returns the document bytes.
pub fn render_with<B: DocumentBackend>(page: &Page, mut backend: B) -> Result<Vec<u8>, RenderError> {
    let (width, height) = page.paper_size();
    backend.begin_page(width, height)?;
    let mut points: Vec<Point> = Vec::new();
    for mark in page.drawing().sorted() {
        match &mark.kind {
            MarkKind::Path(path) => {
                points.clear();
                for el in path.path.elements() {
                    match *el {
                        PathEl::MoveTo(p) => {
                            if points.len() > 1 {
                                backend.draw_line(&points, &path.stroke)?;
                            }
                            points.clear();
                            points.push(p);
                        }
                        PathEl::LineTo(p) => points.push(p),
                        PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => points.push(p),
                        PathEl::ClosePath => {
                            if let Some(first) = points.first().copied() {
                                points.push(first);
                            }
                        }
                    }
                }
                if points.len() > 1 {
                    backend.draw_line(&points, &path.stroke)?;
                }
            }
            MarkKind::Text(text) => backend.draw_text(text)?,
        }
    }
    backend.end_page()?;
    backend.save()
}
