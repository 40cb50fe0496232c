// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PDF backend, built on `printpdf`.
//!
//! PDF has no text anchors, so runs are shifted by an estimate of their extent
//! ([`HeuristicTextMeasurer`]) before being placed.

use std::io::BufWriter;

use kurbo::{Point, Vec2};
use nomir_core::{HeuristicTextMeasurer, StrokeStyle, TextAnchor, TextBaseline, TextMark, TextMeasurer};
use peniko::Brush;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Pt, Rgb, TextMatrix,
};

use crate::RenderError;
use crate::backend::DocumentBackend;

const CM_TO_MM: f64 = 10.0;
const CM_TO_PT: f64 = 72.0 / 2.54;

/// A PDF document built in memory.
pub struct PdfDocumentBackend {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    layer: Option<PdfLayerReference>,
}

impl core::fmt::Debug for PdfDocumentBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PdfDocumentBackend")
            .field("page_open", &self.layer.is_some())
            .finish_non_exhaustive()
    }
}

impl PdfDocumentBackend {
    /// Creates an empty document titled `title`.
    pub fn new(title: &str) -> Result<Self, RenderError> {
        let doc = PdfDocument::empty(title);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            layer: None,
        })
    }

    fn layer(&self) -> Result<&PdfLayerReference, RenderError> {
        self.layer
            .as_ref()
            .ok_or_else(|| RenderError::Pdf(String::from("no page has been started")))
    }
}

fn mm(v: f64) -> Mm {
    Mm(v * CM_TO_MM)
}

fn pdf_color(brush: &Brush) -> Color {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            Color::Rgb(Rgb::new(
                f64::from(rgba.r) / 255.0,
                f64::from(rgba.g) / 255.0,
                f64::from(rgba.b) / 255.0,
                None,
            ))
        }
        _ => Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
    }
}

impl DocumentBackend for PdfDocumentBackend {
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        let (page, layer) = self.doc.add_page(mm(width), mm(height), "Layer 1");
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        Ok(())
    }

    fn draw_line(&mut self, points: &[Point], stroke: &StrokeStyle) -> Result<(), RenderError> {
        let layer = self.layer()?;
        layer.set_outline_color(pdf_color(&stroke.brush));
        layer.set_outline_thickness(stroke.stroke_width * CM_TO_PT);
        layer.add_shape(Line {
            points: points
                .iter()
                .map(|p| (printpdf::Point::new(mm(p.x), mm(p.y)), false))
                .collect(),
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
        Ok(())
    }

    fn draw_text(&mut self, t: &TextMark) -> Result<(), RenderError> {
        let (w, h) = HeuristicTextMeasurer.measure(&t.text, t.font_size);
        let dx = match t.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => -0.5 * w,
            TextAnchor::End => -w,
        };
        let dy = match t.baseline {
            TextBaseline::Top => -0.8 * h,
            TextBaseline::Middle => -0.3 * h,
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Bottom => 0.2 * h,
        };
        let theta = t.angle.to_radians();
        let (s, c) = theta.sin_cos();
        let shift = Vec2::new(c * dx - s * dy, s * dx + c * dy);
        let origin = t.pos + shift;

        let layer = self.layer()?;
        layer.begin_text_section();
        layer.set_font(&self.font, t.font_size * CM_TO_PT);
        layer.set_fill_color(pdf_color(&t.fill));
        layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt(origin.x * CM_TO_PT),
            Pt(origin.y * CM_TO_PT),
            t.angle,
        ));
        layer.write_text(t.text.clone(), &self.font);
        layer.end_text_section();
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), RenderError> {
        self.layer = None;
        Ok(())
    }

    fn save(self) -> Result<Vec<u8>, RenderError> {
        let mut out = BufWriter::new(Vec::new());
        self.doc
            .save(&mut out)
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
        out.into_inner()
            .map_err(|e| RenderError::Pdf(format!("{:?}", e.error())))
    }
}
