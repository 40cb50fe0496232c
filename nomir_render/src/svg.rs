// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG backend.
//!
//! One page per document, sized in centimetres. The viewBox uses the same units, so paper
//! coordinates only need their y axis flipped.

use kurbo::Point;
use nomir_core::{StrokeStyle, TextAnchor, TextBaseline, TextMark};
use peniko::Brush;

use crate::RenderError;
use crate::backend::DocumentBackend;

/// Decimals written for every coordinate.
const PRECISION: usize = 4;

/// An SVG document built in memory.
#[derive(Debug, Default)]
pub struct SvgDocument {
    out: String,
    height: f64,
    page_open: bool,
}

impl SvgDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    fn flip(&self, p: Point) -> (String, String) {
        (num(p.x), num(self.height - p.y))
    }
}

impl DocumentBackend for SvgDocument {
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        self.height = height;
        self.page_open = true;
        self.out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        self.out.push('\n');
        self.out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}cm" height="{h}cm" viewBox="0 0 {w} {h}">"#,
            w = num(width),
            h = num(height),
        ));
        self.out.push('\n');
        self.out
            .push_str(r#"<g font-family="Helvetica, Arial, sans-serif" stroke-linecap="round">"#);
        self.out.push('\n');
        Ok(())
    }

    fn draw_line(&mut self, points: &[Point], stroke: &StrokeStyle) -> Result<(), RenderError> {
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let (x, y) = self.flip(*p);
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            d.push_str(&format!("{cmd}{x} {y}"));
        }
        self.out.push_str(&format!(r#"<path d="{d}" fill="none""#));
        write_paint_attr(&mut self.out, "stroke", &stroke.brush);
        self.out.push_str(&format!(
            r#" stroke-width="{}"/>"#,
            num(stroke.stroke_width)
        ));
        self.out.push('\n');
        Ok(())
    }

    fn draw_text(&mut self, t: &TextMark) -> Result<(), RenderError> {
        let (x, y) = self.flip(t.pos);
        let baseline = match t.baseline {
            TextBaseline::Top => "hanging",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Bottom => "ideographic",
        };
        self.out.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="{}" dominant-baseline="{baseline}""#,
            num(t.font_size)
        ));
        // SVG rotates clockwise in its y-down frame.
        let angle = num(-t.angle);
        if angle != "0" {
            self.out
                .push_str(&format!(r#" transform="rotate({angle} {x} {y})""#));
        }
        self.out.push_str(match t.anchor {
            TextAnchor::Start => r#" text-anchor="start""#,
            TextAnchor::Middle => r#" text-anchor="middle""#,
            TextAnchor::End => r#" text-anchor="end""#,
        });
        write_paint_attr(&mut self.out, "fill", &t.fill);
        self.out.push('>');
        self.out.push_str(&escape_xml(&t.text));
        self.out.push_str("</text>\n");
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), RenderError> {
        if self.page_open {
            self.out.push_str("</g>\n</svg>\n");
            self.page_open = false;
        }
        Ok(())
    }

    fn save(mut self) -> Result<Vec<u8>, RenderError> {
        self.end_page()?;
        Ok(self.out.into_bytes())
    }
}

/// Formats a number with fixed precision, trimming trailing zeros.
fn num(v: f64) -> String {
    let precision = PRECISION;
    let mut s = format!("{v:.precision$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = String::from("0");
    }
    s
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let fill_opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, fill_opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{}""#, num(o)));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use nomir_core::{MarkKind, TextMarkSpec};
    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn numbers_are_trimmed_and_stable() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.123_456), "0.1235");
        assert_eq!(num(-0.000_01), "0");
        assert_eq!(num(20.5), "20.5");
    }

    #[test]
    fn y_axis_is_flipped() {
        let mut doc = SvgDocument::new();
        doc.begin_page(20.0, 10.0).unwrap();
        doc.draw_line(
            &[Point::new(1.0, 1.0), Point::new(2.0, 9.0)],
            &StrokeStyle::solid(css::BLACK, 0.02),
        )
        .unwrap();
        let bytes = doc.save().unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains(r#"d="M1 9 L2 1""#), "{svg}");
        assert!(svg.contains(r#"width="20cm" height="10cm""#), "{svg}");
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn text_is_escaped_and_rotated() {
        let mut doc = SvgDocument::new();
        doc.begin_page(10.0, 10.0).unwrap();
        let MarkKind::Text(text) = TextMarkSpec::new(Point::new(1.0, 2.0), "a<b")
            .with_angle(90.0)
            .mark()
            .kind
        else {
            panic!("expected text");
        };
        doc.draw_text(&text).unwrap();
        let svg = String::from_utf8(doc.save().unwrap()).unwrap();
        assert!(svg.contains("a&lt;b"), "{svg}");
        assert!(svg.contains(r#"transform="rotate(-90 1 8)""#), "{svg}");
    }

    #[test]
    fn translucent_paint_writes_opacity() {
        let mut doc = SvgDocument::new();
        doc.begin_page(10.0, 10.0).unwrap();
        doc.draw_line(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            &StrokeStyle::solid(css::RED.with_alpha(0.6), 0.1),
        )
        .unwrap();
        let svg = String::from_utf8(doc.save().unwrap()).unwrap();
        let line = svg.lines().find(|l| l.starts_with("<path")).unwrap();
        assert_eq!(
            line,
            r##"<path d="M0 10 L1 10" fill="none" stroke="#ff0000" stroke-opacity="0.6" stroke-width="0.1"/>"##
        );
    }
}
