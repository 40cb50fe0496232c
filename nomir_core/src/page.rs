// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page composition.
//!
//! A page lays its blocks out left to right, folds the transform list into one affine map,
//! draws every block through it and finally places the title. Paper units are centimetres with
//! y pointing up.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::block::{Block, BlockSpec};
use crate::error::{NomoError, NomoResult};
use crate::mark::Drawing;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::title::TitleSpec;
use crate::transform::{Transform, bounding_box, fold_transforms, text_angle};

/// A complete nomograph page.
#[derive(Clone, Debug)]
pub struct PageSpec {
    /// Where the emitter writes the document; the extension picks the format.
    pub output_filename: String,
    /// Paper width.
    pub paper_width: f64,
    /// Paper height.
    pub paper_height: f64,
    /// Blocks, laid out left to right.
    pub blocks: Vec<BlockSpec>,
    /// Page transforms, applied in order.
    pub transforms: Vec<Transform>,
    /// Page title.
    pub title: TitleSpec,
    /// Vertical position of the title's center on paper.
    pub title_y: f64,
    /// Space kept free around the chart by [`Transform::ScalePaper`].
    pub margin: f64,
    /// Horizontal gap between neighbouring blocks, in layout units.
    pub block_gap: f64,
}

impl PageSpec {
    /// Creates a page of the given paper size with no blocks.
    pub fn new(output_filename: impl Into<String>, paper_width: f64, paper_height: f64) -> Self {
        Self {
            output_filename: output_filename.into(),
            paper_width,
            paper_height,
            blocks: Vec::new(),
            transforms: Vec::new(),
            title: TitleSpec::new(""),
            title_y: paper_height,
            margin: 1.0,
            block_gap: 2.0,
        }
    }

    /// Appends a block.
    pub fn with_block(mut self, block: BlockSpec) -> Self {
        self.blocks.push(block);
        self
    }

    /// Appends a transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Sets the title text and its vertical position.
    pub fn with_title(mut self, text: impl Into<String>, title_y: f64) -> Self {
        self.title.text = text.into();
        self.title_y = title_y;
        self
    }

    /// Sets the title styling, keeping its position.
    pub fn with_title_spec(mut self, title: TitleSpec) -> Self {
        self.title = title;
        self
    }

    /// Sets the margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the gap between blocks.
    pub fn with_block_gap(mut self, block_gap: f64) -> Self {
        self.block_gap = block_gap;
        self
    }

    /// Builds every block and composes the page drawing.
    pub fn compose(&self) -> NomoResult<Page> {
        self.compose_with(&HeuristicTextMeasurer)
    }

    /// Like [`PageSpec::compose`], with a custom text measurer for label thinning.
    pub fn compose_with(&self, measurer: &dyn TextMeasurer) -> NomoResult<Page> {
        for (field, value) in [
            ("paper_width", self.paper_width),
            ("paper_height", self.paper_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(NomoError::DegenerateLayout {
                    field: String::from(field),
                    value,
                });
            }
        }
        let max_margin = 0.5 * self.paper_width.min(self.paper_height);
        if !(self.margin.is_finite() && self.margin >= 0.0 && self.margin < max_margin) {
            return Err(NomoError::DegenerateLayout {
                field: String::from("margin"),
                value: self.margin,
            });
        }
        if !(self.block_gap.is_finite() && self.block_gap >= 0.0) {
            return Err(NomoError::DegenerateLayout {
                field: String::from("block_gap"),
                value: self.block_gap,
            });
        }
        if self.blocks.is_empty() {
            return Err(NomoError::ConfigurationMismatch {
                field: String::from("blocks"),
                expected: String::from("at least 1 block"),
                actual: 0,
            });
        }

        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                spec.build()
                    .map_err(|err| err.within(&alloc::format!("blocks[{i}]")))
            })
            .collect::<NomoResult<Vec<Block>>>()?;

        // Side by side: each block's skeleton starts where the previous one ended plus the gap.
        let mut offsets = Vec::with_capacity(blocks.len());
        let mut skeleton: Vec<Point> = Vec::new();
        let mut cursor = 0.0;
        for block in &blocks {
            let points = block.skeleton();
            let (x0, width) =
                bounding_box(points.iter().copied()).map_or((0.0, 0.0), |r| (r.x0, r.width()));
            let offset = Affine::translate(Vec2::new(cursor - x0, 0.0));
            skeleton.extend(points.into_iter().map(|p| offset * p));
            offsets.push(offset);
            cursor += width + self.block_gap;
        }

        let target = Rect::new(
            self.margin,
            self.margin,
            self.paper_width - self.margin,
            self.paper_height - self.margin,
        );
        let transform = fold_transforms(&self.transforms, &skeleton, target)?;
        let angle = text_angle(transform);

        let mut drawing = Drawing::new();
        for (block, offset) in blocks.iter().zip(&offsets) {
            block.draw(transform * *offset, angle, measurer, &mut drawing);
        }
        drawing.extend(
            self.title
                .marks(Point::new(0.5 * self.paper_width, self.title_y)),
        );

        tracing::debug!(
            blocks = blocks.len(),
            marks = drawing.len(),
            text_angle = angle,
            "composed page"
        );

        Ok(Page {
            output_filename: self.output_filename.clone(),
            paper_width: self.paper_width,
            paper_height: self.paper_height,
            transform,
            blocks,
            drawing,
        })
    }
}

/// A composed page: built blocks plus the drawing to emit.
#[derive(Clone, Debug)]
pub struct Page {
    output_filename: String,
    paper_width: f64,
    paper_height: f64,
    transform: Affine,
    blocks: Vec<Block>,
    drawing: Drawing,
}

impl Page {
    /// Target file name.
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Paper size as `(width, height)`.
    pub fn paper_size(&self) -> (f64, f64) {
        (self.paper_width, self.paper_height)
    }

    /// Layout frame to paper map (before per-block offsets).
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Built blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Marks in paper coordinates.
    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mark::MarkKind;
    use crate::scale::ScaleSpec;

    fn sum_block() -> BlockSpec {
        BlockSpec::new("type_1")
            .with_scale(ScaleSpec::new(0.0, 10.0, |u| u))
            .with_scale(ScaleSpec::new(0.0, 10.0, |u| u))
            .with_scale(ScaleSpec::new(-20.0, 0.0, |u| u))
    }

    #[test]
    fn scale_paper_keeps_lines_inside_margins() {
        let page = PageSpec::new("out.svg", 20.0, 15.0)
            .with_block(sum_block())
            .with_transform(Transform::Rotate(10.0))
            .with_transform(Transform::ScalePaper)
            .compose()
            .unwrap();
        for mark in page.drawing().marks() {
            if let MarkKind::Path(p) = &mark.kind
                && mark.z_index == crate::z_order::SCALE_RULES
            {
                let b = kurbo::Shape::bounding_box(&p.path);
                // Ticks stick out by at most the longest tick length.
                assert!(b.x0 > 1.0 - 0.5 && b.x1 < 19.0 + 0.5, "{b:?}");
                assert!(b.y0 > 1.0 - 0.5 && b.y1 < 14.0 + 0.5, "{b:?}");
            }
        }
    }

    #[test]
    fn blocks_are_placed_side_by_side() {
        let page = PageSpec::new("out.svg", 30.0, 10.0)
            .with_block(sum_block())
            .with_block(sum_block())
            .with_block_gap(5.0)
            .compose()
            .unwrap();
        assert_eq!(page.blocks().len(), 2);
        // Without transforms, the second block starts at 10 + 5.
        let xs: std::vec::Vec<f64> = page
            .drawing()
            .marks()
            .iter()
            .filter(|m| m.z_index == crate::z_order::SCALE_RULES)
            .filter_map(|m| match &m.kind {
                MarkKind::Path(p) => Some(kurbo::Shape::bounding_box(&p.path).x0),
                MarkKind::Text(_) => None,
            })
            .collect();
        assert!(xs.iter().any(|x| (x - 15.0).abs() < 1e-9), "{xs:?}");
    }

    #[test]
    fn page_errors_carry_block_paths() {
        let err = PageSpec::new("out.svg", 20.0, 20.0)
            .with_block(sum_block())
            .with_block(BlockSpec::new("type_1").with_size(0.0, 10.0))
            .compose()
            .unwrap_err();
        assert_eq!(
            err,
            NomoError::DegenerateLayout {
                field: "blocks[1].width".into(),
                value: 0.0
            }
        );
        assert!(matches!(
            PageSpec::new("out.svg", 0.0, 20.0)
                .with_block(sum_block())
                .compose(),
            Err(NomoError::DegenerateLayout { .. })
        ));
        assert!(matches!(
            PageSpec::new("out.svg", 20.0, 20.0).compose(),
            Err(NomoError::ConfigurationMismatch { .. })
        ));
    }

    #[test]
    fn title_is_centered_horizontally() {
        let page = PageSpec::new("out.svg", 20.0, 20.0)
            .with_block(sum_block())
            .with_title("Title", 21.0)
            .compose()
            .unwrap();
        let title = page
            .drawing()
            .marks()
            .iter()
            .find_map(|m| match &m.kind {
                MarkKind::Text(t) if t.text == "Title" => Some(t.pos),
                _ => None,
            })
            .unwrap();
        assert!((title.x - 10.0).abs() < 1e-12 && (title.y - 21.0).abs() < 1e-12);
    }
}
