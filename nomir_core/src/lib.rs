// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nomograph building blocks.
//!
//! This crate turns a description of a nomograph into an in-memory drawing:
//! - **Scales** pair a domain with a monotonic mapping function and carry leveled, labeled ticks.
//! - **Topologies** place the scales of a block so that valid readings are collinear.
//! - **Isopleths** are solved by propagating known values through the block's stages.
//! - **Pages** place blocks side by side, apply page transforms and emit [`Mark`]s.
//!
//! Writing the drawing to SVG or PDF lives in a separate crate; this one is `no_std` and only
//! needs `alloc`.

#![no_std]

extern crate alloc;

mod axis;
mod block;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod isopleth;
mod mark;
mod measure;
mod page;
mod placement;
mod rule_mark;
mod scale;
mod text_mark;
mod ticks;
mod title;
mod topology;
mod transform;
pub mod z_order;

pub use axis::{AxisStyle, StrokeStyle};
pub use block::{Block, BlockSpec};
pub use error::{NomoError, NomoResult};
pub use isopleth::{
    COLLINEARITY_TOLERANCE, IsoValue, IsoplethQuery, IsoplethSolution, IsoplethStyle,
};
pub use mark::{
    Drawing, Mark, MarkKind, PathMark, TextAnchor, TextBaseline, TextMark, estimate_text_bounds,
};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use page::{Page, PageSpec};
pub use placement::{Coordinate, Placement, collinearity_residual};
pub use rule_mark::RuleMarkSpec;
pub use scale::{Scale, ScaleFn, ScaleSpec, ScaleType, Tick, TickSide};
pub use text_mark::TextMarkSpec;
pub use ticks::{LinearTicks, LogTicks, MAX_TICKS_PER_LEVEL, TickPolicy, TickValue};
pub use title::TitleSpec;
pub use topology::{AxisLine, BlockLayout, LineKind, Stage, Topology};
pub use transform::{Transform, bounding_box, fold_transforms, text_angle};
