// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders the AASHO Road Test flexible-pavement serviceability nomograph.
//!
//! The chart reads `p = 5.03 - 1.91 log10(1 + SV) - 0.01 sqrt(C + P) - 1.38 RD^2` as a four-scale
//! sum with one turning line. It writes `aasho_psi.svg` and, with the default `pdf` feature,
//! `aasho_psi.pdf`.

use std::path::Path;

use nomir_core::{BlockSpec, IsoValue, IsoplethQuery, PageSpec, ScaleSpec, ScaleType, Transform};
use nomir_render::RenderError;

fn psi_block() -> BlockSpec {
    let rd = ScaleSpec::new(0.1, 1.5, |u| -1.38 * u * u)
        .with_title("RD (Rutting Depth, in)")
        .with_tick_levels(2, 1);
    let sv = ScaleSpec::new(0.1, 10.0, |u| 5.03 - 1.91 * (1.0 + u).log10())
        .with_scale_type(ScaleType::Logarithmic)
        .with_title("SV (Slope Variance, deg)")
        .with_tick_levels(2, 1);
    let p = ScaleSpec::new(0.0, 5.0, |u| -u)
        .with_title("p (Present Serviceability Index)")
        .with_tick_levels(3, 2);
    let cp = ScaleSpec::new(10.0, 2000.0, |u| -0.01 * u.sqrt())
        .with_scale_type(ScaleType::Logarithmic)
        .with_title("C+P (Cracking and Patching, ft^2/1000 ft^2)")
        .with_tick_levels(2, 1);

    BlockSpec::new("type_3")
        .with_size(10.0, 10.0)
        .with_scale(rd)
        .with_scale(sv)
        .with_scale(p)
        .with_scale(cp)
        .with_reference_titles(["Turning Line"])
        .with_isopleth(IsoplethQuery::new([
            IsoValue::Known(1.0),
            IsoValue::Known(2.0),
            IsoValue::Unknown,
            IsoValue::Known(200.0),
        ]))
}

fn psi_page(output: &str) -> PageSpec {
    // SVG has no room outside the paper, so the title sits in the top margin band.
    PageSpec::new(output, 20.0, 20.0)
        .with_block(psi_block())
        .with_transform(Transform::Rotate(0.01))
        .with_transform(Transform::ScalePaper)
        .with_margin(1.5)
        .with_title(
            "p = 5.03 - 1.91 log(1 + SV) - 0.01 sqrt(C + P) - 1.38 RD^2",
            19.4,
        )
}

fn main() -> Result<(), RenderError> {
    let page = psi_page("aasho_psi.svg").compose()?;
    let solved = page
        .blocks()
        .first()
        .and_then(|block| block.solutions().first())
        .and_then(|solution| solution.solved);
    if let Some((_, p)) = solved {
        println!("isopleth RD = 1, SV = 2, C+P = 200 gives p = {p:.3}");
    }

    let mut outputs = vec!["aasho_psi.svg"];
    if cfg!(feature = "pdf") {
        outputs.push("aasho_psi.pdf");
    }
    for output in outputs {
        nomir_render::write_document(&page, Path::new(output))?;
        println!("wrote {output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use nomir_core::MarkKind;

    use super::*;

    #[test]
    fn psi_page_solves_and_keeps_the_title_on_paper() {
        let page = psi_page("aasho_psi.svg").compose().unwrap();
        let (index, p) = page.blocks()[0].solutions()[0].solved.unwrap();
        let expected = 5.03 - 1.91 * 3.0_f64.log10() - 0.01 * 200.0_f64.sqrt() - 1.38;
        assert_eq!(index, 2);
        assert!((p - expected).abs() < 1e-6, "{p} vs {expected}");

        let (width, height) = page.paper_size();
        let title = page
            .drawing()
            .marks()
            .iter()
            .find_map(|m| match &m.kind {
                MarkKind::Text(t) if t.text.starts_with("p = 5.03") => Some(t),
                _ => None,
            })
            .unwrap();
        assert!(title.pos.y + 0.5 * title.font_size <= height, "{:?}", title.pos);
        assert!((title.pos.x - 0.5 * width).abs() < 1e-12);
    }
}
