// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests: page spec in, document bytes out.

use std::path::PathBuf;

use nomir_core::{
    BlockSpec, IsoValue, IsoplethQuery, NomoError, PageSpec, ScaleSpec, ScaleType, Transform,
};
use nomir_render::{Format, RenderError, render_to_bytes, write_page};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nomir_render_{}_{name}", std::process::id()))
}

fn psi_page(output: &str) -> PageSpec {
    let block = BlockSpec::new("type_3")
        .with_scale(
            ScaleSpec::new(0.1, 1.5, |u| -1.38 * u * u)
                .with_title("RD")
                .with_tick_levels(2, 1),
        )
        .with_scale(
            ScaleSpec::new(0.1, 10.0, |u| 5.03 - 1.91 * (1.0 + u).log10())
                .with_scale_type(ScaleType::Logarithmic)
                .with_title("SV")
                .with_tick_levels(2, 1),
        )
        .with_scale(
            ScaleSpec::new(0.0, 5.0, |u| -u)
                .with_title("p")
                .with_tick_levels(3, 2),
        )
        .with_scale(
            ScaleSpec::new(10.0, 2000.0, |u| -0.01 * u.sqrt())
                .with_scale_type(ScaleType::Logarithmic)
                .with_title("C+P")
                .with_tick_levels(2, 1),
        )
        .with_reference_titles(["Turning Line"])
        .with_isopleth(IsoplethQuery::new([
            IsoValue::Known(1.0),
            IsoValue::Known(2.0),
            IsoValue::Unknown,
            IsoValue::Known(200.0),
        ]));
    PageSpec::new(output, 20.0, 20.0)
        .with_block(block)
        .with_transform(Transform::Rotate(0.01))
        .with_transform(Transform::ScalePaper)
        .with_title("AASHO PSI", 21.0)
}

#[test]
fn composing_twice_gives_identical_svg() {
    let spec = psi_page("psi.svg");
    let a = render_to_bytes(&spec.compose().unwrap(), Format::Svg).unwrap();
    let b = render_to_bytes(&spec.compose().unwrap(), Format::Svg).unwrap();
    assert_eq!(a, b);
    let svg = String::from_utf8(a).unwrap();
    assert!(svg.contains(">Turning Line</text>"));
    assert!(svg.contains(">AASHO PSI</text>"));
}

#[test]
fn psi_isopleth_solves_for_serviceability() {
    let page = psi_page("psi.svg").compose().unwrap();
    let solution = &page.blocks()[0].solutions()[0];
    let (index, p) = solution.solved.unwrap();
    assert_eq!(index, 2);
    let expected = 5.03 - 1.91 * 3.0_f64.log10() - 0.01 * 200.0_f64.sqrt() - 1.38;
    assert!((p - expected).abs() < 1e-8, "{p} vs {expected}");
    assert!(solution.is_consistent());
}

#[test]
fn write_page_creates_the_file() {
    let path = temp_path("written.svg");
    let spec = psi_page(path.to_str().unwrap());
    let written = write_page(&spec).unwrap();
    assert_eq!(written, path);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(
        bytes,
        render_to_bytes(&spec.compose().unwrap(), Format::Svg).unwrap()
    );
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn unsupported_topology_writes_no_file() {
    let path = temp_path("nonexistent.svg");
    let _ = std::fs::remove_file(&path);
    let mut spec = psi_page(path.to_str().unwrap());
    spec.blocks[0].topology = String::from("nonexistent");
    let err = write_page(&spec).unwrap_err();
    assert!(
        matches!(
            err,
            RenderError::Layout(NomoError::UnsupportedTopology(ref name)) if name == "nonexistent"
        ),
        "{err:?}"
    );
    assert!(!path.exists());
}

#[test]
fn unknown_extension_is_rejected() {
    let err = write_page(&psi_page("chart.bmp")).unwrap_err();
    assert!(matches!(err, RenderError::UnsupportedFormat(ref ext) if ext == "bmp"), "{err:?}");
}

#[test]
fn unwritable_path_surfaces_io_error() {
    let dir = temp_path("missing_dir");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("out.svg");
    let err = write_page(&psi_page(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }), "{err:?}");
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_output_starts_with_header() {
    let page = psi_page("psi.pdf").compose().unwrap();
    let bytes = render_to_bytes(&page, Format::Pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
