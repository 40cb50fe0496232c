// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document emitters for NomIR pages.
//!
//! [`write_page`] composes a [`PageSpec`], renders it completely in memory and only then opens
//! the output file, so layout errors never leave a partial document behind. The format follows
//! the file extension: `.svg` always, `.pdf` with the `pdf` feature.

mod backend;
mod error;
#[cfg(feature = "pdf")]
mod pdf;
mod svg;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nomir_core::{Page, PageSpec};

pub use backend::{DocumentBackend, render_with};
pub use error::RenderError;
#[cfg(feature = "pdf")]
pub use pdf::PdfDocumentBackend;
pub use svg::SvgDocument;

/// Output document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Scalable Vector Graphics.
    Svg,
    /// Portable Document Format (requires the `pdf` feature).
    Pdf,
}

impl Format {
    /// Picks the format from a file extension.
    ///
    /// Fails with [`RenderError::UnsupportedFormat`] for unknown extensions and for `.pdf` when
    /// the `pdf` feature is disabled.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "pdf" if cfg!(feature = "pdf") => Ok(Self::Pdf),
            _ => Err(RenderError::UnsupportedFormat(ext)),
        }
    }
}

/// Renders a composed page into document bytes.
pub fn render_to_bytes(page: &Page, format: Format) -> Result<Vec<u8>, RenderError> {
    match format {
        Format::Svg => render_with(page, SvgDocument::new()),
        #[cfg(feature = "pdf")]
        Format::Pdf => render_with(page, PdfDocumentBackend::new(page.output_filename())?),
        #[cfg(not(feature = "pdf"))]
        Format::Pdf => Err(RenderError::UnsupportedFormat(String::from("pdf"))),
    }
}

/// Writes a composed page to `path`, in the format its extension names.
pub fn write_document(page: &Page, path: &Path) -> Result<(), RenderError> {
    let format = Format::from_path(path)?;
    let bytes = render_to_bytes(page, format)?;
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    {
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tracing::info!(path = %path.display(), bytes = bytes.len(), ?format, "wrote document");
    Ok(())
}

/// Composes `spec` and writes it to its `output_filename`.
///
/// Returns the path written.
pub fn write_page(spec: &PageSpec) -> Result<PathBuf, RenderError> {
    let path = PathBuf::from(&spec.output_filename);
    // Reject unknown formats before doing any layout work.
    Format::from_path(&path)?;
    let page = spec.compose()?;
    write_document(&page, &path)?;
    Ok(path)
}
