// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while writing documents.

use std::path::PathBuf;

use nomir_core::NomoError;
use thiserror::Error;

/// Errors raised by the chart emitter.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page could not be composed.
    #[error(transparent)]
    Layout(#[from] NomoError),
    /// The output file could not be created or written.
    #[error("cannot write `{}`: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The output extension does not name a supported (or enabled) format.
    #[error("unsupported output format `{0}`")]
    UnsupportedFormat(String),
    /// The PDF backend failed.
    #[error("PDF backend error: {0}")]
    Pdf(String),
}
