// Copyright 2025 the NomIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building scales, blocks and pages.

extern crate alloc;

use alloc::string::String;

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type NomoResult<T> = Result<T, NomoError>;

/// Errors raised by the nomograph pipeline.
///
/// Every variant names the offending field so callers can point at the exact piece of
/// configuration that needs fixing. Fields use a path notation such as `blocks[0].scales[2]`.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum NomoError {
    /// A scale domain or mapping function is unusable.
    ///
    /// Raised for empty/inverted domains, non-finite function values, non-monotonic mappings,
    /// non-positive logarithmic domains and isopleth values outside the domain.
    #[error("domain error in `{field}`: {reason}")]
    Domain {
        /// Path of the offending scale or value.
        field: String,
        /// Human-readable description.
        reason: String,
    },
    /// The requested topology name is not one of the supported constructions.
    #[error("unsupported topology `{0}`")]
    UnsupportedTopology(String),
    /// A width, height or paper size is zero, negative or non-finite.
    #[error("degenerate layout: `{field}` must be positive and finite, got {value}")]
    DegenerateLayout {
        /// Path of the offending dimension.
        field: String,
        /// The rejected value.
        value: f64,
    },
    /// A list has the wrong number of entries.
    #[error("configuration mismatch in `{field}`: expected {expected}, got {actual}")]
    ConfigurationMismatch {
        /// Path of the offending list.
        field: String,
        /// What the configuration requires.
        expected: String,
        /// What was supplied.
        actual: usize,
    },
    /// An isopleth could not be solved.
    #[error("cannot solve `{field}`: {reason}")]
    Unsolvable {
        /// Path of the offending isopleth.
        field: String,
        /// Human-readable description.
        reason: String,
    },
}

impl NomoError {
    /// Prefixes the field path with `parent`, e.g. `scales[1]` becomes `blocks[0].scales[1]`.
    #[must_use]
    pub fn within(self, parent: &str) -> Self {
        let join = |field: String| {
            if field.is_empty() {
                String::from(parent)
            } else {
                alloc::format!("{parent}.{field}")
            }
        };
        match self {
            Self::Domain { field, reason } => Self::Domain {
                field: join(field),
                reason,
            },
            Self::DegenerateLayout { field, value } => Self::DegenerateLayout {
                field: join(field),
                value,
            },
            Self::ConfigurationMismatch {
                field,
                expected,
                actual,
            } => Self::ConfigurationMismatch {
                field: join(field),
                expected,
                actual,
            },
            Self::Unsolvable { field, reason } => Self::Unsolvable {
                field: join(field),
                reason,
            },
            other @ Self::UnsupportedTopology(_) => other,
        }
    }

    pub(crate) fn domain(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Domain {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsolvable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsolvable {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
