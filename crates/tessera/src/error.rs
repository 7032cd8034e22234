//! Error types for Tessera operations.
//!
//! This module provides the main error type [`TesseraError`] which wraps
//! the error conditions that can occur while loading, laying out and
//! exporting diagrams.

use std::io;

use thiserror::Error;

/// The main error type for Tessera operations.
///
/// The `Input` variant keeps the offending source text together with the
/// line and column reported by the JSON parser so front ends can point at
/// the failure.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid diagram input: {err}")]
    Input { err: serde_json::Error, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for TesseraError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl TesseraError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Input {
            err,
            src: src.into(),
        }
    }

    /// Byte offset of an input error within its source, if known.
    ///
    /// `serde_json` reports 1-based lines and columns; this converts them to
    /// an offset into `src`, clamped to the source length.
    pub fn input_offset(&self) -> Option<usize> {
        let Self::Input { err, src } = self else {
            return None;
        };
        if err.line() == 0 {
            return None;
        }

        let line_start: usize = src
            .split_inclusive('\n')
            .take(err.line() - 1)
            .map(str::len)
            .sum();
        Some((line_start + err.column().saturating_sub(1)).min(src.len()))
    }
}
