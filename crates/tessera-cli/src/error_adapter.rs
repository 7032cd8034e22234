//! Error adapter for converting TesseraError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Input errors
//! carry the JSON source and point at the position the parser rejected.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use tessera::TesseraError;

/// Adapter rendering a [`TesseraError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a TesseraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TesseraError::Io(_) => "tessera::io",
            TesseraError::Input { .. } => "tessera::input",
            TesseraError::Config(_) => "tessera::config",
            TesseraError::Layout(_) => "tessera::layout",
            TesseraError::Export(_) => "tessera::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            TesseraError::Input { .. } => {
                "expected a diagram object with `layoutType`, `nodes` and `connections`"
            }
            TesseraError::Config(_) => "check the configuration file or the style overrides",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            TesseraError::Input { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let TesseraError::Input { err, src } = &self.0 else {
            return None;
        };
        let offset = self.0.input_offset()?;
        let length = usize::from(offset < src.len());

        let label = LabeledSpan::new_primary_with_span(
            Some(err.to_string()),
            SourceSpan::from((offset, length)),
        );
        Some(Box::new(std::iter::once(label)))
    }
}
