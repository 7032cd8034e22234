//! Scene export.
//!
//! - [`svg`] - Writes a [`Scene`] as an SVG document.
//! - [`raster`] - Rasterizes a scene to PNG on a background thread.
//!
//! [`Scene`]: crate::render::Scene

pub mod raster;
pub mod svg;

use crate::render::Scene;

/// Writes a finished scene somewhere.
pub trait Exporter {
    fn export_scene(&self, scene: &Scene) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Error {
    Render(String),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
