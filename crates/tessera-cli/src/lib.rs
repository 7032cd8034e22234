//! Tessera CLI library
//!
//! This module contains the core CLI logic for the Tessera diagram tool:
//! load configuration, read a diagram JSON file, and write either an SVG
//! document or a PNG image at a resolution tier.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};
pub use error_adapter::ErrorAdapter;

use std::{fs, path::Path};

use log::info;

use tessera::{DiagramView, TesseraError, geometry::Size};

/// Run the Tessera CLI application
///
/// This function processes the input file through the Tessera pipeline and
/// writes the result in the requested format.
///
/// # Errors
///
/// Returns `TesseraError` for:
/// - File I/O errors
/// - Configuration loading or validation errors
/// - Malformed diagram input
/// - Layout errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), TesseraError> {
    info!(
        input_path = args.input,
        format:? = args.format;
        "Processing diagram"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(palette) = args.palette {
        app_config.style_mut().set_palette(palette);
    }
    if let Some(theme) = args.theme {
        app_config.style_mut().set_theme(theme);
    }

    let source = fs::read_to_string(&args.input)?;
    let data = tessera::parse_diagram(&source)?;

    let mut view = DiagramView::new(data, app_config, Size::new(args.width, args.height))?;

    match args.format {
        OutputFormat::Svg => {
            let output = args.output.as_deref().unwrap_or("out.svg");
            let svg = view.render_svg()?;
            fs::write(output, svg)?;
            info!(output_file = output; "SVG exported successfully");
        }
        OutputFormat::Png => {
            let directory = Path::new(args.output.as_deref().unwrap_or("."));
            let image = view.export(args.tier, directory)?.wait()?;
            info!(
                output_file = image.path().display().to_string(),
                width = image.width(),
                height = image.height();
                "PNG exported successfully"
            );
        }
    }

    Ok(())
}
