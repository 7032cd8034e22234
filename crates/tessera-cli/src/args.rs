//! Command-line argument definitions for the Tessera CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input file, output format and
//! location, canvas size, style overrides, configuration file selection and
//! logging verbosity.

use clap::{Parser, ValueEnum};

use tessera::{
    ExportTier,
    theme::{PaletteName, ThemeMode},
};

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

/// Command-line arguments for the Tessera diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram JSON file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Output path: a file for SVG (default `out.svg`), a directory for PNG
    /// (default the current directory)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// PNG resolution tier (small, medium, large)
    #[arg(long, default_value_t = ExportTier::Medium)]
    pub tier: ExportTier,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 800.0)]
    pub height: f32,

    /// Palette override (default, ocean, sunset, monochrome)
    #[arg(long)]
    pub palette: Option<PaletteName>,

    /// Theme mode override (light, dark)
    #[arg(long)]
    pub theme: Option<ThemeMode>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
