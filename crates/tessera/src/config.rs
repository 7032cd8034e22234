//! Configuration types for Tessera diagram rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, styled, navigated and exported. All types implement
//! [`serde::Deserialize`] and every field has a default, so a partial TOML
//! file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Spacing and sizing used by the layout engines.
//! - [`StyleConfig`] - Palette, theme mode and canvas background.
//! - [`ViewportConfig`] - Zoom limits, zoom steps and zoom anchor policy.
//! - [`ExportConfig`] - Pixel widths of the raster export tiers.
//!
//! # Example
//!
//! ```
//! # use tessera::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.viewport().max_zoom(), 4.0);
//! ```

use serde::Deserialize;

use tessera_core::color::Color;

use crate::{
    error::TesseraError,
    theme::{PaletteName, ThemeMode},
    viewport::ZoomAnchor,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    viewport: ViewportConfig,

    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        layout: LayoutConfig,
        style: StyleConfig,
        viewport: ViewportConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            layout,
            style,
            viewport,
            export,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns a mutable reference to the style section.
    ///
    /// Used by front ends to apply command-line overrides.
    pub fn style_mut(&mut self) -> &mut StyleConfig {
        &mut self.style
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Config`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), TesseraError> {
        let viewport = &self.viewport;
        if !(viewport.min_zoom > 0.0 && viewport.min_zoom <= viewport.max_zoom) {
            return Err(TesseraError::Config(format!(
                "zoom range [{}, {}] must be positive and ordered",
                viewport.min_zoom, viewport.max_zoom
            )));
        }
        let steps_valid = viewport.zoom_in_step > 1.0
            && viewport.zoom_out_step > 0.0
            && viewport.zoom_out_step < 1.0;
        if !steps_valid {
            return Err(TesseraError::Config(format!(
                "zoom steps must satisfy zoom_out_step < 1 < zoom_in_step, got {} and {}",
                viewport.zoom_out_step, viewport.zoom_in_step
            )));
        }

        let layout = &self.layout;
        for (name, fraction) in [
            ("waterfall_height_fraction", layout.waterfall_height_fraction),
            ("comparison_height_fraction", layout.comparison_height_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(TesseraError::Config(format!(
                    "{name} must be in (0, 1], got {fraction}"
                )));
            }
        }

        let export = &self.export;
        if export.small_width == 0 || export.medium_width == 0 || export.large_width == 0 {
            return Err(TesseraError::Config(
                "export tier widths must be non-zero".to_string(),
            ));
        }

        self.style.background_color().map_err(TesseraError::Config)?;

        Ok(())
    }
}

/// Spacing and sizing used by the layout engines.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Inset applied to every side of a treemap rectangle.
    treemap_gap: f32,
    hierarchy_node_width: f32,
    hierarchy_node_height: f32,
    /// Horizontal gap between nodes on the same hierarchy level.
    hierarchy_spacing: f32,
    waterfall_bar_width: f32,
    waterfall_bar_gap: f32,
    /// Share of the container height used by the tallest waterfall bar.
    waterfall_height_fraction: f32,
    comparison_bar_width: f32,
    comparison_bar_gap: f32,
    comparison_height_fraction: f32,
    /// Margin between the container edge and diagram content.
    padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            treemap_gap: 2.0,
            hierarchy_node_width: 140.0,
            hierarchy_node_height: 56.0,
            hierarchy_spacing: 24.0,
            waterfall_bar_width: 56.0,
            waterfall_bar_gap: 24.0,
            waterfall_height_fraction: 0.7,
            comparison_bar_width: 72.0,
            comparison_bar_gap: 32.0,
            comparison_height_fraction: 0.8,
            padding: 24.0,
        }
    }
}

impl LayoutConfig {
    pub fn treemap_gap(&self) -> f32 {
        self.treemap_gap
    }

    pub fn hierarchy_node_width(&self) -> f32 {
        self.hierarchy_node_width
    }

    pub fn hierarchy_node_height(&self) -> f32 {
        self.hierarchy_node_height
    }

    pub fn hierarchy_spacing(&self) -> f32 {
        self.hierarchy_spacing
    }

    pub fn waterfall_bar_width(&self) -> f32 {
        self.waterfall_bar_width
    }

    pub fn waterfall_bar_gap(&self) -> f32 {
        self.waterfall_bar_gap
    }

    pub fn waterfall_height_fraction(&self) -> f32 {
        self.waterfall_height_fraction
    }

    pub fn comparison_bar_width(&self) -> f32 {
        self.comparison_bar_width
    }

    pub fn comparison_bar_gap(&self) -> f32 {
        self.comparison_bar_gap
    }

    pub fn comparison_height_fraction(&self) -> f32 {
        self.comparison_height_fraction
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}

/// Visual styling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    palette: PaletteName,
    theme: ThemeMode,
    /// Canvas background override, as a color string.
    background_color: Option<String>,
    /// Height reserved above the diagram for the title and metrics strip.
    header_height: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            palette: PaletteName::default(),
            theme: ThemeMode::default(),
            background_color: None,
            header_height: 72.0,
        }
    }
}

impl StyleConfig {
    pub fn palette(&self) -> PaletteName {
        self.palette
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn set_palette(&mut self, palette: PaletteName) {
        self.palette = palette;
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}

/// Zoom limits and policy for the viewport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    min_zoom: f32,
    max_zoom: f32,
    zoom_in_step: f32,
    zoom_out_step: f32,
    zoom_anchor: ZoomAnchor,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_in_step: 1.1,
            zoom_out_step: 0.9,
            zoom_anchor: ZoomAnchor::default(),
        }
    }
}

impl ViewportConfig {
    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn zoom_in_step(&self) -> f32 {
        self.zoom_in_step
    }

    pub fn zoom_out_step(&self) -> f32 {
        self.zoom_out_step
    }

    pub fn zoom_anchor(&self) -> ZoomAnchor {
        self.zoom_anchor
    }
}

/// Target pixel widths for each raster export tier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    small_width: u32,
    medium_width: u32,
    large_width: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            small_width: 800,
            medium_width: 1600,
            large_width: 3200,
        }
    }
}

impl ExportConfig {
    pub fn small_width(&self) -> u32 {
        self.small_width
    }

    pub fn medium_width(&self) -> u32 {
        self.medium_width
    }

    pub fn large_width(&self) -> u32 {
        self.large_width
    }
}
