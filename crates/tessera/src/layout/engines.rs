//! Layout engine factory.
//!
//! The [`EngineBuilder`] selects an engine by [`LayoutType`], configures it
//! from the layout settings and caches it so repeated layouts of the same
//! type reuse one boxed engine.

use std::collections::HashMap;

use log::{debug, trace};

use tessera_core::{
    geometry::{Bounds, Insets, Size},
    model::{DiagramData, LayoutType, ResolvedNode},
};

use crate::{
    config::LayoutConfig,
    error::TesseraError,
    layout::{Layout, comparison, hierarchy, treemap, waterfall},
};

/// Trait implemented by every layout algorithm.
pub trait LayoutEngine {
    /// Calculate one rectangle per node inside `container`.
    ///
    /// `nodes` are already resolved: ids are present and unique.
    ///
    /// # Errors
    /// Returns `TesseraError::Layout` if the engine cannot place the nodes.
    fn calculate(
        &self,
        nodes: &[ResolvedNode<'_>],
        container: Bounds,
    ) -> Result<Layout, TesseraError>;
}

/// Builder for creating and configuring layout engines.
pub struct EngineBuilder {
    // Cache for reusing engines with the same configuration
    engines: HashMap<LayoutType, Box<dyn LayoutEngine>>,

    // Configuration options
    padding: Insets,
    treemap_gap: f32,
    node_size: Size,
    hierarchy_spacing: f32,
    waterfall_bar_width: f32,
    waterfall_bar_gap: f32,
    waterfall_height_fraction: f32,
    comparison_bar_width: f32,
    comparison_bar_gap: f32,
    comparison_height_fraction: f32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl EngineBuilder {
    /// Create a new engine builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine builder from the layout section of the configuration
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            engines: HashMap::new(),
            padding: Insets::uniform(config.padding()),
            treemap_gap: config.treemap_gap(),
            node_size: Size::new(config.hierarchy_node_width(), config.hierarchy_node_height()),
            hierarchy_spacing: config.hierarchy_spacing(),
            waterfall_bar_width: config.waterfall_bar_width(),
            waterfall_bar_gap: config.waterfall_bar_gap(),
            waterfall_height_fraction: config.waterfall_height_fraction(),
            comparison_bar_width: config.comparison_bar_width(),
            comparison_bar_gap: config.comparison_bar_gap(),
            comparison_height_fraction: config.comparison_height_fraction(),
        }
    }

    /// Set the margin between the container edge and the content of
    /// hierarchy, waterfall and comparison layouts
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self.engines.clear();
        self
    }

    /// Set the inset applied to each treemap rectangle
    pub fn with_treemap_gap(mut self, gap: f32) -> Self {
        self.treemap_gap = gap;
        self.engines.remove(&LayoutType::Treemap);
        self
    }

    /// Set the fixed node size used by the hierarchy layout
    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self.engines.remove(&LayoutType::Hierarchy);
        self
    }

    /// Set the bar width and gap of the waterfall layout
    pub fn with_waterfall_bars(mut self, width: f32, gap: f32) -> Self {
        self.waterfall_bar_width = width;
        self.waterfall_bar_gap = gap;
        self.engines.remove(&LayoutType::Waterfall);
        self
    }

    /// Set the bar width and gap of the comparison layout
    pub fn with_comparison_bars(mut self, width: f32, gap: f32) -> Self {
        self.comparison_bar_width = width;
        self.comparison_bar_gap = gap;
        self.engines.remove(&LayoutType::Comparison);
        self
    }

    /// Get an engine of the specified type with configured options
    pub fn engine(&mut self, layout_type: LayoutType) -> &dyn LayoutEngine {
        let engine = self.engines.entry(layout_type).or_insert_with(|| {
            debug!(layout_type:?; "Creating layout engine");
            let engine: Box<dyn LayoutEngine> = match layout_type {
                LayoutType::Treemap => {
                    let mut e = treemap::Engine::new();
                    e.set_gap(self.treemap_gap);
                    Box::new(e)
                }
                LayoutType::Hierarchy => {
                    let mut e = hierarchy::Engine::new();
                    e.set_node_size(self.node_size);
                    e.set_spacing(self.hierarchy_spacing);
                    e.set_padding(self.padding);
                    Box::new(e)
                }
                LayoutType::Waterfall => {
                    let mut e = waterfall::Engine::new();
                    e.set_bar_width(self.waterfall_bar_width);
                    e.set_bar_gap(self.waterfall_bar_gap);
                    e.set_height_fraction(self.waterfall_height_fraction);
                    e.set_padding(self.padding);
                    Box::new(e)
                }
                LayoutType::Comparison => {
                    let mut e = comparison::Engine::new();
                    e.set_bar_width(self.comparison_bar_width);
                    e.set_bar_gap(self.comparison_bar_gap);
                    e.set_height_fraction(self.comparison_height_fraction);
                    e.set_padding(self.padding);
                    Box::new(e)
                }
            };
            engine
        });
        // Dereference to avoid returning reference to temporary
        &**engine
    }

    /// Lay out `data` inside `container` with the engine its layout type selects.
    ///
    /// # Errors
    /// Returns `TesseraError::Layout` if the container is not finite or the
    /// engine fails.
    pub fn build(&mut self, data: &DiagramData, container: Bounds) -> Result<Layout, TesseraError> {
        let finite = [
            container.min_x(),
            container.min_y(),
            container.max_x(),
            container.max_y(),
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(TesseraError::Layout(format!(
                "container {container:?} is not finite"
            )));
        }

        let layout_type = data.layout_type();
        let nodes = data.resolved_nodes();
        debug!(layout_type:?, nodes_count = nodes.len(); "Calculating layout");

        let layout = self.engine(layout_type).calculate(&nodes, container)?;

        trace!(layout:?; "Built layout");
        Ok(layout)
    }
}
