//! Tessera - layout, interaction and export for dashboard diagrams.
//!
//! A [`DiagramView`] owns one diagram snapshot together with its viewport and
//! interaction state. It lays the diagram out for the current canvas size,
//! feeds pointer and keyboard input through the interaction state machine,
//! and produces [`Scene`]s that can be written as SVG or rasterized to PNG.

pub mod config;
pub mod export;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod theme;
pub mod viewport;

mod error;

pub use tessera_core::{color, draw, geometry, model};

pub use error::TesseraError;
pub use export::raster::{ExportHandle, ExportTier, ExportedImage};
pub use interaction::{InputEvent, InteractionController, Key, Outcome};
pub use layout::Layout;
pub use render::Scene;
pub use viewport::Viewport;

use std::path::Path;

use log::{debug, info, trace};

use tessera_core::{
    geometry::{Bounds, Point, Size},
    model::DiagramData,
};

use config::AppConfig;
use export::raster::ExportService;
use layout::EngineBuilder;
use render::Renderer;

/// Callback receiving `(node_id, new_label)` when a label edit is committed.
pub type LabelChangeHandler = Box<dyn FnMut(&str, &str)>;

/// Padding kept around the content by [`DiagramView::fit_to_content`].
const FIT_PADDING: f32 = 16.0;

/// Parses a diagram from JSON.
///
/// # Errors
///
/// Returns [`TesseraError::Input`] carrying the source text when the JSON is
/// malformed or does not match the diagram schema.
///
/// # Examples
///
/// ```
/// let data = tessera::parse_diagram(
///     r#"{"layoutType": "treemap", "nodes": [], "connections": []}"#,
/// ).unwrap();
/// assert!(data.nodes().is_empty());
/// ```
pub fn parse_diagram(source: &str) -> Result<DiagramData, TesseraError> {
    let data: DiagramData = serde_json::from_str(source)
        .map_err(|err| TesseraError::new_input_error(err, source))?;
    debug!(
        layout_type:? = data.layout_type(),
        nodes_count = data.nodes().len(),
        connections_count = data.connections().len();
        "Diagram parsed"
    );
    Ok(data)
}

struct CachedLayout {
    canvas: Size,
    layout: Layout,
}

/// An interactive view of one diagram snapshot.
///
/// The view never mutates its [`DiagramData`]. Committed label edits are
/// reported through the label change handler; the caller decides whether to
/// derive a new snapshot and pass it to [`DiagramView::replace_data`].
///
/// # Examples
///
/// ```
/// use tessera::{DiagramView, config::AppConfig, geometry::Size};
///
/// let data = tessera::parse_diagram(
///     r#"{"layoutType": "comparison", "title": "Q3", "nodes": [
///         {"id": "a", "label": "A", "value": 10},
///         {"id": "b", "label": "B", "value": 20}
///     ], "connections": []}"#,
/// ).unwrap();
///
/// let mut view = DiagramView::new(data, AppConfig::default(), Size::new(800.0, 600.0)).unwrap();
/// let svg = view.render_svg().unwrap();
/// assert!(svg.contains("data-node-id=\"b\""));
/// ```
pub struct DiagramView {
    data: DiagramData,
    config: AppConfig,
    engines: EngineBuilder,
    viewport: Viewport,
    interaction: InteractionController,
    renderer: Renderer,
    exporter: ExportService,
    cached_layout: Option<CachedLayout>,
    on_label_change: Option<LabelChangeHandler>,
}

impl DiagramView {
    /// Create a view of `data` on a canvas of `canvas` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Config`] if `config` fails validation.
    pub fn new(data: DiagramData, config: AppConfig, canvas: Size) -> Result<Self, TesseraError> {
        config.validate()?;
        info!(
            layout_type:? = data.layout_type(),
            width = canvas.width(),
            height = canvas.height();
            "Creating diagram view"
        );

        Ok(Self {
            engines: EngineBuilder::from_config(config.layout()),
            viewport: Viewport::new(config.viewport(), canvas),
            exporter: ExportService::new(config.export().clone()),
            interaction: InteractionController::new(),
            renderer: Renderer::default(),
            cached_layout: None,
            on_label_change: None,
            data,
            config,
        })
    }

    pub fn data(&self) -> &DiagramData {
        &self.data
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport access for zoom buttons and programmatic navigation.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Registers the handler called once per committed label edit.
    pub fn set_on_label_change<F>(&mut self, handler: F)
    where
        F: FnMut(&str, &str) + 'static,
    {
        self.on_label_change = Some(Box::new(handler));
    }

    /// Swaps in a new snapshot.
    ///
    /// Interaction state is reset; the viewport is kept.
    pub fn replace_data(&mut self, data: DiagramData) {
        info!(layout_type:? = data.layout_type(); "Replacing diagram data");
        self.data = data;
        self.interaction.reset();
        self.cached_layout = None;
    }

    /// Applies a new configuration.
    ///
    /// The viewport is rebuilt from the new limits and returns to identity.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Config`] and keeps the current configuration
    /// if `config` fails validation.
    pub fn set_config(&mut self, config: AppConfig) -> Result<(), TesseraError> {
        config.validate()?;
        let canvas = self.viewport.canvas_size();
        self.engines = EngineBuilder::from_config(config.layout());
        self.viewport = Viewport::new(config.viewport(), canvas);
        self.exporter = ExportService::new(config.export().clone());
        self.cached_layout = None;
        self.config = config;
        debug!("Configuration applied");
        Ok(())
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        trace!(width = canvas.width(), height = canvas.height(); "Canvas resized");
        self.viewport.set_canvas_size(canvas);
    }

    /// World-space area available to the layout: the canvas below the header.
    pub fn layout_container(&self) -> Bounds {
        let canvas = self.viewport.canvas_size();
        let header = self.config.style().header_height().max(0.0).min(canvas.height());
        Bounds::new_from_top_left(
            Point::new(0.0, header),
            Size::new(canvas.width(), canvas.height() - header),
        )
    }

    /// Returns the layout for the current canvas size, recomputing it only
    /// when the size, data or configuration changed.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Layout`] if the canvas size is not finite.
    pub fn layout(&mut self) -> Result<&Layout, TesseraError> {
        let canvas = self.viewport.canvas_size();
        let cached = match self.cached_layout.take() {
            Some(cached) if cached.canvas == canvas => cached,
            _ => {
                let container = self.layout_container();
                let layout = self.engines.build(&self.data, container)?;
                debug!(nodes_count = layout.len(); "Layout recomputed");
                CachedLayout { canvas, layout }
            }
        };
        Ok(&self.cached_layout.insert(cached).layout)
    }

    /// Feeds one input event through the interaction state machine.
    ///
    /// A committed edit invokes the label change handler before the outcomes
    /// are returned.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Layout`] if the diagram cannot be laid out for
    /// hit-testing; interaction state is left untouched in that case.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<Vec<Outcome>, TesseraError> {
        self.layout()?;
        let Some(cached) = &self.cached_layout else {
            return Ok(Vec::new());
        };

        let outcomes =
            self.interaction
                .handle_event(event, &cached.layout, &self.data, &mut self.viewport);

        for outcome in &outcomes {
            if let Outcome::LabelCommitted { node_id, text } = outcome {
                info!(node_id = node_id.as_str(); "Label change committed");
                if let Some(handler) = self.on_label_change.as_mut() {
                    handler(node_id, text);
                }
            }
        }
        Ok(outcomes)
    }

    /// Zooms and pans so the whole diagram is visible.
    ///
    /// Returns `false` when there is nothing to fit.
    pub fn fit_to_content(&mut self) -> Result<bool, TesseraError> {
        let Some(bounds) = self.layout()?.content_bounds() else {
            return Ok(false);
        };
        Ok(self.viewport.zoom_to_fit(bounds, FIT_PADDING))
    }

    /// Renders the current view.
    pub fn render_scene(&mut self) -> Result<Scene, TesseraError> {
        self.layout()?;
        let Some(cached) = &self.cached_layout else {
            return Err(TesseraError::Layout("layout unavailable".to_string()));
        };
        Ok(self.renderer.render(
            &self.data,
            &cached.layout,
            &self.viewport,
            &self.interaction,
            self.config.style(),
        ))
    }

    /// Renders the current view as an SVG document.
    pub fn render_svg(&mut self) -> Result<String, TesseraError> {
        let scene = self.render_scene()?;
        Ok(export::svg::to_svg_string(&scene))
    }

    /// Starts a PNG export of the current view into `directory`.
    ///
    /// The scene is captured immediately; the returned handle reports the
    /// written file or a recoverable export error. View state is not touched
    /// by the export.
    pub fn export(
        &mut self,
        tier: ExportTier,
        directory: &Path,
    ) -> Result<ExportHandle, TesseraError> {
        let scene = self.render_scene()?;
        Ok(self
            .exporter
            .export(&scene, self.data.title(), tier, directory))
    }
}
