//! SVG output for scenes.
//!
//! World primitives go into a group carrying the view transform; overlay
//! primitives follow untransformed. Each [`RenderLayer`] becomes its own
//! `<g>` so layers stack bottom to top.

use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::{
    Document,
    node::element::{Group, Line, Rectangle, Text},
};

use tessera_core::draw::{
    LayeredOutput, LinePrimitive, Primitive, RectPrimitive, RenderLayer, TextPrimitive,
};

use crate::{export, render::Scene};

const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width());

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

/// SVG file exporter.
pub struct Svg {
    file_name: String,
}

impl Svg {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Writes an SVG document to the exporter's file.
    pub fn write_document(&self, doc: Document) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let f = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl export::Exporter for Svg {
    fn export_scene(&self, scene: &Scene) -> Result<(), export::Error> {
        let doc = render_document(scene);
        debug!("SVG document rendered");

        self.write_document(doc)
    }
}

/// Builds the SVG document for a scene.
pub fn render_document(scene: &Scene) -> Document {
    let size = scene.size();
    let background = scene.background();

    let doc = Document::new()
        .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
        .set("width", size.width())
        .set("height", size.height())
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", size.width())
                .set("height", size.height())
                .set("fill", background.to_string()),
        );

    let transform = scene.transform();
    let mut world = Group::new().set("class", "world");
    if !transform.is_identity() {
        world = world.set(
            "transform",
            format!(
                "translate({} {}) scale({})",
                transform.pan().x(),
                transform.pan().y(),
                transform.zoom()
            ),
        );
    }
    world = add_layers(world, scene.world());

    let overlay = add_layers(Group::new().set("class", "overlay"), scene.overlay());

    doc.add(world).add(overlay)
}

/// Renders a scene straight to an SVG string.
pub fn to_svg_string(scene: &Scene) -> String {
    render_document(scene).to_string()
}

fn add_layers(mut group: Group, output: &LayeredOutput) -> Group {
    for (layer, primitives) in output.clone().into_layers() {
        let mut layer_group = Group::new().set("class", format!("layer-{}", layer.name()));
        for primitive in &primitives {
            layer_group = match primitive {
                Primitive::Rect(rect) => layer_group.add(render_rect(rect)),
                Primitive::Line(line) => layer_group.add(render_line(line)),
                Primitive::Text(text) => layer_group.add(render_text(text, layer)),
            };
        }
        group = group.add(layer_group);
    }
    group
}

fn render_rect(rect: &RectPrimitive) -> Rectangle {
    let bounds = rect.bounds();
    let fill = rect.fill();
    let mut element = Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", bounds.height());

    element = if fill.alpha() <= 0.0 {
        element.set("fill", "none")
    } else if fill.alpha() < 1.0 {
        element
            .set("fill", fill.to_string())
            .set("fill-opacity", fill.alpha())
    } else {
        element.set("fill", fill.to_string())
    };

    if rect.corner_radius() > 0.0 {
        element = element.set("rx", rect.corner_radius());
    }
    if let Some(node_id) = rect.node_id() {
        element = element.set("data-node-id", node_id);
    }
    if let Some(stroke) = rect.stroke() {
        element = apply_stroke!(element, stroke);
    }
    element
}

fn render_line(line: &LinePrimitive) -> Line {
    let element = Line::new()
        .set("x1", line.start().x())
        .set("y1", line.start().y())
        .set("x2", line.end().x())
        .set("y2", line.end().y());
    apply_stroke!(element, line.stroke())
}

fn render_text(text: &TextPrimitive, layer: RenderLayer) -> Text {
    let position = text.position();
    let mut element = Text::new(text.content())
        .set("x", position.x())
        .set("y", position.y())
        .set("text-anchor", text.anchor().to_svg_value())
        .set("font-family", FONT_FAMILY)
        .set("font-size", text.font_size())
        .set("fill", text.color().to_string());
    if text.weight().to_svg_value() != "normal" {
        element = element.set("font-weight", text.weight().to_svg_value());
    }
    if layer == RenderLayer::Overlay {
        element = element.set("pointer-events", "none");
    }
    element
}

#[cfg(test)]
mod tests {
    use tessera_core::{
        geometry::{Bounds, Point, Size},
        model::{DiagramConnection, DiagramData, DiagramNode, LayoutType},
    };

    use super::*;
    use crate::{
        config::{StyleConfig, ViewportConfig},
        export::Exporter,
        interaction::InteractionController,
        layout::EngineBuilder,
        render::Renderer,
        viewport::Viewport,
    };

    fn scene(viewport: &Viewport) -> Scene {
        let data = DiagramData::new(LayoutType::Hierarchy, "Org <Chart> & Co")
            .with_nodes(vec![
                DiagramNode::new("ceo", "CEO"),
                DiagramNode::new("cto", "CTO").with_parent("ceo"),
            ])
            .with_connections(vec![DiagramConnection::new("ceo", "cto").with_label("reports")]);
        let container = Bounds::new_from_top_left(Point::new(0.0, 72.0), Size::new(640.0, 408.0));
        let layout = EngineBuilder::default().build(&data, container).unwrap();
        Renderer::default().render(
            &data,
            &layout,
            viewport,
            &InteractionController::new(),
            &StyleConfig::default(),
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(&ViewportConfig::default(), Size::new(640.0, 480.0))
    }

    #[test]
    fn test_document_has_size_background_and_nodes() {
        let svg = to_svg_string(&scene(&viewport()));

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 640 480""#));
        assert!(svg.contains(r##"fill="#f8fbff""##));
        assert!(svg.contains(r#"data-node-id="ceo""#));
        assert!(svg.contains(r#"data-node-id="cto""#));
        assert!(svg.contains("layer-node"));
        assert!(svg.contains("reports"));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = to_svg_string(&scene(&viewport()));
        assert!(svg.contains("Org &lt;Chart&gt; &amp; Co"));
    }

    #[test]
    fn test_world_group_carries_view_transform() {
        let identity = to_svg_string(&scene(&viewport()));
        assert!(!identity.contains("transform="));

        let mut viewport = viewport();
        viewport.pan_by(Point::new(15.0, -5.0));
        let panned = to_svg_string(&scene(&viewport));
        assert!(panned.contains(r#"transform="translate(15 -5) scale(1)""#));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let exporter = Svg::new(&path.to_string_lossy());

        exporter.export_scene(&scene(&viewport())).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("data-node-id"));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.svg");
        let exporter = Svg::new(&path.to_string_lossy());

        let result = exporter.export_scene(&scene(&viewport()));
        assert!(matches!(result, Err(export::Error::Io(_))));
    }
}
