//! Scene construction.
//!
//! The [`Renderer`] turns a layout plus the current view state into a
//! [`Scene`], a toolkit-neutral list of drawing primitives. A scene has two
//! parts:
//!
//! - `world`: node rectangles, labels, connectors and annotations in layout
//!   coordinates, drawn under the scene's [`ViewTransform`].
//! - `overlay`: the title band, metrics strip and tooltip in screen
//!   coordinates, drawn on top without transformation.
//!
//! Rendering is pure: the same inputs always produce an equal scene.

use log::{debug, trace, warn};

use tessera_core::{
    color::Color,
    draw::{
        FontWeight, LayeredOutput, LinePrimitive, Primitive, RectPrimitive, RenderLayer,
        StrokeDefinition, TextAnchor, TextPrimitive,
    },
    geometry::{Bounds, Point, Size},
    model::{DiagramData, DiagramNode, LayoutType, Trend},
};

use crate::{
    config::StyleConfig,
    interaction::InteractionController,
    layout::{Layout, LayoutDetail},
    theme::{ThemeColorResolver, ThemeVariant},
    viewport::Viewport,
};

const LABEL_FONT_SIZE: f32 = 13.0;
const VALUE_FONT_SIZE: f32 = 11.0;
const TITLE_FONT_SIZE: f32 = 18.0;
const TOOLTIP_FONT_SIZE: f32 = 12.0;
const TOOLTIP_OFFSET: f32 = 12.0;
const METRICS_MIN_X: f32 = 200.0;
const CARD_GAP: f32 = 8.0;

/// World-to-screen transform applied to the world layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Point,
}

impl ViewTransform {
    pub fn new(zoom: f32, pan: Point) -> Self {
        Self { zoom, pan }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_identity(&self) -> bool {
        self.zoom == 1.0 && self.pan.is_zero()
    }
}

impl From<&Viewport> for ViewTransform {
    fn from(viewport: &Viewport) -> Self {
        Self::new(viewport.zoom(), viewport.pan())
    }
}

/// A fully resolved frame, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    size: Size,
    background: Color,
    transform: ViewTransform,
    world: LayeredOutput,
    overlay: LayeredOutput,
}

impl Scene {
    /// Canvas size in screen pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Opaque canvas background.
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn world(&self) -> &LayeredOutput {
        &self.world
    }

    pub fn overlay(&self) -> &LayeredOutput {
        &self.overlay
    }

    /// Iterates over every text primitive's content, world first.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.world
            .iter()
            .chain(self.overlay.iter())
            .filter_map(|(_, primitive)| match primitive {
                Primitive::Text(text) => Some(text.content()),
                _ => None,
            })
    }
}

/// Builds scenes from layouts and view state.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    resolver: ThemeColorResolver,
}

impl Renderer {
    pub fn new(resolver: ThemeColorResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ThemeColorResolver {
        &self.resolver
    }

    /// Resolves the canvas background for a style.
    ///
    /// A configured background wins over the theme's; an unparsable one is
    /// ignored with a warning.
    pub fn background(&self, style: &StyleConfig) -> Color {
        match style.background_color() {
            Ok(Some(color)) => color.with_alpha(1.0),
            Ok(None) => self.resolver.variant(style.theme()).background(),
            Err(err) => {
                warn!(err = err.as_str(); "Ignoring invalid background color");
                self.resolver.variant(style.theme()).background()
            }
        }
    }

    /// Renders one frame.
    pub fn render(
        &self,
        data: &DiagramData,
        layout: &Layout,
        viewport: &Viewport,
        interaction: &InteractionController,
        style: &StyleConfig,
    ) -> Scene {
        let variant = self.resolver.variant(style.theme());
        let size = viewport.canvas_size();
        let background = self.background(style);

        let mut world = LayeredOutput::new();
        self.render_nodes(&mut world, data, layout, interaction, style);
        render_connections(&mut world, data, layout, variant);
        if let LayoutDetail::Waterfall { steps, baseline } = layout.detail() {
            render_waterfall_annotations(&mut world, layout, steps, *baseline, variant);
        }

        let mut overlay = LayeredOutput::new();
        render_header(&mut overlay, data, size, background, style, variant);

        // The edited node shows pending text instead of a tooltip
        let editing = interaction.editing().map(|(node_id, _)| node_id);
        let tooltip = interaction
            .hovered_node()
            .filter(|node_id| Some(*node_id) != editing)
            .and_then(|node_id| data.node(node_id))
            .zip(interaction.tooltip_anchor());
        if let Some((node, anchor)) = tooltip {
            render_tooltip(&mut overlay, node, anchor, size, variant);
        }

        debug!(
            layout_type:? = layout.layout_type(),
            world_count = world.len(),
            overlay_count = overlay.len();
            "Scene rendered"
        );

        Scene {
            size,
            background,
            transform: ViewTransform::from(viewport),
            world,
            overlay,
        }
    }

    fn render_nodes(
        &self,
        output: &mut LayeredOutput,
        data: &DiagramData,
        layout: &Layout,
        interaction: &InteractionController,
        style: &StyleConfig,
    ) {
        let variant = self.resolver.variant(style.theme());
        let hovered = interaction.hovered_node();
        let editing = interaction.editing();
        let is_bar_layout = matches!(
            layout.layout_type(),
            LayoutType::Waterfall | LayoutType::Comparison
        );

        for resolved in data.resolved_nodes() {
            let Some(rect) = layout.rect(resolved.id()) else {
                continue;
            };
            let node = resolved.node();
            let is_hovered = hovered == Some(resolved.id());
            let node_style = self.resolver.resolve_node(
                style.palette(),
                style.theme(),
                node,
                resolved.index(),
                is_hovered,
            );

            let stroke_width = if is_hovered { 2.0 } else { 1.0 };
            let corner_radius = if is_bar_layout { 2.0 } else { 4.0 };
            output.add_to_layer(
                RenderLayer::Node,
                RectPrimitive::new(rect, node_style.fill())
                    .with_stroke(StrokeDefinition::new(node_style.border(), stroke_width))
                    .with_corner_radius(corner_radius)
                    .with_node_id(resolved.id())
                    .into(),
            );

            let pending = editing
                .filter(|(node_id, _)| *node_id == resolved.id())
                .map(|(_, text)| text);
            if pending.is_some() {
                output.add_to_layer(
                    RenderLayer::Overlay,
                    RectPrimitive::new(rect, Color::default().with_alpha(0.0))
                        .with_stroke(StrokeDefinition::dashed(variant.accent(), 2.0))
                        .with_corner_radius(corner_radius)
                        .into(),
                );
            }

            if is_bar_layout {
                let hangs = crate::layout::bar_value(&resolved) < 0.0;
                render_bar_text(output, node, rect, layout, pending, hangs, variant);
            } else {
                render_box_text(output, node, rect, pending, node_style.text());
            }
        }
    }
}

/// Label and value centered inside a node box.
///
/// Text that cannot fit is truncated; boxes too small for any text get
/// none, unless the node is being edited.
fn render_box_text(
    output: &mut LayeredOutput,
    node: &DiagramNode,
    rect: Bounds,
    pending: Option<&str>,
    color: Color,
) {
    let center = rect.center();
    let value = format_node_value(node);
    let fits_value = value.is_some() && rect.height() >= 36.0;
    let label_y = if fits_value { center.y() - 2.0 } else { center.y() + 4.0 };

    match pending {
        Some(text) => {
            output.add_to_layer(
                RenderLayer::Text,
                TextPrimitive::new(Point::new(center.x(), label_y), text, LABEL_FONT_SIZE, color)
                    .with_weight(FontWeight::Bold)
                    .into(),
            );
        }
        None => {
            if rect.width() < 24.0 || rect.height() < 16.0 {
                return;
            }
            if let Some(label) = fit_text(node.label(), rect.width() - 8.0, LABEL_FONT_SIZE) {
                output.add_to_layer(
                    RenderLayer::Text,
                    TextPrimitive::new(
                        Point::new(center.x(), label_y),
                        label,
                        LABEL_FONT_SIZE,
                        color,
                    )
                    .with_weight(FontWeight::Bold)
                    .into(),
                );
            }
        }
    }

    if let Some(value) = value.filter(|_| fits_value) {
        if let Some(value) = fit_text(&value, rect.width() - 8.0, VALUE_FONT_SIZE) {
            output.add_to_layer(
                RenderLayer::Text,
                TextPrimitive::new(
                    Point::new(center.x(), center.y() + 14.0),
                    value,
                    VALUE_FONT_SIZE,
                    color,
                )
                .into(),
            );
        }
    }
}

/// Value above (or below, for negative bars) the bar and the label along
/// the bottom of the layout container.
fn render_bar_text(
    output: &mut LayeredOutput,
    node: &DiagramNode,
    rect: Bounds,
    layout: &Layout,
    pending: Option<&str>,
    hangs: bool,
    variant: &ThemeVariant,
) {
    let x = rect.center().x();
    let label = pending.map(str::to_string).or_else(|| {
        fit_text(node.label(), rect.width() + 16.0, VALUE_FONT_SIZE)
    });
    if let Some(label) = label {
        output.add_to_layer(
            RenderLayer::Text,
            TextPrimitive::new(
                Point::new(x, layout.container().max_y() - 8.0),
                label,
                VALUE_FONT_SIZE,
                variant.foreground(),
            )
            .into(),
        );
    }

    if let Some(value) = format_node_value(node) {
        let y = if hangs { rect.max_y() + 14.0 } else { rect.min_y() - 6.0 };
        output.add_to_layer(
            RenderLayer::Text,
            TextPrimitive::new(Point::new(x, y), value, VALUE_FONT_SIZE, variant.muted())
                .with_weight(FontWeight::Bold)
                .into(),
        );
    }
}

/// Lines between connected nodes.
///
/// Connections whose endpoints have no rectangle are skipped.
fn render_connections(
    output: &mut LayeredOutput,
    data: &DiagramData,
    layout: &Layout,
    variant: &ThemeVariant,
) {
    for connection in data.connections() {
        let (Some(from), Some(to)) = (layout.rect(connection.from()), layout.rect(connection.to()))
        else {
            trace!(
                from = connection.from(),
                to = connection.to();
                "Omitting unresolved connection"
            );
            continue;
        };

        let (start, end) = connection_endpoints(layout.layout_type(), from, to);
        output.add_to_layer(
            RenderLayer::Connector,
            LinePrimitive::new(start, end, StrokeDefinition::new(variant.connector(), 1.5)).into(),
        );

        if let Some(label) = connection.label() {
            output.add_to_layer(
                RenderLayer::Annotation,
                TextPrimitive::new(
                    start.midpoint(end).add_point(Point::new(0.0, -4.0)),
                    label,
                    VALUE_FONT_SIZE,
                    variant.muted(),
                )
                .into(),
            );
        }
    }
}

fn connection_endpoints(layout_type: LayoutType, from: Bounds, to: Bounds) -> (Point, Point) {
    match layout_type {
        // Tiers run top to bottom; connect facing edges
        LayoutType::Hierarchy if from.max_y() <= to.min_y() => (
            Point::new(from.center().x(), from.max_y()),
            Point::new(to.center().x(), to.min_y()),
        ),
        LayoutType::Hierarchy if to.max_y() <= from.min_y() => (
            Point::new(from.center().x(), from.min_y()),
            Point::new(to.center().x(), to.max_y()),
        ),
        _ => (from.center(), to.center()),
    }
}

/// Baseline, dashed step connectors and running totals for a waterfall.
fn render_waterfall_annotations(
    output: &mut LayeredOutput,
    layout: &Layout,
    steps: &[crate::layout::WaterfallStep],
    baseline: f32,
    variant: &ThemeVariant,
) {
    let bars: Vec<(Bounds, &crate::layout::WaterfallStep)> = steps
        .iter()
        .filter_map(|step| layout.rect(step.node_id()).map(|rect| (rect, step)))
        .collect();
    let (Some((first, _)), Some((last, _))) = (bars.first(), bars.last()) else {
        return;
    };

    output.add_to_layer(
        RenderLayer::Connector,
        LinePrimitive::new(
            Point::new(first.min_x() - 8.0, baseline),
            Point::new(last.max_x() + 8.0, baseline),
            StrokeDefinition::new(variant.muted(), 1.0),
        )
        .into(),
    );

    for pair in bars.windows(2) {
        let (rect, step) = pair[0];
        let (next, _) = pair[1];
        let y = if step.value() < 0.0 { rect.max_y() } else { rect.min_y() };
        output.add_to_layer(
            RenderLayer::Connector,
            LinePrimitive::new(
                Point::new(rect.max_x(), y),
                Point::new(next.min_x(), y),
                StrokeDefinition::dashed(variant.connector(), 1.0),
            )
            .into(),
        );
    }

    for (rect, step) in &bars {
        let y = if step.value() < 0.0 {
            baseline - 8.0
        } else {
            rect.min_y() - 22.0
        };
        output.add_to_layer(
            RenderLayer::Annotation,
            TextPrimitive::new(
                Point::new(rect.center().x(), y),
                format!("= {}", format_number(step.running_total())),
                VALUE_FONT_SIZE,
                variant.muted(),
            )
            .into(),
        );
    }
}

/// Title band with the optional total and the metrics strip.
fn render_header(
    output: &mut LayeredOutput,
    data: &DiagramData,
    size: Size,
    background: Color,
    style: &StyleConfig,
    variant: &ThemeVariant,
) {
    let height = style.header_height().min(size.height()).max(0.0);
    if height <= 0.0 {
        return;
    }

    output.add_to_layer(
        RenderLayer::Background,
        RectPrimitive::new(
            Bounds::new_from_top_left(Point::default(), Size::new(size.width(), height)),
            background,
        )
        .into(),
    );
    output.add_to_layer(
        RenderLayer::Text,
        TextPrimitive::new(
            Point::new(16.0, 28.0),
            data.title(),
            TITLE_FONT_SIZE,
            variant.foreground(),
        )
        .with_anchor(TextAnchor::Start)
        .with_weight(FontWeight::Bold)
        .into(),
    );
    if let Some(total) = data.total_value() {
        output.add_to_layer(
            RenderLayer::Text,
            TextPrimitive::new(
                Point::new(16.0, 48.0),
                format!("Total {}", format_number(total)),
                VALUE_FONT_SIZE,
                variant.muted(),
            )
            .with_anchor(TextAnchor::Start)
            .into(),
        );
    }

    // Keep the leading metrics that fit between the title and the right edge
    let cards: Vec<_> = data
        .metrics()
        .iter()
        .map(|metric| {
            let change = metric.change().map(|change| {
                let arrow = match metric.trend() {
                    Trend::Up => "▲ ",
                    Trend::Down => "▼ ",
                    Trend::Neutral => "",
                };
                format!("{arrow}{change}")
            });
            let value_width = estimate_width(metric.value(), LABEL_FONT_SIZE)
                + change
                    .as_deref()
                    .map_or(0.0, |change| 8.0 + estimate_width(change, VALUE_FONT_SIZE));
            let width = estimate_width(metric.label(), VALUE_FONT_SIZE).max(value_width) + 24.0;
            (metric, change, width)
        })
        .collect();

    let available = size.width() - 16.0 - METRICS_MIN_X;
    let mut used = 0.0;
    let mut shown = 0;
    for (_, _, width) in &cards {
        let needed = if shown == 0 { *width } else { used + CARD_GAP + width };
        if needed > available {
            break;
        }
        used = needed;
        shown += 1;
    }
    if shown < cards.len() {
        debug!(
            shown,
            dropped = cards.len() - shown,
            canvas_width = size.width();
            "Metrics strip too narrow, dropping trailing metrics"
        );
    }

    let mut left = size.width() - 16.0 - used;
    for (metric, change, card_width) in cards.into_iter().take(shown) {
        let card = Bounds::new_from_top_left(
            Point::new(left, 12.0),
            Size::new(card_width, (height - 24.0).max(24.0)),
        );
        output.add_to_layer(
            RenderLayer::Background,
            RectPrimitive::new(card, variant.panel())
                .with_stroke(StrokeDefinition::new(variant.connector(), 1.0))
                .with_corner_radius(6.0)
                .into(),
        );
        output.add_to_layer(
            RenderLayer::Text,
            TextPrimitive::new(
                Point::new(left + 12.0, card.min_y() + 16.0),
                metric.label(),
                VALUE_FONT_SIZE,
                variant.muted(),
            )
            .with_anchor(TextAnchor::Start)
            .into(),
        );
        let value_position = Point::new(left + 12.0, card.min_y() + 34.0);
        output.add_to_layer(
            RenderLayer::Text,
            TextPrimitive::new(
                value_position,
                metric.value(),
                LABEL_FONT_SIZE,
                variant.foreground(),
            )
            .with_anchor(TextAnchor::Start)
            .with_weight(FontWeight::Bold)
            .into(),
        );
        if let Some(change) = change {
            let color = match metric.trend() {
                Trend::Up => variant.positive(),
                Trend::Down => variant.negative(),
                Trend::Neutral => variant.muted(),
            };
            output.add_to_layer(
                RenderLayer::Text,
                TextPrimitive::new(
                    value_position.add_point(Point::new(
                        estimate_width(metric.value(), LABEL_FONT_SIZE) + 8.0,
                        0.0,
                    )),
                    change,
                    VALUE_FONT_SIZE,
                    color,
                )
                .with_anchor(TextAnchor::Start)
                .into(),
            );
        }

        left += card_width + CARD_GAP;
    }
}

/// Tooltip box next to the pointer, kept inside the canvas.
fn render_tooltip(
    output: &mut LayeredOutput,
    node: &DiagramNode,
    anchor: Point,
    canvas: Size,
    variant: &ThemeVariant,
) {
    let mut lines = vec![node.label().to_string()];
    if let Some(value) = node
        .value_label()
        .map(str::to_string)
        .or_else(|| node.value().map(format_number))
    {
        lines.push(value);
    }
    if let Some(percentage) = node.percentage() {
        lines.push(format!("{}%", format_number(percentage)));
    }

    let line_height = TOOLTIP_FONT_SIZE + 4.0;
    let width = lines
        .iter()
        .map(|line| estimate_width(line, TOOLTIP_FONT_SIZE))
        .fold(0.0f32, f32::max)
        + 16.0;
    let height = line_height * lines.len() as f32 + 8.0;

    let mut x = anchor.x() + TOOLTIP_OFFSET;
    let mut y = anchor.y() + TOOLTIP_OFFSET;
    if x + width > canvas.width() {
        x = (anchor.x() - TOOLTIP_OFFSET - width).max(0.0);
    }
    if y + height > canvas.height() {
        y = (anchor.y() - TOOLTIP_OFFSET - height).max(0.0);
    }

    let bounds = Bounds::new_from_top_left(Point::new(x, y), Size::new(width, height));
    output.add_to_layer(
        RenderLayer::Overlay,
        RectPrimitive::new(bounds, variant.panel())
            .with_stroke(StrokeDefinition::new(variant.connector(), 1.0))
            .with_corner_radius(4.0)
            .into(),
    );
    for (i, line) in lines.into_iter().enumerate() {
        let weight = if i == 0 { FontWeight::Bold } else { FontWeight::Normal };
        output.add_to_layer(
            RenderLayer::Overlay,
            TextPrimitive::new(
                Point::new(x + 8.0, y + 4.0 + line_height * (i as f32 + 1.0) - 4.0),
                line,
                TOOLTIP_FONT_SIZE,
                variant.foreground(),
            )
            .with_anchor(TextAnchor::Start)
            .with_weight(weight)
            .into(),
        );
    }
}

/// Display string for a node's magnitude: the preformatted label, else the
/// value, else the percentage.
fn format_node_value(node: &DiagramNode) -> Option<String> {
    node.value_label()
        .map(str::to_string)
        .or_else(|| node.value().map(format_number))
        .or_else(|| {
            node.percentage()
                .map(|percentage| format!("{}%", format_number(percentage)))
        })
}

/// Integers without decimals, anything else with at most two.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.2}");
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.6
}

/// Truncates `text` with an ellipsis to fit `max_width`, `None` if not even
/// one character fits.
fn fit_text(text: &str, max_width: f32, font_size: f32) -> Option<String> {
    let max_chars = (max_width / (font_size * 0.6)).floor();
    if max_chars < 1.0 || text.is_empty() {
        return None;
    }
    let max_chars = max_chars as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return Some(text.to_string());
    }
    if max_chars < 2 {
        return None;
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    Some(truncated)
}

#[cfg(test)]
mod tests {
    use tessera_core::model::{DiagramConnection, DiagramMetric, NodeCategory};

    use super::*;
    use crate::{
        config::ViewportConfig,
        interaction::InputEvent,
        layout::EngineBuilder,
    };

    struct Frame {
        data: DiagramData,
        layout: Layout,
        viewport: Viewport,
        interaction: InteractionController,
        style: StyleConfig,
    }

    impl Frame {
        fn new(data: DiagramData) -> Self {
            let container =
                Bounds::new_from_top_left(Point::new(0.0, 72.0), Size::new(800.0, 528.0));
            let layout = EngineBuilder::default().build(&data, container).unwrap();
            Self {
                data,
                layout,
                viewport: Viewport::new(&ViewportConfig::default(), Size::new(800.0, 600.0)),
                interaction: InteractionController::new(),
                style: StyleConfig::default(),
            }
        }

        fn send(&mut self, event: InputEvent) {
            self.interaction
                .handle_event(event, &self.layout, &self.data, &mut self.viewport);
        }

        fn render(&self) -> Scene {
            Renderer::default().render(
                &self.data,
                &self.layout,
                &self.viewport,
                &self.interaction,
                &self.style,
            )
        }
    }

    fn treemap() -> DiagramData {
        DiagramData::new(LayoutType::Treemap, "Portfolio")
            .with_nodes(vec![
                DiagramNode::new("eq", "Equities")
                    .with_value(600.0)
                    .with_category(NodeCategory::Asset),
                DiagramNode::new("bd", "Bonds").with_value(300.0),
                DiagramNode::new("cash", "Cash").with_value_label("$100").with_value(100.0),
            ])
            .with_metrics(vec![
                DiagramMetric::new("Return", "7.2%").with_change("+1.1%", Trend::Up),
            ])
    }

    fn node_rects(scene: &Scene) -> Vec<(String, Color)> {
        scene
            .world()
            .iter()
            .filter_map(|(_, primitive)| match primitive {
                Primitive::Rect(rect) => rect
                    .node_id()
                    .map(|node_id| (node_id.to_string(), rect.fill())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scene_contains_nodes_title_and_metrics() {
        let scene = Frame::new(treemap()).render();

        let ids: Vec<String> = node_rects(&scene).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["eq", "bd", "cash"]);

        let texts: Vec<&str> = scene.texts().collect();
        assert!(texts.contains(&"Portfolio"));
        assert!(texts.contains(&"Equities"));
        assert!(texts.contains(&"$100"));
        assert!(texts.contains(&"7.2%"));
        assert!(texts.contains(&"▲ +1.1%"));
        assert!(scene.transform().is_identity());
    }

    #[test]
    fn test_background_is_opaque_theme_color() {
        let frame = Frame::new(treemap());
        let scene = frame.render();
        assert_eq!(scene.background().alpha(), 1.0);
        assert_eq!(scene.background().to_hex(), "#f8fbff");
    }

    #[test]
    fn test_unresolved_connection_matches_omission() {
        let with_dangling = treemap().with_connections(vec![
            DiagramConnection::new("eq", "bd"),
            DiagramConnection::new("eq", "ghost"),
        ]);
        let without = treemap().with_connections(vec![DiagramConnection::new("eq", "bd")]);

        assert_eq!(Frame::new(with_dangling).render(), Frame::new(without).render());
    }

    #[test]
    fn test_node_without_id_is_not_drawn() {
        let mut nodes = treemap().nodes().to_vec();
        nodes.insert(1, DiagramNode::anonymous("Ghost").with_value(500.0));
        let with_anonymous = treemap().with_nodes(nodes);

        let scene = Frame::new(with_anonymous).render();

        let ids: Vec<String> = node_rects(&scene).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["eq", "bd", "cash"]);
        assert!(!scene.texts().any(|text| text == "Ghost"));
        assert_eq!(scene, Frame::new(treemap()).render());
    }

    #[test]
    fn test_narrow_metrics_strip_keeps_leading_metrics() {
        let metrics = (1..=6)
            .map(|n| DiagramMetric::new(format!("Metric {n}"), "1234567890"))
            .collect();
        let scene = Frame::new(treemap().with_metrics(metrics)).render();

        let texts: Vec<&str> = scene.texts().collect();
        for n in 1..=5 {
            assert!(texts.contains(&format!("Metric {n}").as_str()));
        }
        assert!(!texts.contains(&"Metric 6"));

        let first = scene
            .overlay()
            .iter()
            .find_map(|(_, primitive)| match primitive {
                Primitive::Text(text) if text.content() == "Metric 1" => Some(text.position()),
                _ => None,
            })
            .unwrap();
        assert!(first.x() >= METRICS_MIN_X);
    }

    #[test]
    fn test_negative_percentage_bar_value_hangs_below() {
        let data = DiagramData::new(LayoutType::Waterfall, "Bridge").with_nodes(vec![
            DiagramNode::new("start", "Start").with_value(100.0),
            DiagramNode::new("churn", "Churn").with_percentage(-20.0),
        ]);
        let frame = Frame::new(data);
        let scene = frame.render();

        let rect = frame.layout.rect("churn").unwrap();
        let value = scene
            .world()
            .iter()
            .find_map(|(_, primitive)| match primitive {
                Primitive::Text(text) if text.content() == "-20%" => Some(text.position()),
                _ => None,
            })
            .unwrap();
        assert!(value.y() > rect.max_y());
    }

    #[test]
    fn test_hover_changes_fill_and_shows_tooltip() {
        let mut frame = Frame::new(treemap());
        let idle = frame.render();

        let center = frame.layout.rect("bd").unwrap().center();
        frame.send(InputEvent::PointerMove(center));
        let hovered = frame.render();

        let fill = |scene: &Scene| {
            node_rects(scene)
                .into_iter()
                .find(|(id, _)| id == "bd")
                .map(|(_, fill)| fill)
        };
        assert_ne!(fill(&idle), fill(&hovered));
        assert!(hovered.overlay().len() > idle.overlay().len());
        assert!(hovered.overlay().iter().any(|(layer, _)| layer == RenderLayer::Overlay));
    }

    #[test]
    fn test_editing_node_shows_pending_text() {
        let mut frame = Frame::new(treemap());
        let center = frame.layout.rect("eq").unwrap().center();
        frame.send(InputEvent::PointerDown(center));
        frame.send(InputEvent::PointerUp(center));
        frame.send(InputEvent::Text(" Global".to_string()));

        let scene = frame.render();
        let texts: Vec<&str> = scene.texts().collect();
        assert!(texts.contains(&"Equities Global"));
        assert!(!texts.contains(&"Equities"));
    }

    #[test]
    fn test_waterfall_has_dashed_connectors_and_totals() {
        let data = DiagramData::new(LayoutType::Waterfall, "Bridge").with_nodes(vec![
            DiagramNode::new("start", "Start").with_value(100.0),
            DiagramNode::new("loss", "Loss").with_value(-30.0),
            DiagramNode::new("gain", "Gain").with_value(50.0),
        ]);
        let scene = Frame::new(data).render();

        let dashed = scene
            .world()
            .iter()
            .filter(|(_, primitive)| match primitive {
                Primitive::Line(line) => line.stroke().style().to_svg_value().is_some(),
                _ => false,
            })
            .count();
        assert_eq!(dashed, 2);

        let texts: Vec<&str> = scene.texts().collect();
        assert!(texts.contains(&"= 100"));
        assert!(texts.contains(&"= 70"));
        assert!(texts.contains(&"= 120"));
    }

    #[test]
    fn test_viewport_transform_is_carried() {
        let mut frame = Frame::new(treemap());
        frame.viewport.pan_by(Point::new(10.0, 0.0));
        let scene = frame.render();
        assert_eq!(scene.transform().pan(), Point::new(10.0, 0.0));
        assert!(!scene.transform().is_identity());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1200.0), "1200");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-0.126), "-0.13");
        assert_eq!(format_number(3.10), "3.1");
    }

    #[test]
    fn test_fit_text_truncates() {
        assert_eq!(fit_text("Revenue", 100.0, 10.0), Some("Revenue".to_string()));
        assert_eq!(fit_text("Revenue", 30.0, 10.0), Some("Reve…".to_string()));
        assert_eq!(fit_text("Revenue", 5.0, 10.0), None);
    }
}
