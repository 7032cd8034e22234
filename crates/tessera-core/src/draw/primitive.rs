//! Drawing primitives.
//!
//! A diagram scene is built from three kinds of primitive: filled
//! rectangles, straight lines and single-line text runs. Coordinates are in
//! whatever space the owning layer uses (world space for diagram content,
//! screen space for overlays).

use crate::{
    color::Color,
    draw::StrokeDefinition,
    geometry::{Bounds, Point},
};

/// Horizontal alignment of a text run relative to its anchor point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    /// Returns the SVG `text-anchor` value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

/// A filled, optionally stroked rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RectPrimitive {
    bounds: Bounds,
    fill: Color,
    stroke: Option<StrokeDefinition>,
    corner_radius: f32,
    node_id: Option<String>,
}

impl RectPrimitive {
    pub fn new(bounds: Bounds, fill: Color) -> Self {
        Self {
            bounds,
            fill,
            stroke: None,
            corner_radius: 0.0,
            node_id: None,
        }
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    /// Tags the rectangle with the node it represents.
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Option<&StrokeDefinition> {
        self.stroke.as_ref()
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitive {
    start: Point,
    end: Point,
    stroke: StrokeDefinition,
}

impl LinePrimitive {
    pub fn new(start: Point, end: Point, stroke: StrokeDefinition) -> Self {
        Self { start, end, stroke }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn stroke(&self) -> &StrokeDefinition {
        &self.stroke
    }
}

/// A single line of text anchored at a baseline point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    position: Point,
    content: String,
    font_size: f32,
    color: Color,
    anchor: TextAnchor,
    weight: FontWeight,
}

impl TextPrimitive {
    pub fn new(position: Point, content: impl Into<String>, font_size: f32, color: Color) -> Self {
        Self {
            position,
            content: content.into(),
            font_size,
            color,
            anchor: TextAnchor::default(),
            weight: FontWeight::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn anchor(&self) -> TextAnchor {
        self.anchor
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }
}

/// Any drawable item in a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect(RectPrimitive),
    Line(LinePrimitive),
    Text(TextPrimitive),
}

impl Primitive {
    /// Returns the node id of a tagged rectangle.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Rect(rect) => rect.node_id(),
            Self::Line(_) | Self::Text(_) => None,
        }
    }
}

impl From<RectPrimitive> for Primitive {
    fn from(rect: RectPrimitive) -> Self {
        Self::Rect(rect)
    }
}

impl From<LinePrimitive> for Primitive {
    fn from(line: LinePrimitive) -> Self {
        Self::Line(line)
    }
}

impl From<TextPrimitive> for Primitive {
    fn from(text: TextPrimitive) -> Self {
        Self::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_rect_primitive_node_id() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let rect = RectPrimitive::new(bounds, Color::default()).with_node_id("a");
        let primitive = Primitive::from(rect);
        assert_eq!(primitive.node_id(), Some("a"));
    }

    #[test]
    fn test_negative_corner_radius_clamped() {
        let bounds = Bounds::default();
        let rect = RectPrimitive::new(bounds, Color::default()).with_corner_radius(-3.0);
        assert_eq!(rect.corner_radius(), 0.0);
    }

    #[test]
    fn test_text_defaults_to_middle_anchor() {
        let text = TextPrimitive::new(Point::default(), "abcd", 10.0, Color::default());
        assert_eq!(text.content(), "abcd");
        assert_eq!(text.anchor(), TextAnchor::Middle);
    }
}
