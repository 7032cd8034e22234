//! Layer-based z-ordering for drawing primitives.
//!
//! Renderers push primitives tagged with a [`RenderLayer`] in whatever order
//! is convenient; [`LayeredOutput::into_layers`] returns them grouped bottom
//! to top.
//!
//! # Example
//!
//! ```
//! # use tessera_core::draw::{LayeredOutput, RenderLayer, TextPrimitive};
//! # use tessera_core::{color::Color, geometry::Point};
//! let mut output = LayeredOutput::new();
//! let label = TextPrimitive::new(Point::new(10.0, 10.0), "Revenue", 12.0, Color::default());
//! output.add_to_layer(RenderLayer::Text, label.into());
//!
//! let layers = output.into_layers();
//! assert_eq!(layers.len(), 1);
//! ```

use crate::draw::Primitive;

/// Rendering layers.
///
/// Layers are rendered from bottom to top in declaration order; the derived
/// `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Canvas fill and backdrop shapes - renders first
    Background,
    /// Connection lines between nodes
    Connector,
    /// Node rectangles
    Node,
    /// Running totals and connection labels
    Annotation,
    /// Node labels and values
    Text,
    /// Edit caret, hover outline and other transient decorations
    Overlay,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Connector => "connector",
            Self::Node => "node",
            Self::Annotation => "annotation",
            Self::Text => "text",
            Self::Overlay => "overlay",
        }
    }
}

/// Primitives collected by layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, Primitive)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primitive to the specified layer.
    ///
    /// Primitives within a layer keep the order in which they were added.
    pub fn add_to_layer(&mut self, layer: RenderLayer, primitive: Primitive) {
        self.items.push((layer, primitive));
    }

    /// Appends every primitive from `other`.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterates over primitives in insertion order with their layer.
    pub fn iter(&self) -> impl Iterator<Item = (RenderLayer, &Primitive)> {
        self.items.iter().map(|(layer, primitive)| (*layer, primitive))
    }

    /// Groups primitives by layer, bottom to top, consuming the output.
    ///
    /// Empty layers are skipped.
    pub fn into_layers(mut self) -> Vec<(RenderLayer, Vec<Primitive>)> {
        // Stable: keeps insertion order within a layer
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result: Vec<(RenderLayer, Vec<Primitive>)> = Vec::new();
        for (layer, primitive) in self.items {
            match result.last_mut() {
                Some((current, group)) if *current == layer => group.push(primitive),
                _ => result.push((layer, vec![primitive])),
            }
        }
        result
    }
}
