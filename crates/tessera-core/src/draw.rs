//! Backend-neutral drawing instructions.
//!
//! The renderer produces [`Primitive`]s grouped by [`RenderLayer`]. Export
//! backends (SVG, raster) consume them without knowing anything about
//! layouts, themes or interaction state.

mod layer;
mod primitive;
mod stroke;

pub use layer::{LayeredOutput, RenderLayer};
pub use primitive::{
    FontWeight, LinePrimitive, Primitive, RectPrimitive, TextAnchor, TextPrimitive,
};
pub use stroke::{StrokeDefinition, StrokeStyle};
