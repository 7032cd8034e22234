//! Stroke and line-style definitions.
//!
//! Strokes follow SVG/CSS terminology so export backends can map them
//! directly:
//!
//! | Property | SVG Attribute | Example Values |
//! |----------|---------------|----------------|
//! | `color` | `stroke`, `stroke-opacity` | `"#000000"`, `0.5` |
//! | `width` | `stroke-width` | `2.0` |
//! | `style` | `stroke-dasharray` | `"6,4"` |

use crate::color::Color;

/// Visual pattern of a stroke.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line used for waterfall connectors and the edit outline (6px dash, 4px gap)
    Dashed,
}

impl StrokeStyle {
    /// Returns the dash pattern as lengths, empty for solid lines.
    pub fn dash_array(self) -> &'static [f32] {
        match self {
            Self::Solid => &[],
            Self::Dashed => &[6.0, 4.0],
        }
    }

    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(self) -> Option<String> {
        let dashes = self.dash_array();
        if dashes.is_empty() {
            return None;
        }
        let parts: Vec<String> = dashes.iter().map(|len| len.to_string()).collect();
        Some(parts.join(","))
    }
}

/// A stroke definition for connectors and node borders.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    /// Creates a solid stroke with the given color and width.
    ///
    /// ```
    /// use tessera_core::draw::{StrokeDefinition, StrokeStyle};
    /// use tessera_core::color::Color;
    ///
    /// let stroke = StrokeDefinition::new(Color::new("black").unwrap(), 2.0);
    /// assert_eq!(stroke.style(), StrokeStyle::Solid);
    /// ```
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    /// Creates a dashed stroke.
    pub fn dashed(color: Color, width: f32) -> Self {
        Self {
            style: StrokeStyle::Dashed,
            ..Self::new(color, width)
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::new(Color::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color().to_hex(), "#000000");
        assert_eq!(stroke.style(), StrokeStyle::Solid);
    }

    #[test]
    fn test_stroke_dashed() {
        let stroke = StrokeDefinition::dashed(Color::from_rgb8(0, 0, 255), 1.5);
        assert_eq!(stroke.style(), StrokeStyle::Dashed);
        assert_eq!(stroke.width(), 1.5);
    }

    #[test]
    fn test_stroke_style_dasharray() {
        assert_eq!(StrokeStyle::Solid.to_svg_value(), None);
        assert_eq!(StrokeStyle::Dashed.to_svg_value(), Some("6,4".to_string()));
        assert_eq!(StrokeStyle::Dashed.dash_array(), &[6.0, 4.0]);
    }
}
