//! Color handling for Tessera diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate, providing convenience methods for working with colors
//! in palettes, SVG output and raster compositing.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_hex().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str.trim()) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Creates an opaque color from 8-bit sRGB channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Creates a color from 8-bit sRGB channels with alpha.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let rgba = color::AlphaColor::<Srgb>::from_rgba8(r, g, b, a);
        Self {
            color: DynamicColor::from_alpha_color(rgba),
        }
    }

    /// Returns the color as 8-bit sRGB channels `[r, g, b, a]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }

    /// Returns the `#rrggbb` form of this color, ignoring alpha.
    ///
    /// ```
    /// use tessera_core::color::Color;
    ///
    /// assert_eq!(Color::new("red").unwrap().to_hex(), "#ff0000");
    /// ```
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Creates a new color with the specified alpha (transparency) value.
    ///
    /// # Arguments
    ///
    /// * `alpha` - The alpha value to set, typically between 0.0 (fully transparent)
    ///   and 1.0 (fully opaque)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha (transparency) component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Linearly mixes this color toward `other` in 8-bit sRGB space.
    ///
    /// `amount` is clamped to `[0, 1]`; `0.0` returns `self`, `1.0` returns `other`.
    /// The result is opaque.
    pub fn mix(self, other: Color, amount: f32) -> Self {
        let t = amount.clamp(0.0, 1.0);
        let [r1, g1, b1, _] = self.to_rgba8();
        let [r2, g2, b2, _] = other.to_rgba8();
        let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self::from_rgb8(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2))
    }

    /// Relative luminance in `[0, 1]` using the sRGB coefficients.
    pub fn luminance(self) -> f32 {
        let [r, g, b, _] = self.to_rgba8();
        let channel = |c: u8| {
            let c = f32::from(c) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb8(0, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        let red = Color::new("#ff0000");
        assert!(red.is_ok());

        let invalid = Color::new("not-a-color");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_color_default() {
        let color = Color::default();
        assert_eq!(color.to_hex(), "#000000");
    }

    #[test]
    fn test_color_with_alpha() {
        let color = Color::new("red").unwrap();
        let transparent = color.with_alpha(0.5);
        assert!((transparent.alpha() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_color_rgba8_roundtrip() {
        let color = Color::from_rgb8(16, 32, 255);
        assert_eq!(color.to_rgba8(), [16, 32, 255, 255]);
        assert_eq!(color.to_hex(), "#1020ff");
    }

    #[test]
    fn test_color_mix_endpoints() {
        let black = Color::from_rgb8(0, 0, 0);
        let white = Color::from_rgb8(255, 255, 255);

        assert_eq!(black.mix(white, 0.0), black);
        assert_eq!(black.mix(white, 1.0).to_hex(), "#ffffff");
        assert_eq!(black.mix(white, 0.5).to_hex(), "#808080");
        assert_eq!(black.mix(white, 7.0).to_hex(), "#ffffff");
    }

    #[test]
    fn test_color_luminance_ordering() {
        let dark = Color::new("#101820").unwrap();
        let light = Color::new("#f5f7fa").unwrap();
        assert!(dark.luminance() < light.luminance());
    }

    #[test]
    fn test_color_eq_hash() {
        use std::collections::HashSet;

        let color1 = Color::new("#ff0000").unwrap();
        let color2 = Color::new("#ff0000").unwrap();
        let color3 = Color::new("blue").unwrap();

        let mut set = HashSet::new();
        set.insert(color1);
        assert!(set.contains(&color2));
        assert!(!set.contains(&color3));
    }
}
