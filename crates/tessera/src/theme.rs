//! Palette and theme color resolution.
//!
//! Colors come from immutable [`ThemeTables`] built once per process and
//! handed to a [`ThemeColorResolver`]. A node's style is chosen in this
//! order:
//!
//! 1. An explicit, parseable `color` override on the node.
//! 2. The active palette's slot for the node's category.
//! 3. The palette's rotation sequence, indexed by the node's position.
//! 4. The palette's neutral color when the rotation is empty.
//!
//! The theme mode then derives border and text colors and applies the hover
//! treatment.

use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::{Arc, OnceLock},
};

use log::warn;
use serde::Deserialize;

use tessera_core::{
    color::Color,
    model::{DiagramNode, NodeCategory},
};

/// Built-in palettes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    #[default]
    Default,
    Ocean,
    Sunset,
    Monochrome,
}

impl PaletteName {
    pub const ALL: [PaletteName; 4] = [Self::Default, Self::Ocean, Self::Sunset, Self::Monochrome];

    fn index(self) -> usize {
        match self {
            Self::Default => 0,
            Self::Ocean => 1,
            Self::Sunset => 2,
            Self::Monochrome => 3,
        }
    }
}

impl FromStr for PaletteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "ocean" => Ok(Self::Ocean),
            "sunset" => Ok(Self::Sunset),
            "monochrome" => Ok(Self::Monochrome),
            _ => Err(format!(
                "unknown palette `{s}`, expected one of: default, ocean, sunset, monochrome"
            )),
        }
    }
}

impl From<PaletteName> for &'static str {
    fn from(val: PaletteName) -> Self {
        match val {
            PaletteName::Default => "default",
            PaletteName::Ocean => "ocean",
            PaletteName::Sunset => "sunset",
            PaletteName::Monochrome => "monochrome",
        }
    }
}

impl Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Light or dark rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("unknown theme `{s}`, expected light or dark")),
        }
    }
}

impl Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Resolved colors for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    fill: Color,
    border: Color,
    text: Color,
}

impl NodeStyle {
    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn border(&self) -> Color {
        self.border
    }

    pub fn text(&self) -> Color {
        self.text
    }
}

/// Per-mode surface colors shared by every palette.
#[derive(Debug, Clone)]
pub struct ThemeVariant {
    background: Color,
    foreground: Color,
    muted: Color,
    panel: Color,
    connector: Color,
    highlight: Color,
    accent: Color,
    positive: Color,
    negative: Color,
    dark_text: Color,
    light_text: Color,
}

impl ThemeVariant {
    /// Opaque canvas background.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Primary text drawn directly on the background, such as the title.
    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn muted(&self) -> Color {
        self.muted
    }

    /// Fill of floating surfaces like the tooltip and metric cards.
    pub fn panel(&self) -> Color {
        self.panel
    }

    pub fn connector(&self) -> Color {
        self.connector
    }

    /// Color hovered fills are mixed toward.
    pub fn highlight(&self) -> Color {
        self.highlight
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    /// Color of upward metric changes.
    pub fn positive(&self) -> Color {
        self.positive
    }

    pub fn negative(&self) -> Color {
        self.negative
    }
}

#[derive(Debug, Clone)]
struct Palette {
    slots: [Option<Color>; 6],
    neutral: Color,
    rotation: Vec<Color>,
}

/// Immutable palette and theme tables.
#[derive(Debug)]
pub struct ThemeTables {
    palettes: [Palette; 4],
    light: ThemeVariant,
    dark: ThemeVariant,
}

static BUILTIN: OnceLock<Arc<ThemeTables>> = OnceLock::new();

fn rgb(hex: u32) -> Color {
    Color::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Slot colors in revenue, cost, asset, metric, risk, neutral order.
fn slots(hexes: [u32; 6]) -> [Option<Color>; 6] {
    hexes.map(|hex| Some(rgb(hex)))
}

impl ThemeTables {
    /// The built-in tables, created on first use and shared afterwards.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::create())))
    }

    fn create() -> Self {
        let default = Palette {
            slots: slots([0x3fb68b, 0xf0635c, 0x5cb0ff, 0xf7c843, 0xe11d48, 0x94a3b8]),
            neutral: rgb(0x94a3b8),
            rotation: [0x2563eb, 0x0ea66c, 0xd97706, 0x7c3aed, 0xdb2777, 0x0891b2]
                .map(rgb)
                .to_vec(),
        };
        let ocean = Palette {
            slots: slots([0x0ea5e9, 0x1e3a8a, 0x14b8a6, 0x38bdf8, 0x6366f1, 0x64748b]),
            neutral: rgb(0x64748b),
            rotation: [0x0284c7, 0x0d9488, 0x2563eb, 0x0891b2, 0x4f46e5]
                .map(rgb)
                .to_vec(),
        };

        // Sunset has no neutral slot; monochrome only covers a few categories.
        let mut sunset_slots = slots([0xf59e0b, 0xdc2626, 0xfb923c, 0xf472b6, 0x9f1239, 0]);
        sunset_slots[5] = None;
        let sunset = Palette {
            slots: sunset_slots,
            neutral: rgb(0xa8a29e),
            rotation: [0xf97316, 0xe11d48, 0xfbbf24, 0xc026d3, 0xea580c]
                .map(rgb)
                .to_vec(),
        };
        let monochrome = Palette {
            slots: [
                None,
                None,
                Some(rgb(0x404040)),
                Some(rgb(0x737373)),
                None,
                Some(rgb(0xa3a3a3)),
            ],
            neutral: rgb(0xa3a3a3),
            rotation: [0x262626, 0x525252, 0x737373, 0xa3a3a3].map(rgb).to_vec(),
        };

        let light = ThemeVariant {
            background: rgb(0xf8fbff),
            foreground: rgb(0x0c1625),
            muted: rgb(0x5b6678),
            panel: rgb(0xffffff),
            connector: rgb(0x94a3b8),
            highlight: rgb(0xffffff),
            accent: rgb(0x2563eb),
            positive: rgb(0x0ea66c),
            negative: rgb(0xe11d48),
            dark_text: rgb(0x0c1625),
            light_text: rgb(0xffffff),
        };
        let dark = ThemeVariant {
            background: rgb(0x05090f),
            foreground: rgb(0xe6edf7),
            muted: rgb(0x7f8ba0),
            panel: rgb(0x111a26),
            connector: rgb(0x7f8ba0),
            highlight: rgb(0x7ac6ff),
            accent: rgb(0x5cb0ff),
            positive: rgb(0x3fb68b),
            negative: rgb(0xf0635c),
            dark_text: rgb(0x0c1625),
            light_text: rgb(0xe6edf7),
        };

        Self {
            palettes: [default, ocean, sunset, monochrome],
            light,
            dark,
        }
    }

    pub fn variant(&self, mode: ThemeMode) -> &ThemeVariant {
        match mode {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }

    fn palette(&self, name: PaletteName) -> &Palette {
        &self.palettes[name.index()]
    }

    /// Length of a palette's rotation sequence.
    pub fn rotation_len(&self, name: PaletteName) -> usize {
        self.palette(name).rotation.len()
    }
}

/// Maps node categories to colors for a palette and theme mode.
#[derive(Debug, Clone)]
pub struct ThemeColorResolver {
    tables: Arc<ThemeTables>,
}

impl Default for ThemeColorResolver {
    fn default() -> Self {
        Self::new(ThemeTables::builtin())
    }
}

impl ThemeColorResolver {
    pub fn new(tables: Arc<ThemeTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ThemeTables {
        &self.tables
    }

    pub fn variant(&self, mode: ThemeMode) -> &ThemeVariant {
        self.tables.variant(mode)
    }

    /// Base color for a category before theme and hover adjustments.
    ///
    /// `index` selects the rotation color when the category has no slot.
    pub fn base_color(
        &self,
        palette: PaletteName,
        category: Option<NodeCategory>,
        index: usize,
    ) -> Color {
        let palette = self.tables.palette(palette);
        category
            .and_then(NodeCategory::slot)
            .and_then(|slot| palette.slots[slot])
            .or_else(|| {
                (!palette.rotation.is_empty())
                    .then(|| palette.rotation[index % palette.rotation.len()])
            })
            .unwrap_or(palette.neutral)
    }

    /// Resolves the style of a category at a position.
    pub fn resolve(
        &self,
        palette: PaletteName,
        mode: ThemeMode,
        category: Option<NodeCategory>,
        index: usize,
        hovered: bool,
    ) -> NodeStyle {
        let base = self.base_color(palette, category, index);
        self.style_from_base(base, mode, hovered)
    }

    /// Resolves the style of a node, honoring its color override.
    ///
    /// An override that is not a valid color is ignored with a warning.
    pub fn resolve_node(
        &self,
        palette: PaletteName,
        mode: ThemeMode,
        node: &DiagramNode,
        index: usize,
        hovered: bool,
    ) -> NodeStyle {
        let override_color = node.color().and_then(|color| match Color::new(color) {
            Ok(color) => Some(color),
            Err(err) => {
                warn!(
                    label = node.label(),
                    err = err.as_str();
                    "Ignoring invalid node color override"
                );
                None
            }
        });

        match override_color {
            Some(base) => self.style_from_base(base, mode, hovered),
            None => self.resolve(palette, mode, node.category(), index, hovered),
        }
    }

    fn style_from_base(&self, base: Color, mode: ThemeMode, hovered: bool) -> NodeStyle {
        let variant = self.tables.variant(mode);

        let fill = match mode {
            ThemeMode::Light => base,
            ThemeMode::Dark => base.mix(variant.background, 0.15),
        };
        let (fill, border) = if hovered {
            (fill.mix(variant.highlight, 0.35), variant.accent)
        } else {
            let edge = match mode {
                ThemeMode::Light => Color::from_rgb8(0, 0, 0),
                ThemeMode::Dark => Color::from_rgb8(255, 255, 255),
            };
            (fill, fill.mix(edge, 0.25))
        };
        let text = if fill.luminance() > 0.45 {
            variant.dark_text
        } else {
            variant.light_text
        };

        NodeStyle { fill, border, text }
    }
}
