//! Layout engines for positioning diagram nodes.
//!
//! This module turns a [`DiagramData`] snapshot and a container rectangle
//! into one rectangle per resolved node. Each layout type has its own
//! engine; all of them are pure and deterministic.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramData + container bounds
//!     ↓ layout (this module)
//! Layout (node id → Bounds, plus per-algorithm detail)
//!     ↓ render
//! Scene
//! ```
//!
//! # Submodules
//!
//! - [`treemap`] - Slice-and-dice treemap weighted by percentage or value
//! - [`hierarchy`] - Breadth-first tiers from parent/child references
//! - [`waterfall`] - Signed bars around a shared baseline with running totals
//! - [`comparison`] - Proportional, bottom-aligned bars
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Builder for creating and configuring layout engines
//! - [`LayoutEngine`] - Trait implemented by every engine
//!
//! [`DiagramData`]: tessera_core::model::DiagramData

pub mod comparison;
mod engines;
pub mod hierarchy;
pub mod treemap;
pub mod waterfall;

pub use engines::{EngineBuilder, LayoutEngine};

use indexmap::IndexMap;

use tessera_core::{
    geometry::{Bounds, Point},
    model::{LayoutType, ResolvedNode},
};

/// One step of a waterfall: the bar's signed value and the running totals
/// around it.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallStep {
    node_id: String,
    value: f64,
    previous_total: f64,
    running_total: f64,
}

impl WaterfallStep {
    pub(crate) fn new(node_id: &str, value: f64, previous_total: f64) -> Self {
        Self {
            node_id: node_id.to_string(),
            value,
            previous_total,
            running_total: previous_total + value,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Cumulative total before this step; zero for the first step.
    pub fn previous_total(&self) -> f64 {
        self.previous_total
    }

    /// Cumulative total including this step.
    pub fn running_total(&self) -> f64 {
        self.running_total
    }
}

/// Algorithm-specific information carried alongside the rectangles.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutDetail {
    Treemap,
    Hierarchy {
        /// Node ids per level, top level first.
        levels: Vec<Vec<String>>,
        /// `true` when no parent/child edge resolved and a grid was used.
        grid: bool,
    },
    Waterfall {
        /// Y coordinate of the shared baseline.
        baseline: f32,
        steps: Vec<WaterfallStep>,
    },
    Comparison {
        /// Y coordinate the bars stand on.
        baseline: f32,
    },
}

/// The result of running a layout engine.
///
/// Rectangles are kept in drawing order; later rectangles are on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    layout_type: LayoutType,
    container: Bounds,
    rects: IndexMap<String, Bounds>,
    detail: LayoutDetail,
}

impl Layout {
    pub fn new(
        layout_type: LayoutType,
        container: Bounds,
        rects: IndexMap<String, Bounds>,
        detail: LayoutDetail,
    ) -> Self {
        Self {
            layout_type,
            container,
            rects,
            detail,
        }
    }

    /// An empty layout of the given type.
    pub fn empty(layout_type: LayoutType, container: Bounds) -> Self {
        let detail = match layout_type {
            LayoutType::Treemap => LayoutDetail::Treemap,
            LayoutType::Hierarchy => LayoutDetail::Hierarchy {
                levels: Vec::new(),
                grid: false,
            },
            LayoutType::Waterfall => LayoutDetail::Waterfall {
                baseline: container.center().y(),
                steps: Vec::new(),
            },
            LayoutType::Comparison => LayoutDetail::Comparison {
                baseline: container.max_y(),
            },
        };
        Self::new(layout_type, container, IndexMap::new(), detail)
    }

    pub fn layout_type(&self) -> LayoutType {
        self.layout_type
    }

    /// The rectangle the layout was computed for.
    pub fn container(&self) -> Bounds {
        self.container
    }

    pub fn rects(&self) -> &IndexMap<String, Bounds> {
        &self.rects
    }

    pub fn rect(&self, node_id: &str) -> Option<Bounds> {
        self.rects.get(node_id).copied()
    }

    pub fn detail(&self) -> &LayoutDetail {
        &self.detail
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Smallest rectangle covering every node, `None` for an empty layout.
    pub fn content_bounds(&self) -> Option<Bounds> {
        let mut rects = self.rects.values();
        let first = *rects.next()?;
        Some(rects.fold(first, |acc, rect| acc.merge(rect)))
    }

    /// Returns the topmost node whose rectangle contains `point`.
    ///
    /// `point` is in world coordinates.
    pub fn hit_test(&self, point: Point) -> Option<&str> {
        self.rects
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(point))
            .map(|(id, _)| id.as_str())
    }
}

/// Horizontal slots for a centered row of `count` equally sized bars.
///
/// Returns `(x, width)` per bar. When the row does not fit inside `area`
/// the bar width and gap shrink by the same factor.
pub(crate) fn bar_slots(count: usize, bar_width: f32, gap: f32, area: Bounds) -> Vec<(f32, f32)> {
    if count == 0 {
        return Vec::new();
    }

    let n = count as f32;
    let natural = bar_width * n + gap * (n - 1.0);
    let factor = if natural > area.width() && natural > 0.0 {
        area.width() / natural
    } else {
        1.0
    };
    let (bar_width, gap) = (bar_width * factor, gap * factor);
    let row_width = bar_width * n + gap * (n - 1.0);

    let start = area.center().x() - row_width / 2.0;
    (0..count)
        .map(|i| (start + (bar_width + gap) * i as f32, bar_width))
        .collect()
}

/// Numeric value of a node for bar layouts: `value`, else `percentage`, else zero.
pub(crate) fn bar_value(node: &ResolvedNode<'_>) -> f64 {
    node.node()
        .value()
        .or(node.node().percentage())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
