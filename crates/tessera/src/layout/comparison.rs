//! Proportional comparison bars.
//!
//! Every bar stands on a common baseline at the bottom of the padded area
//! and its height is `value / max(values) * chart_height`. Negative values
//! clamp to zero. When the maximum is not positive all bars are flat.

use indexmap::IndexMap;

use tessera_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{LayoutType, ResolvedNode},
};

use crate::{
    error::TesseraError,
    layout::{Layout, LayoutDetail, LayoutEngine, bar_slots, bar_value},
};

/// Comparison layout engine.
#[derive(Debug, Clone)]
pub struct Engine {
    bar_width: f32,
    bar_gap: f32,
    height_fraction: f32,
    padding: Insets,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            bar_width: 72.0,
            bar_gap: 32.0,
            height_fraction: 0.8,
            padding: Insets::uniform(24.0),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred bar width; bars shrink when the row does not fit
    pub fn set_bar_width(&mut self, width: f32) -> &mut Self {
        self.bar_width = width.max(0.0);
        self
    }

    pub fn set_bar_gap(&mut self, gap: f32) -> &mut Self {
        self.bar_gap = gap.max(0.0);
        self
    }

    pub fn set_height_fraction(&mut self, fraction: f32) -> &mut Self {
        self.height_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn set_padding(&mut self, padding: Insets) -> &mut Self {
        self.padding = padding;
        self
    }
}

impl LayoutEngine for Engine {
    fn calculate(
        &self,
        nodes: &[ResolvedNode<'_>],
        container: Bounds,
    ) -> Result<Layout, TesseraError> {
        let area = container.shrink(self.padding);
        let baseline = area.max_y();
        let chart_height = f64::from(area.height() * self.height_fraction);

        let values: Vec<f64> = nodes.iter().map(|node| bar_value(node).max(0.0)).collect();
        let max = values.iter().copied().fold(0.0f64, f64::max);

        let slots = bar_slots(nodes.len(), self.bar_width, self.bar_gap, area);
        let rects: IndexMap<String, Bounds> = nodes
            .iter()
            .zip(values)
            .zip(slots)
            .map(|((node, value), (x, width))| {
                let height = if max > 0.0 {
                    (value / max * chart_height) as f32
                } else {
                    0.0
                };
                let rect = Bounds::new_from_top_left(
                    Point::new(x, baseline - height),
                    Size::new(width, height),
                );
                (node.id().to_string(), rect)
            })
            .collect();

        Ok(Layout::new(
            LayoutType::Comparison,
            container,
            rects,
            LayoutDetail::Comparison { baseline },
        ))
    }
}
