//! Waterfall layout.
//!
//! Bars stand side by side in array order. Non-negative values rise from a
//! shared baseline and negative values hang below it; heights are scaled so
//! the largest magnitude fills a fixed fraction of the available height. The
//! baseline sits where the occupied vertical extent is centered. Running
//! totals are reported per step for connector annotations.

use indexmap::IndexMap;
use log::debug;

use tessera_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{LayoutType, ResolvedNode},
};

use crate::{
    error::TesseraError,
    layout::{Layout, LayoutDetail, LayoutEngine, WaterfallStep, bar_slots, bar_value},
};

/// Waterfall layout engine.
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
            bar_width: 56.0,
            bar_gap: 24.0,
            height_fraction: 0.7,
            padding: Insets::uniform(24.0),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bar_width(&mut self, width: f32) -> &mut Self {
        self.bar_width = width.max(0.0);
        self
    }

    pub fn set_bar_gap(&mut self, gap: f32) -> &mut Self {
        self.bar_gap = gap.max(0.0);
        self
    }

    /// Set the share of the available height used by the largest bar
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
        let values: Vec<f64> = nodes.iter().map(bar_value).collect();

        let max_abs = values.iter().fold(0.0f64, |acc, value| acc.max(value.abs()));
        let scale = if max_abs > 0.0 {
            f64::from(area.height() * self.height_fraction) / max_abs
        } else {
            0.0
        };
        debug!(bars_count = values.len(), max_abs, scale; "Waterfall scale computed");

        let heights: Vec<f32> = values
            .iter()
            .map(|value| (value.abs() * scale) as f32)
            .collect();
        let rise = values
            .iter()
            .zip(&heights)
            .filter(|(value, _)| **value >= 0.0)
            .fold(0.0f32, |acc, (_, height)| acc.max(*height));
        let drop = values
            .iter()
            .zip(&heights)
            .filter(|(value, _)| **value < 0.0)
            .fold(0.0f32, |acc, (_, height)| acc.max(*height));

        // Center the occupied extent [baseline - rise, baseline + drop]
        let baseline = area.center().y() - (rise + drop) / 2.0 + rise;

        let slots = bar_slots(nodes.len(), self.bar_width, self.bar_gap, area);
        let mut rects = IndexMap::with_capacity(nodes.len());
        let mut steps = Vec::with_capacity(nodes.len());
        let mut total = 0.0;

        for ((node, value), ((x, width), height)) in
            nodes.iter().zip(&values).zip(slots.into_iter().zip(heights))
        {
            let top = if *value >= 0.0 { baseline - height } else { baseline };
            rects.insert(
                node.id().to_string(),
                Bounds::new_from_top_left(Point::new(x, top), Size::new(width, height)),
            );

            let step = WaterfallStep::new(node.id(), *value, total);
            total = step.running_total();
            steps.push(step);
        }

        Ok(Layout::new(
            LayoutType::Waterfall,
            container,
            rects,
            LayoutDetail::Waterfall { baseline, steps },
        ))
    }
}
