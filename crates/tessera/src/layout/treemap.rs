//! Slice-and-dice treemap layout.
//!
//! Nodes are sorted by weight (descending, ties by id) and each one slices a
//! strip off the remaining rectangle proportional to its share of the
//! remaining weight. The strip runs along the shorter side: a wide remainder
//! is cut vertically from the left, a tall one horizontally from the top. The
//! last node takes whatever is left, so the slices tile the container
//! exactly. Each slice is then inset by a fixed gap.

use indexmap::IndexMap;
use log::debug;

use tessera_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{LayoutType, ResolvedNode},
};

use crate::{
    error::TesseraError,
    layout::{Layout, LayoutDetail, LayoutEngine},
};

/// Treemap layout engine.
#[derive(Debug, Clone)]
pub struct Engine {
    gap: f32,
}

impl Default for Engine {
    fn default() -> Self {
        Self { gap: 2.0 }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inset applied to every side of each rectangle
    pub fn set_gap(&mut self, gap: f32) -> &mut Self {
        self.gap = gap.max(0.0);
        self
    }
}

impl LayoutEngine for Engine {
    fn calculate(
        &self,
        nodes: &[ResolvedNode<'_>],
        container: Bounds,
    ) -> Result<Layout, TesseraError> {
        let slices = slice(nodes, container);
        debug!(slices_count = slices.len(), gap = self.gap; "Treemap sliced");

        let insets = Insets::uniform(self.gap);
        let rects: IndexMap<String, Bounds> = slices
            .into_iter()
            .map(|(id, bounds)| (id.to_string(), bounds.shrink(insets)))
            .collect();

        Ok(Layout::new(
            LayoutType::Treemap,
            container,
            rects,
            LayoutDetail::Treemap,
        ))
    }
}

/// Compute the un-inset treemap slices for `nodes` inside `container`.
///
/// Nodes with zero weight get no slice. The result is ordered by descending
/// weight and does not depend on the order of `nodes`.
pub fn slice<'a>(nodes: &[ResolvedNode<'a>], container: Bounds) -> Vec<(&'a str, Bounds)> {
    let mut weighted: Vec<(&'a str, f64)> = nodes
        .iter()
        .map(|node| (node.id(), node.node().weight()))
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

    if weighted.is_empty() {
        return Vec::new();
    }

    weighted.sort_by(|(id_a, a), (id_b, b)| b.total_cmp(a).then_with(|| id_a.cmp(id_b)));

    // Normalize by the largest weight so the sum cannot overflow.
    let max_weight = weighted[0].1;
    for (_, weight) in &mut weighted {
        *weight /= max_weight;
    }
    let mut remaining_weight: f64 = weighted.iter().map(|(_, weight)| weight).sum();

    let mut remaining = container;
    let last = weighted.len() - 1;
    let mut slices = Vec::with_capacity(weighted.len());

    for (position, (id, weight)) in weighted.into_iter().enumerate() {
        if position == last {
            slices.push((id, remaining));
            break;
        }

        let ratio = if remaining_weight > 0.0 {
            (weight / remaining_weight).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        let origin = remaining.min_point();
        if remaining.width() > remaining.height() {
            let strip = remaining.width() * ratio;
            slices.push((
                id,
                Bounds::new_from_top_left(origin, Size::new(strip, remaining.height())),
            ));
            remaining = Bounds::new_from_top_left(
                Point::new(origin.x() + strip, origin.y()),
                Size::new(remaining.width() - strip, remaining.height()),
            );
        } else {
            let strip = remaining.height() * ratio;
            slices.push((
                id,
                Bounds::new_from_top_left(origin, Size::new(remaining.width(), strip)),
            ));
            remaining = Bounds::new_from_top_left(
                Point::new(origin.x(), origin.y() + strip),
                Size::new(remaining.width(), remaining.height() - strip),
            );
        }

        remaining_weight -= weight;
    }

    slices
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use tessera_core::model::{DiagramData, DiagramNode};

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn weighted_ids_strategy() -> impl Strategy<Value = Vec<(String, f64)>> {
        proptest::collection::vec(prop_oneof![Just(0.0f64), 0.01f64..1000.0], 1..16).prop_map(
            |weights| {
                weights
                    .into_iter()
                    .enumerate()
                    .map(|(i, weight)| (format!("n{i}"), weight))
                    .collect()
            },
        )
    }

    fn container_strategy() -> impl Strategy<Value = Bounds> {
        (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..2000.0, 1.0f32..2000.0)
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn data(pairs: &[(String, f64)]) -> DiagramData {
        let nodes = pairs
            .iter()
            .map(|(id, weight)| DiagramNode::new(id.as_str(), id.as_str()).with_value(*weight))
            .collect();
        DiagramData::new(LayoutType::Treemap, "t").with_nodes(nodes)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Slices tile the container: their areas sum to the container area.
    fn check_slices_cover_container(
        pairs: Vec<(String, f64)>,
        container: Bounds,
    ) -> Result<(), TestCaseError> {
        let data = data(&pairs);
        let slices = slice(&data.resolved_nodes(), container);
        prop_assume!(!slices.is_empty());

        let total: f32 = slices.iter().map(|(_, bounds)| bounds.area()).sum();
        let tolerance = container.area() * 1e-3;
        prop_assert!(
            approx_eq!(f32, total, container.area(), epsilon = tolerance),
            "slice area {} != container area {}",
            total,
            container.area()
        );

        for (_, bounds) in &slices {
            prop_assert!(bounds.width() >= -1e-3 && bounds.height() >= -1e-3);
            prop_assert!(bounds.min_x() >= container.min_x() - 0.01);
            prop_assert!(bounds.max_x() <= container.max_x() + 0.01);
            prop_assert!(bounds.min_y() >= container.min_y() - 0.01);
            prop_assert!(bounds.max_y() <= container.max_y() + 0.01);
        }
        Ok(())
    }

    /// Inset rectangles lose exactly the gap on every side, clamped at zero.
    fn check_inset_accounts_for_gap(
        pairs: Vec<(String, f64)>,
        container: Bounds,
        gap: f32,
    ) -> Result<(), TestCaseError> {
        let data = data(&pairs);
        let nodes = data.resolved_nodes();
        let slices = slice(&nodes, container);

        let mut engine = Engine::new();
        engine.set_gap(gap);
        let layout = engine
            .calculate(&nodes, container)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(layout.len(), slices.len());
        for (id, outer) in &slices {
            let inner = layout.rect(id).ok_or_else(|| TestCaseError::fail("missing rect"))?;
            let expected_w = (outer.width() - 2.0 * gap).max(0.0);
            let expected_h = (outer.height() - 2.0 * gap).max(0.0);
            prop_assert!(approx_eq!(f32, inner.width(), expected_w, epsilon = 0.01));
            prop_assert!(approx_eq!(f32, inner.height(), expected_h, epsilon = 0.01));
        }
        Ok(())
    }

    /// Input order never changes the result.
    fn check_permutation_stable(
        pairs: Vec<(String, f64)>,
        shuffled: Vec<(String, f64)>,
        container: Bounds,
    ) -> Result<(), TestCaseError> {
        let original = data(&pairs);
        let permuted = data(&shuffled);

        let a: Vec<_> = slice(&original.resolved_nodes(), container);
        let b: Vec<_> = slice(&permuted.resolved_nodes(), container);
        prop_assert_eq!(a, b);
        Ok(())
    }

    proptest! {
        #[test]
        fn slices_cover_container(
            pairs in weighted_ids_strategy(),
            container in container_strategy(),
        ) {
            check_slices_cover_container(pairs, container)?;
        }

        #[test]
        fn inset_accounts_for_gap(
            pairs in weighted_ids_strategy(),
            container in container_strategy(),
            gap in 0.0f32..8.0,
        ) {
            check_inset_accounts_for_gap(pairs, container, gap)?;
        }

        #[test]
        fn permutation_stable(
            (pairs, shuffled) in weighted_ids_strategy()
                .prop_flat_map(|pairs| (Just(pairs.clone()), Just(pairs).prop_shuffle())),
            container in container_strategy(),
        ) {
            check_permutation_stable(pairs, shuffled, container)?;
        }
    }
}
