//! Tiered hierarchy layout.
//!
//! Parent/child references become edges of a directed graph. Levels are
//! assigned breadth-first from the roots, and a node keeps the first level at
//! which it is discovered, so cycles and nodes with several parents are
//! placed exactly once. Nodes that no root reaches (pure cycles) are seeded
//! as additional roots in array order. When no reference resolves at all the
//! nodes are arranged on a square-ish grid instead.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use tessera_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{LayoutType, ResolvedNode},
};

use crate::{
    error::TesseraError,
    layout::{Layout, LayoutDetail, LayoutEngine},
};

/// Hierarchy layout engine.
#[derive(Debug, Clone)]
pub struct Engine {
    node_size: Size,
    spacing: f32,
    padding: Insets,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            node_size: Size::new(140.0, 56.0),
            spacing: 24.0,
            padding: Insets::uniform(24.0),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed size of every node
    pub fn set_node_size(&mut self, size: Size) -> &mut Self {
        self.node_size = size;
        self
    }

    /// Set the horizontal gap between nodes on the same level
    pub fn set_spacing(&mut self, spacing: f32) -> &mut Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Set the margin between the container edge and the nodes
    pub fn set_padding(&mut self, padding: Insets) -> &mut Self {
        self.padding = padding;
        self
    }

    /// Place each level on its own row, centered horizontally.
    ///
    /// Rows divide the available height evenly. Nodes keep their configured
    /// size unless a row would not fit, in which case they shrink to fit.
    fn place_levels(&self, levels: &[Vec<&str>], area: Bounds) -> IndexMap<String, Bounds> {
        let mut rects = IndexMap::new();
        if levels.is_empty() {
            return rects;
        }

        let row_height = area.height() / levels.len() as f32;
        let node_height = self.node_size.height().min(row_height * 0.8).max(0.0);

        for (depth, level) in levels.iter().enumerate() {
            let count = level.len() as f32;
            let fit_width = (area.width() - self.spacing * (count - 1.0)) / count;
            let node_width = self.node_size.width().min(fit_width).max(0.0);
            let row_width = node_width * count + self.spacing * (count - 1.0);

            let center_y = area.min_y() + row_height * (depth as f32 + 0.5);
            let mut x = area.center().x() - row_width / 2.0;

            for id in level {
                let rect = Bounds::new_from_top_left(
                    Point::new(x, center_y - node_height / 2.0),
                    Size::new(node_width, node_height),
                );
                rects.insert(id.to_string(), rect);
                x += node_width + self.spacing;
            }
        }

        rects
    }

    /// Place nodes row-major on a `ceil(sqrt(n))`-column grid.
    fn place_grid(
        &self,
        ids: &[&str],
        area: Bounds,
    ) -> (Vec<Vec<String>>, IndexMap<String, Bounds>) {
        let columns = (ids.len() as f64).sqrt().ceil().max(1.0) as usize;
        let rows = ids.len().div_ceil(columns);

        let cell = Size::new(area.width() / columns as f32, area.height() / rows as f32);
        let node = Size::new(
            self.node_size.width().min(cell.width() - self.spacing).max(0.0),
            self.node_size.height().min(cell.height() * 0.8).max(0.0),
        );

        let mut rects = IndexMap::new();
        let mut levels = vec![Vec::new(); rows];
        for (position, id) in ids.iter().enumerate() {
            let (row, column) = (position / columns, position % columns);
            let center = Point::new(
                area.min_x() + cell.width() * (column as f32 + 0.5),
                area.min_y() + cell.height() * (row as f32 + 0.5),
            );
            rects.insert(id.to_string(), Bounds::new_from_center(center, node));
            levels[row].push(id.to_string());
        }

        (levels, rects)
    }
}

impl LayoutEngine for Engine {
    fn calculate(
        &self,
        nodes: &[ResolvedNode<'_>],
        container: Bounds,
    ) -> Result<Layout, TesseraError> {
        let area = container.shrink(self.padding);
        let graph = build_graph(nodes);
        debug!(
            nodes_count = graph.node_count(),
            edges_count = graph.edge_count();
            "Hierarchy graph built"
        );

        if graph.edge_count() == 0 && nodes.len() > 1 {
            let ids: Vec<&str> = nodes.iter().map(|node| node.id()).collect();
            let (levels, rects) = self.place_grid(&ids, area);
            return Ok(Layout::new(
                LayoutType::Hierarchy,
                container,
                rects,
                LayoutDetail::Hierarchy { levels, grid: true },
            ));
        }

        let levels: Vec<Vec<&str>> = assign_levels(&graph)
            .into_iter()
            .map(|level| level.into_iter().map(|idx| nodes[graph[idx]].id()).collect())
            .collect();
        trace!(levels:?; "Hierarchy levels assigned");

        let rects = self.place_levels(&levels, area);
        let levels = levels
            .into_iter()
            .map(|level| level.into_iter().map(str::to_string).collect())
            .collect();

        Ok(Layout::new(
            LayoutType::Hierarchy,
            container,
            rects,
            LayoutDetail::Hierarchy {
                levels,
                grid: false,
            },
        ))
    }
}

/// Build the parent → child graph. Node weights are positions in `nodes`.
///
/// Unresolvable ids and self references are ignored; a relationship stated
/// both through `parentId` and `children` yields a single edge.
fn build_graph(nodes: &[ResolvedNode<'_>]) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len());
    let mut index_of = HashMap::with_capacity(nodes.len());

    for (position, node) in nodes.iter().enumerate() {
        let idx = graph.add_node(position);
        index_of.insert(node.id(), idx);
    }

    for node in nodes {
        let idx = index_of[node.id()];

        let parent = node.node().parent_id().and_then(|id| index_of.get(id));
        if let Some(&parent) = parent.filter(|&&parent| parent != idx) {
            graph.update_edge(parent, idx, ());
        }

        let children = node
            .node()
            .children()
            .iter()
            .filter_map(|child_id| index_of.get(child_id.as_str()))
            .filter(|&&child| child != idx);
        for &child in children {
            graph.update_edge(idx, child, ());
        }
    }

    graph
}

/// Breadth-first level assignment with first-discovery-wins.
///
/// Roots are nodes without incoming edges, in array order. Any node still
/// unplaced afterwards belongs to a cycle and is seeded as another root.
fn assign_levels(graph: &DiGraph<usize, ()>) -> Vec<Vec<NodeIndex>> {
    let mut levels: Vec<Vec<NodeIndex>> = Vec::new();
    let mut discovered = vec![false; graph.node_count()];

    let roots: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| {
            graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
        .collect();

    let mut seeds = roots.into_iter().chain(graph.node_indices());
    let mut queue = VecDeque::new();

    loop {
        if queue.is_empty() {
            // Next undiscovered seed starts a new traversal at level 0
            let Some(seed) = seeds.find(|idx| !discovered[idx.index()]) else {
                break;
            };
            discovered[seed.index()] = true;
            queue.push_back((seed, 0));
        }

        let Some((idx, depth)) = queue.pop_front() else {
            break;
        };
        if levels.len() <= depth {
            levels.resize_with(depth + 1, Vec::new);
        }
        levels[depth].push(idx);

        // Children in array order
        let mut children: Vec<NodeIndex> = graph
            .neighbors_directed(idx, Direction::Outgoing)
            .filter(|child| !discovered[child.index()])
            .collect();
        children.sort_unstable();
        children.dedup();

        for child in children {
            discovered[child.index()] = true;
            queue.push_back((child, depth + 1));
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use tessera_core::model::{DiagramData, DiagramNode};

    use super::*;

    fn container() -> Bounds {
        Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(800.0, 600.0))
    }

    fn layout(nodes: Vec<DiagramNode>) -> Layout {
        let data = DiagramData::new(LayoutType::Hierarchy, "org").with_nodes(nodes);
        Engine::new()
            .calculate(&data.resolved_nodes(), container())
            .unwrap()
    }

    fn levels(layout: &Layout) -> (Vec<Vec<String>>, bool) {
        match layout.detail() {
            LayoutDetail::Hierarchy { levels, grid } => (levels.clone(), *grid),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_root_with_two_children() {
        let layout = layout(vec![
            DiagramNode::new("root", "Root"),
            DiagramNode::new("a", "A").with_parent("root"),
            DiagramNode::new("b", "B").with_parent("root"),
        ]);

        let (levels, grid) = levels(&layout);
        assert!(!grid);
        assert_eq!(levels, vec![vec!["root"], vec!["a", "b"]]);

        let a = layout.rect("a").unwrap();
        let b = layout.rect("b").unwrap();
        let root = layout.rect("root").unwrap();
        assert!(!a.intersects(b));
        assert!(!a.intersects(root));
        assert!(root.max_y() < a.min_y());
        assert!(a.max_x() < b.min_x());
    }

    #[test]
    fn test_levels_are_centered() {
        let layout = layout(vec![
            DiagramNode::new("root", "Root"),
            DiagramNode::new("a", "A").with_parent("root"),
            DiagramNode::new("b", "B").with_parent("root"),
        ]);

        let root = layout.rect("root").unwrap();
        let a = layout.rect("a").unwrap();
        let b = layout.rect("b").unwrap();
        assert!((root.center().x() - 400.0).abs() < 0.01);
        assert!((a.min_x() + b.max_x() - 800.0).abs() < 0.01);
    }

    #[test]
    fn test_children_lists_create_edges() {
        let layout = layout(vec![
            DiagramNode::new("root", "Root").with_children(["a", "missing"]),
            DiagramNode::new("a", "A").with_children(["b"]),
            DiagramNode::new("b", "B"),
        ]);

        let (levels, _) = levels(&layout);
        assert_eq!(levels, vec![vec!["root"], vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_child_listed_node_is_not_root() {
        let layout = layout(vec![
            DiagramNode::new("b", "B"),
            DiagramNode::new("a", "A").with_children(["b"]),
        ]);

        let (levels, grid) = levels(&layout);
        assert!(!grid);
        assert_eq!(levels, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_pure_cycle_terminates() {
        let layout = layout(vec![
            DiagramNode::new("a", "A").with_parent("b"),
            DiagramNode::new("b", "B").with_parent("a"),
        ]);

        let (levels, grid) = levels(&layout);
        assert!(!grid);
        assert_eq!(levels, vec![vec!["a"], vec!["b"]]);
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_first_discovery_wins() {
        // "shared" is reachable from the root directly and through "mid"
        let layout = layout(vec![
            DiagramNode::new("root", "Root").with_children(["mid", "shared"]),
            DiagramNode::new("mid", "Mid").with_children(["shared"]),
            DiagramNode::new("shared", "Shared").with_parent("mid"),
        ]);

        let (levels, _) = levels(&layout);
        assert_eq!(levels, vec![vec!["root"], vec!["mid", "shared"]]);
    }

    #[test]
    fn test_self_reference_ignored() {
        let layout = layout(vec![DiagramNode::new("solo", "Solo").with_parent("solo")]);
        let (levels, grid) = levels(&layout);
        assert!(!grid);
        assert_eq!(levels, vec![vec!["solo"]]);
    }

    #[test]
    fn test_flat_set_uses_grid() {
        let nodes = (0..5)
            .map(|i| DiagramNode::new(format!("n{i}"), format!("N{i}")))
            .collect();
        let layout = layout(nodes);

        let (levels, grid) = levels(&layout);
        assert!(grid);
        // ceil(sqrt(5)) = 3 columns, two rows
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].len(), 3);
        assert_eq!(levels[1].len(), 2);

        let rects: Vec<Bounds> = layout.rects().values().copied().collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(*b));
            }
        }
    }

    #[test]
    fn test_unresolvable_parent_makes_root() {
        let layout = layout(vec![
            DiagramNode::new("a", "A").with_parent("ghost"),
            DiagramNode::new("b", "B").with_parent("a"),
        ]);
        let (levels, grid) = levels(&layout);
        assert!(!grid);
        assert_eq!(levels, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_wide_level_shrinks_to_fit() {
        let mut nodes = vec![DiagramNode::new("root", "Root")];
        nodes.extend((0..20).map(|i| DiagramNode::new(format!("c{i}"), "C").with_parent("root")));
        let layout = layout(nodes);

        let content = layout.content_bounds().unwrap();
        assert!(content.min_x() >= 24.0 - 0.01);
        assert!(content.max_x() <= 800.0 - 24.0 + 0.01);
    }
}
