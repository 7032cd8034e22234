//! Diagram input model.
//!
//! This module contains the schema a caller hands to the engine: a
//! [`DiagramData`] snapshot holding nodes, connections and summary metrics.
//! The types deserialize from the camelCase JSON produced by the document
//! pipeline and tolerate missing optional fields.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramData (this module) + canvas size
//!     ↓ layout
//! Node rectangles (Layout)
//!     ↓ render (theme + interaction state)
//! Scene
//!     ↓ export
//! SVG / PNG
//! ```
//!
//! A snapshot is never mutated by the engine. Label edits are proposed through
//! a callback; [`DiagramData::with_node_label`] is available for callers that
//! want to derive the next snapshot.

use std::{
    collections::HashSet,
    fmt::{self, Display},
    str::FromStr,
};

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// The four supported layout algorithms.
///
/// The names match external configuration and JSON strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// Squarified slice treemap (default)
    #[default]
    Treemap,
    /// Tiered parent/child levels
    Hierarchy,
    /// Signed bars around a shared baseline with a running total
    Waterfall,
    /// Proportional bar comparison
    Comparison,
}

impl LayoutType {
    /// All layout types in declaration order.
    pub const ALL: [LayoutType; 4] = [
        Self::Treemap,
        Self::Hierarchy,
        Self::Waterfall,
        Self::Comparison,
    ];
}

impl FromStr for LayoutType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "treemap" => Ok(Self::Treemap),
            "hierarchy" => Ok(Self::Hierarchy),
            "waterfall" => Ok(Self::Waterfall),
            "comparison" => Ok(Self::Comparison),
            _ => Err("Unsupported layout type"),
        }
    }
}

impl From<LayoutType> for &'static str {
    fn from(val: LayoutType) -> Self {
        match val {
            LayoutType::Treemap => "treemap",
            LayoutType::Hierarchy => "hierarchy",
            LayoutType::Waterfall => "waterfall",
            LayoutType::Comparison => "comparison",
        }
    }
}

impl Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Semantic role of a node, used to pick a palette slot.
///
/// Unrecognized strings deserialize to [`NodeCategory::Unknown`], which
/// resolves its color the same way as a node without a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Revenue,
    Cost,
    Asset,
    Metric,
    Risk,
    Neutral,
    #[serde(other)]
    Unknown,
}

impl NodeCategory {
    /// The six categories that own a palette slot.
    pub const SLOTTED: [NodeCategory; 6] = [
        Self::Revenue,
        Self::Cost,
        Self::Asset,
        Self::Metric,
        Self::Risk,
        Self::Neutral,
    ];

    /// Index of this category's palette slot, `None` for [`NodeCategory::Unknown`].
    pub fn slot(self) -> Option<usize> {
        Self::SLOTTED.iter().position(|category| *category == self)
    }
}

/// Direction of a metric's change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    #[serde(other)]
    Neutral,
}

/// A single diagram node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    label: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_label: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<NodeCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl DiagramNode {
    /// Create a node with an id and a label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Create a node without an id. Such nodes are excluded from layout.
    pub fn anonymous(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_value_label(mut self, value_label: impl Into<String>) -> Self {
        self.value_label = Some(value_label.into());
        self
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_category(mut self, category: NodeCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// The node id, `None` when absent or blank.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn value_label(&self) -> Option<&str> {
        self.value_label.as_deref()
    }

    pub fn percentage(&self) -> Option<f64> {
        self.percentage
    }

    pub fn category(&self) -> Option<NodeCategory> {
        self.category
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// The explicit color override, if any.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Layout weight: `percentage`, else `value`, else zero.
    ///
    /// Negative and non-finite weights count as zero.
    pub fn weight(&self) -> f64 {
        let weight = self.percentage.or(self.value).unwrap_or(0.0);
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConnection {
    #[serde(default, deserialize_with = "null_as_default")]
    from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<f64>,
}

impl DiagramConnection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// A summary figure shown in the metrics strip.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetric {
    #[serde(default, deserialize_with = "null_as_default")]
    label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trend: Option<Trend>,
}

impl DiagramMetric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_change(mut self, change: impl Into<String>, trend: Trend) -> Self {
        self.change = Some(change.into());
        self.trend = Some(trend);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn change(&self) -> Option<&str> {
        self.change.as_deref()
    }

    pub fn trend(&self) -> Trend {
        self.trend.unwrap_or_default()
    }
}

/// An immutable diagram snapshot.
///
/// `nodes` and `connections` are required when deserializing (they may be
/// empty); everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramData {
    layout_type: LayoutType,
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    total_value: Option<f64>,
    nodes: Vec<DiagramNode>,
    connections: Vec<DiagramConnection>,
    #[serde(default, deserialize_with = "null_as_default")]
    metrics: Vec<DiagramMetric>,
}

impl DiagramData {
    /// Create an empty diagram of the given layout type.
    pub fn new(layout_type: LayoutType, title: impl Into<String>) -> Self {
        Self {
            layout_type,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_total_value(mut self, total_value: f64) -> Self {
        self.total_value = Some(total_value);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<DiagramNode>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_connections(mut self, connections: Vec<DiagramConnection>) -> Self {
        self.connections = connections;
        self
    }

    pub fn with_metrics(mut self, metrics: Vec<DiagramMetric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn layout_type(&self) -> LayoutType {
        self.layout_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total_value(&self) -> Option<f64> {
        self.total_value
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[DiagramConnection] {
        &self.connections
    }

    pub fn metrics(&self) -> &[DiagramMetric] {
        &self.metrics
    }

    /// Looks up the first node carrying `node_id`.
    pub fn node(&self, node_id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id() == Some(node_id))
    }

    /// Returns the nodes that can take part in layout and rendering.
    ///
    /// Nodes without an id are skipped. When an id repeats, the first
    /// occurrence wins. Each resolved node carries its position in the
    /// returned sequence.
    pub fn resolved_nodes(&self) -> Vec<ResolvedNode<'_>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.nodes.len());

        for (position, node) in self.nodes.iter().enumerate() {
            let Some(id) = node.id() else {
                warn!(position, label = node.label(); "Skipping node without id");
                continue;
            };
            if !seen.insert(id) {
                warn!(position, id; "Skipping node with duplicate id");
                continue;
            }
            resolved.push(ResolvedNode {
                id,
                index: resolved.len(),
                node,
            });
        }

        resolved
    }

    /// Derive a new snapshot with one node relabeled.
    ///
    /// Returns `None` when no node carries `node_id`. `self` is left untouched.
    pub fn with_node_label(&self, node_id: &str, label: &str) -> Option<Self> {
        let position = self
            .nodes
            .iter()
            .position(|node| node.id() == Some(node_id))?;

        let mut next = self.clone();
        next.nodes[position].label = label.to_string();
        Some(next)
    }
}

/// A node that passed id resolution, with its index among resolved nodes.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedNode<'a> {
    id: &'a str,
    index: usize,
    node: &'a DiagramNode,
}

impl<'a> ResolvedNode<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Position among resolved nodes, used for deterministic color rotation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &'a DiagramNode {
        self.node
    }
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept numbers, numeric strings ("12.5", "1,200", "40%") and null.
///
/// Anything else becomes `None` rather than failing the whole document.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let number = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(number)) => Some(number),
        Some(Raw::Text(text)) => text
            .trim()
            .trim_end_matches('%')
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        Some(Raw::Other(_)) | None => None,
    };

    Ok(number.filter(|number| number.is_finite()))
}
