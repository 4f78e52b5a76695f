use std::collections::{HashMap, HashSet};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const DEFAULT_STROKE: &str = "#aaa";

/// Marker drawn for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	/// Regular statements.
	Circle,
	/// The root topic.
	Square,
}

/// Host-side mapping from type tags to colors. The engine only carries tags.
#[derive(Clone, Debug)]
pub struct Palette {
	/// Node type to fill color.
	pub node_fill: HashMap<String, String>,
	/// Edge type to stroke color.
	pub edge_stroke: HashMap<String, String>,
	/// Edge types drawn dashed.
	pub dashed_edges: HashSet<String>,
}

impl Default for Palette {
	fn default() -> Self {
		let node_fill = [
			("agenda", "#2c3e50"),
			("statement", "#1292ee"),
			("starting", "#1292ee"),
		];
		let edge_stroke = [
			("support", "#46bc7a"),
			("attack", "#e64d4d"),
			("undercut", "#ffa500"),
			("starting", DEFAULT_STROKE),
		];
		Self {
			node_fill: node_fill
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			edge_stroke: edge_stroke
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			dashed_edges: HashSet::from(["undercut".to_string()]),
		}
	}
}

impl Palette {
	/// Fill for a node: its type's color, else the group's category color.
	pub fn node_fill(&self, kind: Option<&str>, group: Option<u32>) -> &str {
		kind.and_then(|kind| self.node_fill.get(kind))
			.map(String::as_str)
			.unwrap_or_else(|| COLORS[group.unwrap_or(0) as usize % COLORS.len()])
	}

	/// Stroke for an edge type, grey when unknown.
	pub fn edge_stroke(&self, kind: Option<&str>) -> &str {
		kind.and_then(|kind| self.edge_stroke.get(kind))
			.map(String::as_str)
			.unwrap_or(DEFAULT_STROKE)
	}

	/// Whether edges of this type are dashed.
	pub fn edge_dashed(&self, kind: Option<&str>) -> bool {
		kind.is_some_and(|kind| self.dashed_edges.contains(kind))
	}

	/// Squares for the root, circles otherwise.
	pub fn node_shape(&self, is_root: bool) -> NodeShape {
		if is_root {
			NodeShape::Square
		} else {
			NodeShape::Circle
		}
	}
}
