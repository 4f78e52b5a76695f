use serde::{Deserialize, Serialize};

use super::labels::LabelOffsetStrategy;

/// A statement or topic in the input dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier referenced by links.
	pub id: String,
	/// Display text; falls back to `id`.
	#[serde(default)]
	pub label: Option<String>,
	/// Type tag, e.g. `agenda` or `statement`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Color group used when the type has no fill.
	#[serde(default)]
	pub group: Option<u32>,
}

impl GraphNode {
	/// Text shown next to the node: its label, or the id when unlabelled.
	pub fn text(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.id)
	}
}

/// A directed relation between two nodes, by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Id of the node the relation starts at.
	pub source: String,
	/// Id of the node the relation points to.
	pub target: String,
	/// Relation tag, e.g. `support`, `attack` or `undercut`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
}

/// A complete dataset as handed to the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes, in render order.
	pub nodes: Vec<GraphNode>,
	/// Links between nodes.
	pub links: Vec<GraphLink>,
}

/// Viewport and label settings handed to the engine at build time.
#[derive(Clone, Debug)]
pub struct LayoutParams {
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Node diameter in pixels.
	pub node_size: f64,
	/// Wrap label text after this many characters per line.
	pub text_wrap: Option<usize>,
	/// How labels are offset from their node.
	pub label_offset: LabelOffsetStrategy,
	/// Node type pinned to the canvas center, if such a node exists.
	pub root_kind: Option<String>,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
			node_size: 10.0,
			text_wrap: None,
			label_offset: LabelOffsetStrategy::BoundingBox,
			root_kind: Some("agenda".into()),
		}
	}
}
