use super::adjacency::Adjacency;

/// Opacity of elements outside the focused neighborhood.
pub const DIMMED_OPACITY: f64 = 0.1;

/// Per-element opacity and label visibility driven by hover focus.
///
/// Recomputed from scratch on every focus or unfocus, so the result only
/// depends on the adjacency index and the focused node.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
	/// Node under focus, if any.
	pub focused: Option<usize>,
	/// One entry per node.
	pub node_opacity: Vec<f64>,
	/// One entry per label carrier; anchors are never drawn regardless.
	pub label_visible: Vec<bool>,
	/// One entry per edge.
	pub edge_opacity: Vec<f64>,
}

impl Highlight {
	/// Everything fully visible.
	pub fn new(node_count: usize, edge_count: usize) -> Self {
		Self {
			focused: None,
			node_opacity: vec![1.0; node_count],
			label_visible: vec![true; node_count * 2],
			edge_opacity: vec![1.0; edge_count],
		}
	}

	/// Keeps `index` and its neighbors opaque and dims the rest.
	pub fn focus(&mut self, index: usize, adjacency: &Adjacency, edges: &[(usize, usize)]) {
		self.focused = Some(index);
		for (other, opacity) in self.node_opacity.iter_mut().enumerate() {
			*opacity = if adjacency.neighbor(index, other) {
				1.0
			} else {
				DIMMED_OPACITY
			};
		}
		for (carrier, visible) in self.label_visible.iter_mut().enumerate() {
			*visible = adjacency.neighbor(index, carrier / 2);
		}
		for (opacity, &(source, target)) in self.edge_opacity.iter_mut().zip(edges) {
			*opacity = if source == index || target == index {
				1.0
			} else {
				DIMMED_OPACITY
			};
		}
	}

	/// Restores full visibility.
	pub fn unfocus(&mut self) {
		self.focused = None;
		self.node_opacity.fill(1.0);
		self.label_visible.fill(true);
		self.edge_opacity.fill(1.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn focus_dims_non_neighbors_and_unfocus_restores() {
		let edges = [(0, 1), (1, 2)];
		let adjacency = Adjacency::build(edges);
		let mut highlight = Highlight::new(3, edges.len());

		highlight.focus(0, &adjacency, &edges);
		assert_eq!(highlight.node_opacity, vec![1.0, 1.0, DIMMED_OPACITY]);
		assert_eq!(
			highlight.label_visible,
			vec![true, true, true, true, false, false]
		);
		assert_eq!(highlight.edge_opacity, vec![1.0, DIMMED_OPACITY]);

		highlight.unfocus();
		assert_eq!(highlight, Highlight::new(3, edges.len()));
	}

	#[test]
	fn repeated_focus_is_idempotent() {
		let edges = [(0, 1), (1, 2)];
		let adjacency = Adjacency::build(edges);
		let mut once = Highlight::new(3, 2);
		once.focus(2, &adjacency, &edges);
		let mut twice = once.clone();
		twice.focus(0, &adjacency, &edges);
		twice.focus(2, &adjacency, &edges);
		assert_eq!(once, twice);
	}
}
