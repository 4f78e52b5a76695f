use std::collections::HashSet;

/// Undirected neighbor lookup over node indices, derived from the edge list.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
	pairs: HashSet<(usize, usize)>,
}

impl Adjacency {
	/// Indexes both directions of every edge.
	pub fn build(edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
		let mut pairs = HashSet::new();
		for (source, target) in edges {
			pairs.insert((source, target));
			pairs.insert((target, source));
		}
		Self { pairs }
	}

	/// A node is always its own neighbor.
	pub fn neighbor(&self, a: usize, b: usize) -> bool {
		a == b || self.pairs.contains(&(a, b))
	}

	/// Number of directed entries (two per distinct undirected edge).
	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	/// Whether no edge was indexed.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	/// Largest node index referenced by an edge.
	pub fn max_index(&self) -> Option<usize> {
		self.pairs.iter().map(|&(a, b)| a.max(b)).max()
	}
}
