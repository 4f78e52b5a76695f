use thiserror::Error;

/// Reasons a dataset or viewport is rejected before anything is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
	/// A link names a node id absent from the dataset.
	#[error("link {link} references unknown node `{id}`")]
	UnknownLinkEndpoint {
		/// Position of the link in the dataset.
		link: usize,
		/// The unresolved id.
		id: String,
	},

	/// Two nodes share an id.
	#[error("node id `{0}` appears more than once")]
	DuplicateNodeId(String),

	/// Width or height is non-finite or not positive.
	#[error("invalid viewport {width}x{height}")]
	InvalidViewport {
		/// Requested width.
		width: f64,
		/// Requested height.
		height: f64,
	},
}
