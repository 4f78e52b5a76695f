use std::collections::HashMap;

use log::{debug, info, warn};

use super::adjacency::Adjacency;
use super::error::GraphError;
use super::geometry::{sanitize, spiral_position};
use super::highlight::Highlight;
use super::interaction::{DragState, PanState};
use super::labels::LabelModel;
use super::palette::Palette;
use super::render::TextMeasure;
use super::simulation::{
	Body, Center, Force, Link, ManyBody, Position, Simulation, SimulationConfig,
};
use super::types::{GraphData, LayoutParams};

/// A validated node as the engine keeps it.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInfo {
	/// Dataset id.
	pub id: String,
	/// Label text, or the id when unlabelled.
	pub text: String,
	/// Type tag.
	pub kind: Option<String>,
	/// Color group.
	pub group: Option<u32>,
	/// Whether this node is held at the canvas center.
	pub is_root: bool,
}

/// A link resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Relation tag.
	pub kind: Option<String>,
}

/// Pan offset and zoom factor applied when drawing.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// Horizontal pan in screen pixels.
	pub x: f64,
	/// Vertical pan in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// A straight edge from `(x1, y1)` to `(x2, y2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
}

/// Sanitized positions as last projected by the tick handler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// One position per node.
	pub nodes: Vec<(f64, f64)>,
	/// One segment per edge.
	pub edges: Vec<Segment>,
	/// One rendered label position per node.
	pub labels: Vec<(f64, f64)>,
}

/// Everything rebuilt together on construction and data replacement.
struct Graph {
	nodes: Vec<NodeInfo>,
	edges: Vec<Edge>,
	adjacency: Adjacency,
	labels: LabelModel,
	primary: Simulation,
	root: Option<usize>,
}

/// Layout engine behind the canvas: validated graph, both simulations,
/// highlight and gesture state.
pub struct GraphEngine {
	nodes: Vec<NodeInfo>,
	edges: Vec<Edge>,
	adjacency: Adjacency,
	labels: LabelModel,
	primary: Simulation,
	root: Option<usize>,
	highlight: Highlight,
	scene: Scene,
	params: LayoutParams,
	config: SimulationConfig,
	/// Colors and shapes used by [`render`](super::render::render).
	pub palette: Palette,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	pub(super) drag: DragState,
	pub(super) pan: PanState,
	pub(super) hovered: Option<usize>,
}

fn check_viewport(width: f64, height: f64) -> Result<(), GraphError> {
	if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
		Ok(())
	} else {
		Err(GraphError::InvalidViewport { width, height })
	}
}

fn center_forces(sim: &mut Simulation, width: f64, height: f64, strength: f64) {
	let (cx, cy) = (width / 2.0, height / 2.0);
	sim.set_force("center", Force::Center(Center::new(cx, cy)));
	sim.set_force("x", Force::Position(Position::x(cx, strength)));
	sim.set_force("y", Force::Position(Position::y(cy, strength)));
}

impl GraphEngine {
	/// Builds an engine with the default [`SimulationConfig`].
	pub fn new(
		data: &GraphData,
		params: LayoutParams,
		measure: &dyn TextMeasure,
	) -> Result<Self, GraphError> {
		Self::with_config(data, params, SimulationConfig::default(), measure)
	}

	/// Validates `data` and builds every derived structure.
	pub fn with_config(
		data: &GraphData,
		params: LayoutParams,
		config: SimulationConfig,
		measure: &dyn TextMeasure,
	) -> Result<Self, GraphError> {
		let graph = Self::build(data, &params, &config, measure)?;
		info!(
			"Graph built: {} nodes, {} links, {}x{}",
			graph.nodes.len(),
			graph.edges.len(),
			params.width,
			params.height
		);

		let mut engine = Self {
			highlight: Highlight::new(graph.nodes.len(), graph.edges.len()),
			nodes: graph.nodes,
			edges: graph.edges,
			adjacency: graph.adjacency,
			labels: graph.labels,
			primary: graph.primary,
			root: graph.root,
			scene: Scene::default(),
			params,
			config,
			palette: Palette::default(),
			transform: ViewTransform::default(),
			drag: DragState::Idle,
			pan: PanState::default(),
			hovered: None,
		};
		engine.project_all();
		Ok(engine)
	}

	fn build(
		data: &GraphData,
		params: &LayoutParams,
		config: &SimulationConfig,
		measure: &dyn TextMeasure,
	) -> Result<Graph, GraphError> {
		check_viewport(params.width, params.height)?;

		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		for (index, node) in data.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.as_str(), index).is_some() {
				return Err(GraphError::DuplicateNodeId(node.id.clone()));
			}
		}

		let lookup = |link: usize, id: &str| {
			id_to_idx
				.get(id)
				.copied()
				.ok_or_else(|| GraphError::UnknownLinkEndpoint {
					link,
					id: id.to_string(),
				})
		};
		let edges = data
			.links
			.iter()
			.enumerate()
			.map(|(index, link)| -> Result<Edge, GraphError> {
				Ok(Edge {
					source: lookup(index, &link.source)?,
					target: lookup(index, &link.target)?,
					kind: link.kind.clone(),
				})
			})
			.collect::<Result<Vec<_>, GraphError>>()?;

		let roots: Vec<usize> = match &params.root_kind {
			Some(root_kind) => data
				.nodes
				.iter()
				.enumerate()
				.filter(|(_, node)| node.kind.as_deref() == Some(root_kind.as_str()))
				.map(|(index, _)| index)
				.collect(),
			None => Vec::new(),
		};
		if roots.len() > 1 {
			warn!("{} root nodes found, centering only the first", roots.len());
		}
		let root = roots.first().copied();

		let nodes: Vec<NodeInfo> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(index, node)| NodeInfo {
				id: node.id.clone(),
				text: node.text().to_string(),
				kind: node.kind.clone(),
				group: node.group,
				is_root: Some(index) == root,
			})
			.collect();

		let (cx, cy) = (params.width / 2.0, params.height / 2.0);
		let bodies: Vec<Body> = (0..nodes.len())
			.map(|index| {
				let (x, y) = spiral_position(index, cx, cy);
				Body::at(x, y)
			})
			.collect();

		let links: Vec<(usize, usize)> = edges.iter().map(|e| (e.source, e.target)).collect();
		let adjacency = Adjacency::build(links.iter().copied());
		let labels = LabelModel::build(&data.nodes, &bodies, config, params.text_wrap, measure);

		let mut primary = Simulation::new(bodies)
			.velocity_decay(config.velocity_decay)
			.alpha_min(config.alpha_min)
			.with_force("charge", Force::ManyBody(ManyBody::new(config.charge)));
		center_forces(
			&mut primary,
			params.width,
			params.height,
			config.position_strength,
		);
		primary.set_force(
			"link",
			Force::Link(Link::new(links, config.link_distance, config.link_strength)),
		);

		Ok(Graph {
			nodes,
			edges,
			adjacency,
			labels,
			primary,
			root,
		})
	}

	/// Advances both simulations by one scheduler frame.
	///
	/// The label simulation runs first on positions from the previous primary
	/// tick, so labels trail the layout by at most one frame.
	pub fn frame(&mut self) -> bool {
		let labels_moved = self.labels.simulation_mut().step();
		if self.primary.step() {
			self.ticked();
			return true;
		}

		let label_sim = self.labels.simulation_mut();
		if label_sim.alpha_target() != 0.0 {
			label_sim.set_alpha_target(0.0);
		}
		if labels_moved {
			self.project_labels();
		}
		labels_moved
	}

	/// Tick handler of the primary simulation.
	fn ticked(&mut self) {
		self.pin_root();
		self.project_nodes();
		self.project_edges();

		self.labels.pin_anchors(self.primary.bodies());
		let label_sim = self.labels.simulation_mut();
		label_sim.set_alpha_target(self.config.label_alpha_target);
		label_sim.restart();
		self.project_labels();
	}

	fn pin_root(&mut self) {
		let Some(root) = self.root else {
			return;
		};
		if self.drag.node() == Some(root) {
			return;
		}
		let (cx, cy) = self.center();
		if let Some(body) = self.primary.bodies_mut().get_mut(root) {
			body.x = cx;
			body.y = cy;
			body.vx = 0.0;
			body.vy = 0.0;
		}
	}

	fn project_all(&mut self) {
		self.project_nodes();
		self.project_edges();
		self.project_labels();
	}

	fn project_nodes(&mut self) {
		self.scene.nodes = self
			.primary
			.bodies()
			.iter()
			.map(|body| (sanitize(body.x), sanitize(body.y)))
			.collect();
	}

	/// Reads the node positions projected just before.
	fn project_edges(&mut self) {
		let nodes = &self.scene.nodes;
		self.scene.edges = self
			.edges
			.iter()
			.map(|edge| {
				let (x1, y1) = nodes[edge.source];
				let (x2, y2) = nodes[edge.target];
				Segment { x1, y1, x2, y2 }
			})
			.collect();
	}

	fn project_labels(&mut self) {
		self.scene.labels = self.labels.placements(
			self.primary.bodies(),
			self.params.label_offset,
			self.params.node_size,
		);
	}

	/// Updates the viewport and re-targets the centering forces in place.
	pub fn set_size(&mut self, width: f64, height: f64) -> Result<(), GraphError> {
		check_viewport(width, height)?;
		debug!("Resize to {width}x{height}");
		self.params.width = width;
		self.params.height = height;
		center_forces(
			&mut self.primary,
			width,
			height,
			self.config.position_strength,
		);
		Ok(())
	}

	/// Discards every derived structure and rebuilds from `data`.
	///
	/// On error the engine keeps its previous graph.
	pub fn replace_data(
		&mut self,
		data: &GraphData,
		width: f64,
		height: f64,
		node_size: f64,
		measure: &dyn TextMeasure,
	) -> Result<(), GraphError> {
		let params = LayoutParams {
			width,
			height,
			node_size,
			..self.params.clone()
		};
		let graph = Self::build(data, &params, &self.config, measure)?;
		info!(
			"Graph replaced: {} nodes, {} links",
			graph.nodes.len(),
			graph.edges.len()
		);

		self.highlight = Highlight::new(graph.nodes.len(), graph.edges.len());
		self.nodes = graph.nodes;
		self.edges = graph.edges;
		self.adjacency = graph.adjacency;
		self.labels = graph.labels;
		self.primary = graph.primary;
		self.root = graph.root;
		self.params = params;
		self.drag = DragState::Idle;
		self.pan = PanState::default();
		self.hovered = None;
		self.project_all();
		Ok(())
	}

	/// Whether `a` and `b` are linked, or the same node.
	pub fn neighbor(&self, a: usize, b: usize) -> bool {
		self.adjacency.neighbor(a, b)
	}

	/// Highlights `index` and its neighbors. Out-of-range indices are ignored.
	pub fn focus(&mut self, index: usize) {
		if index >= self.nodes.len() {
			return;
		}
		let links: Vec<(usize, usize)> = self.edges.iter().map(|e| (e.source, e.target)).collect();
		self.highlight.focus(index, &self.adjacency, &links);
	}

	/// Clears any highlight.
	pub fn unfocus(&mut self) {
		self.highlight.unfocus();
	}

	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|node| node.id == id)
	}

	/// Canvas center.
	pub fn center(&self) -> (f64, f64) {
		(self.params.width / 2.0, self.params.height / 2.0)
	}

	/// Canvas width.
	pub fn width(&self) -> f64 {
		self.params.width
	}

	/// Canvas height.
	pub fn height(&self) -> f64 {
		self.params.height
	}

	/// Layout parameters in effect.
	pub fn params(&self) -> &LayoutParams {
		&self.params
	}

	/// Simulation tunables in effect.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Validated nodes, in dataset order.
	pub fn nodes(&self) -> &[NodeInfo] {
		&self.nodes
	}

	/// Resolved edges, in dataset order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Neighbor index.
	pub fn adjacency(&self) -> &Adjacency {
		&self.adjacency
	}

	/// Label carriers and their simulation.
	pub fn labels(&self) -> &LabelModel {
		&self.labels
	}

	/// Node layout simulation.
	pub fn primary(&self) -> &Simulation {
		&self.primary
	}

	pub(super) fn primary_mut(&mut self) -> &mut Simulation {
		&mut self.primary
	}

	/// Node held at the canvas center, if any.
	pub fn root(&self) -> Option<usize> {
		self.root
	}

	/// Current focus highlight.
	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	/// Positions as last projected for drawing.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Current drag gesture.
	pub fn drag_state(&self) -> DragState {
		self.drag
	}
}

#[cfg(test)]
mod tests {
	use super::super::geometry::LABEL_SHIFT_Y;
	use super::super::highlight::DIMMED_OPACITY;
	use super::super::render::NoMeasure;
	use super::super::types::{GraphLink, GraphNode};
	use super::*;

	fn node(id: &str, kind: Option<&str>) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: None,
			kind: kind.map(Into::into),
			group: None,
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
			kind: Some("support".into()),
		}
	}

	fn path_abc() -> GraphData {
		GraphData {
			nodes: vec![node("A", None), node("B", None), node("C", None)],
			links: vec![link("A", "B"), link("B", "C")],
		}
	}

	fn engine(data: &GraphData) -> GraphEngine {
		GraphEngine::new(data, LayoutParams::default(), &NoMeasure).expect("valid dataset")
	}

	#[test]
	fn unknown_link_endpoint_is_rejected() {
		let mut data = path_abc();
		data.links.push(link("C", "Z"));
		let err = GraphEngine::new(&data, LayoutParams::default(), &NoMeasure).err();
		assert_eq!(
			err,
			Some(GraphError::UnknownLinkEndpoint {
				link: 2,
				id: "Z".into()
			})
		);
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let mut data = path_abc();
		data.nodes.push(node("A", None));
		let err = GraphEngine::new(&data, LayoutParams::default(), &NoMeasure).err();
		assert_eq!(err, Some(GraphError::DuplicateNodeId("A".into())));
	}

	#[test]
	fn path_graph_focus_scenario() {
		let mut engine = engine(&path_abc());
		let (a, b, c) = (0, 1, 2);
		assert!(!engine.neighbor(a, c));
		assert!(engine.neighbor(a, b));

		engine.focus(b);
		assert_eq!(engine.highlight().node_opacity, vec![1.0, 1.0, 1.0]);

		engine.focus(a);
		assert_eq!(engine.highlight().node_opacity[c], DIMMED_OPACITY);
		assert_eq!(engine.highlight().edge_opacity, vec![1.0, DIMMED_OPACITY]);
		assert!(!engine.highlight().label_visible[2 * c + 1]);

		engine.unfocus();
		assert!(engine.highlight().node_opacity.iter().all(|&o| o == 1.0));
		assert!(engine.highlight().label_visible.iter().all(|&v| v));
	}

	#[test]
	fn root_is_centered_after_one_tick() {
		let data = GraphData {
			nodes: vec![node("topic", Some("agenda")), node("s1", Some("statement"))],
			links: vec![link("s1", "topic")],
		};
		let mut engine = engine(&data);
		let root = engine.root().expect("agenda node is root");
		engine.primary_mut().bodies_mut()[root].x = -250.0;
		engine.frame();
		let body = engine.primary().bodies()[root];
		assert_eq!((body.x, body.y), (400.0, 300.0));
		assert_eq!(engine.scene().nodes[root], (400.0, 300.0));
	}

	#[test]
	fn missing_root_means_no_override() {
		let mut engine = engine(&path_abc());
		assert_eq!(engine.root(), None);
		engine.frame();
		assert!(engine.primary().bodies().iter().all(|b| b.x.is_finite()));
	}

	#[test]
	fn drag_pin_wins_over_root_centering() {
		let data = GraphData {
			nodes: vec![node("topic", Some("agenda")), node("s1", None)],
			links: vec![link("s1", "topic")],
		};
		let mut engine = engine(&data);
		let root = engine.root().expect("root");
		assert!(engine.drag_start(root));
		engine.drag_move(root, 50.0, 60.0);
		engine.frame();
		let body = engine.primary().bodies()[root];
		assert_eq!((body.x, body.y), (50.0, 60.0));
	}

	#[test]
	fn resize_retargets_centering_without_rebuilding() {
		let mut engine = engine(&path_abc());
		let nodes_ptr = engine.nodes().as_ptr();
		let edges_ptr = engine.edges().as_ptr();
		let adjacency_len = engine.adjacency().len();

		engine.set_size(1000.0, 700.0).expect("valid size");

		assert_eq!(engine.center(), (500.0, 350.0));
		assert_eq!(
			engine.primary().force("center"),
			Some(&Force::Center(Center::new(500.0, 350.0)))
		);
		assert_eq!(
			engine.primary().force("x"),
			Some(&Force::Position(Position::x(500.0, 0.1)))
		);
		assert_eq!(engine.nodes().as_ptr(), nodes_ptr);
		assert_eq!(engine.edges().as_ptr(), edges_ptr);
		assert_eq!(engine.nodes().len(), 3);
		assert_eq!(engine.adjacency().len(), adjacency_len);
	}

	#[test]
	fn invalid_resize_is_rejected() {
		let mut engine = engine(&path_abc());
		assert!(engine.set_size(f64::NAN, 10.0).is_err());
		assert_eq!(engine.center(), (400.0, 300.0));
	}

	#[test]
	fn replace_data_rebuilds_everything() {
		let mut engine = engine(&path_abc());
		engine.focus(0);
		let data = GraphData {
			nodes: vec![node("x", None), node("y", None)],
			links: vec![link("x", "y")],
		};
		engine
			.replace_data(&data, 640.0, 480.0, 12.0, &NoMeasure)
			.expect("valid dataset");

		assert_eq!(engine.nodes().len(), 2);
		assert_eq!(engine.labels().carriers().len(), 4);
		assert_eq!(engine.adjacency().max_index(), Some(1));
		assert_eq!(engine.highlight().focused, None);
		assert_eq!(engine.center(), (320.0, 240.0));
		assert_eq!(engine.params().node_size, 12.0);
		assert_eq!(engine.scene().nodes.len(), 2);
	}

	#[test]
	fn failed_replace_keeps_previous_graph() {
		let mut engine = engine(&path_abc());
		let bad = GraphData {
			nodes: vec![node("x", None)],
			links: vec![link("x", "missing")],
		};
		let result = engine.replace_data(&bad, 640.0, 480.0, 12.0, &NoMeasure);
		assert!(result.is_err());
		assert_eq!(engine.nodes().len(), 3);
		assert_eq!(engine.center(), (400.0, 300.0));
	}

	#[test]
	fn labels_lag_primary_by_one_frame() {
		let mut engine = engine(&path_abc());
		assert!(engine.frame());
		// restarted from inside the primary tick handler
		assert!(engine.labels().simulation().is_running());
		assert_eq!(engine.labels().simulation().alpha_target(), 0.3);
		let anchor = engine.labels().simulation().bodies()[0];
		let owner = engine.primary().bodies()[0];
		assert_eq!((anchor.x, anchor.y), (owner.x, owner.y));
	}

	#[test]
	fn crowded_labels_drift_off_their_anchors() {
		struct CharWidth;

		impl TextMeasure for CharWidth {
			fn text_width(&self, text: &str) -> Option<f64> {
				Some(7.0 * text.chars().count() as f64)
			}
		}

		let mut data = path_abc();
		for node in &mut data.nodes {
			node.label = Some(format!("Statement {}", node.id));
		}
		let mut engine =
			GraphEngine::new(&data, LayoutParams::default(), &CharWidth).expect("valid dataset");
		for _ in 0..30 {
			engine.frame();
		}

		let bodies = engine.labels().simulation().bodies();
		for (owner, &(x, y)) in engine.scene().labels.iter().enumerate() {
			let (anchor, carrier) = (bodies[2 * owner], bodies[2 * owner + 1]);
			let gap = ((carrier.x - anchor.x).powi(2) + (carrier.y - anchor.y).powi(2)).sqrt();
			assert!(gap > 0.0, "label {owner} stuck on its node");

			let width = engine.labels().width(owner).expect("measured");
			assert!(x >= carrier.x - width - 1e-9 && x <= carrier.x + 1e-9);
			assert_eq!(y, carrier.y + LABEL_SHIFT_Y);
		}
	}

	#[test]
	fn scene_stays_finite_while_settling() {
		let data = GraphData {
			nodes: vec![node("A", None), node("B", None), node("C", None)],
			links: vec![link("A", "B"), link("A", "B"), link("B", "C")],
		};
		let mut engine = engine(&data);
		for _ in 0..400 {
			engine.frame();
		}
		assert!(!engine.primary().is_running());
		let scene = engine.scene();
		for &(x, y) in scene.nodes.iter().chain(&scene.labels) {
			assert!(x.is_finite() && y.is_finite());
		}
		assert_eq!(scene.edges.len(), 3);
	}
}
