use super::geometry::{LABEL_SHIFT_Y, distance, label_shift_x, sanitize};
use super::render::TextMeasure;
use super::simulation::{Body, Force, Link, ManyBody, Simulation, SimulationConfig};
use super::types::GraphNode;

/// How a visible label is offset from the node it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelOffsetStrategy {
	/// Shift by the measured text width, driven by the drifting carrier.
	/// Falls back to [`LabelOffsetStrategy::FixedSize`] when nothing was measured.
	#[default]
	BoundingBox,
	/// Place the label half a node size left of the node.
	FixedSize,
}

impl LabelOffsetStrategy {
	/// Rendered position of a label given its anchor (the owning node),
	/// its drifting carrier and the measured text width.
	pub fn place(
		self,
		anchor: (f64, f64),
		carrier: (f64, f64),
		width: Option<f64>,
		node_size: f64,
	) -> (f64, f64) {
		let (ax, ay) = (sanitize(anchor.0), sanitize(anchor.1));
		match (self, width) {
			(LabelOffsetStrategy::BoundingBox, Some(width)) => {
				let (cx, cy) = (sanitize(carrier.0), sanitize(carrier.1));
				let (dx, dy) = (cx - ax, cy - ay);
				let shift_x = label_shift_x(width, dx, distance(dx, dy));
				(sanitize(cx + shift_x), sanitize(cy + LABEL_SHIFT_Y))
			}
			_ => (sanitize(ax - node_size / 2.0), sanitize(ay + LABEL_SHIFT_Y)),
		}
	}
}

/// Synthetic point carrying a label. Even carriers anchor to their owner and
/// have no text; odd carriers hold the owner's text.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelCarrier {
	/// Index of the node the carrier belongs to.
	pub owner: usize,
	/// Full label text; empty on anchors.
	pub text: String,
	/// `text` after wrapping.
	pub lines: Vec<String>,
}

impl LabelCarrier {
	/// Whether this is the invisible carrier pinned to the node.
	pub fn is_anchor(&self) -> bool {
		self.text.is_empty() && self.lines.is_empty()
	}
}

/// Greedy word wrap; words longer than `max_chars` keep a line of their own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
	if max_chars == 0 {
		return vec![text.to_string()];
	}
	let mut lines = Vec::new();
	let mut current = String::new();
	for word in text.split_whitespace() {
		if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
			lines.push(std::mem::take(&mut current));
		}
		if !current.is_empty() {
			current.push(' ');
		}
		current.push_str(word);
	}
	if !current.is_empty() || lines.is_empty() {
		lines.push(current);
	}
	lines
}

/// Secondary graph keeping labels near, but offset from, their nodes.
#[derive(Clone, Debug)]
pub struct LabelModel {
	carriers: Vec<LabelCarrier>,
	widths: Vec<Option<f64>>,
	simulation: Simulation,
}

impl LabelModel {
	pub(crate) fn build(
		nodes: &[GraphNode],
		owners: &[Body],
		config: &SimulationConfig,
		text_wrap: Option<usize>,
		measure: &dyn TextMeasure,
	) -> Self {
		let mut carriers = Vec::with_capacity(nodes.len() * 2);
		let mut bodies = Vec::with_capacity(nodes.len() * 2);
		let mut pairs = Vec::with_capacity(nodes.len());
		let mut widths = Vec::with_capacity(nodes.len());

		for (index, node) in nodes.iter().enumerate() {
			let text = node.text().to_string();
			let lines = match text_wrap {
				Some(max_chars) => wrap_text(&text, max_chars),
				None => vec![text.clone()],
			};
			let width = lines
				.iter()
				.map(|line| measure.text_width(line))
				.try_fold(0.0_f64, |widest, measured| measured.map(|w| widest.max(w)));
			widths.push(width);

			let owner = owners.get(index).copied().unwrap_or_default();
			let mut anchor = Body::at(owner.x, owner.y);
			anchor.pin(owner.x, owner.y);
			bodies.push(anchor);
			bodies.push(Body::at(owner.x, owner.y));

			carriers.push(LabelCarrier {
				owner: index,
				text: String::new(),
				lines: Vec::new(),
			});
			carriers.push(LabelCarrier {
				owner: index,
				text,
				lines,
			});
			pairs.push((index * 2, index * 2 + 1));
		}

		let simulation = Simulation::new(bodies)
			.velocity_decay(config.velocity_decay)
			.alpha_min(config.alpha_min)
			.with_force(
				"charge",
				Force::ManyBody(ManyBody::new(config.label_charge)),
			)
			.with_force(
				"link",
				Force::Link(Link::new(
					pairs,
					config.label_link_distance,
					config.label_link_strength,
				)),
			);

		Self {
			carriers,
			widths,
			simulation,
		}
	}

	/// Two carriers per node: anchor at `2i`, text at `2i + 1`.
	pub fn carriers(&self) -> &[LabelCarrier] {
		&self.carriers
	}

	/// Measured label width of node `owner`, if the surface could measure it.
	pub fn width(&self, owner: usize) -> Option<f64> {
		self.widths.get(owner).copied().flatten()
	}

	/// The label layout simulation.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub(crate) fn simulation_mut(&mut self) -> &mut Simulation {
		&mut self.simulation
	}

	/// Snaps every anchor carrier onto its owner's current position.
	pub(crate) fn pin_anchors(&mut self, owners: &[Body]) {
		for (index, body) in self.simulation.bodies_mut().iter_mut().enumerate() {
			if index % 2 != 0 {
				continue;
			}
			if let Some(owner) = owners.get(index / 2) {
				body.x = owner.x;
				body.y = owner.y;
				body.pin(owner.x, owner.y);
			}
		}
	}

	/// Rendered label positions, one per owner node.
	pub(crate) fn placements(
		&self,
		owners: &[Body],
		strategy: LabelOffsetStrategy,
		node_size: f64,
	) -> Vec<(f64, f64)> {
		let bodies = self.simulation.bodies();
		owners
			.iter()
			.enumerate()
			.map(|(index, owner)| {
				let carrier = bodies
					.get(index * 2 + 1)
					.map(|body| (body.x, body.y))
					.unwrap_or((owner.x, owner.y));
				strategy.place((owner.x, owner.y), carrier, self.width(index), node_size)
			})
			.collect()
	}
}
