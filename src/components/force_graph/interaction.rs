use log::debug;

use super::state::GraphEngine;

pub(crate) const HIT_RADIUS: f64 = 12.0;
/// Smallest zoom factor reachable with the wheel.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor reachable with the wheel.
pub const MAX_ZOOM: f64 = 4.0;

/// Single-pointer drag gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
	/// No node is held.
	#[default]
	Idle,
	/// `node` is pinned under the pointer.
	Dragging {
		/// Index of the held node.
		node: usize,
	},
}

impl DragState {
	/// The held node, if any.
	pub fn node(self) -> Option<usize> {
		match self {
			DragState::Idle => None,
			DragState::Dragging { node } => Some(node),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PanState {
	pub(crate) active: bool,
	pub(crate) start_x: f64,
	pub(crate) start_y: f64,
	pub(crate) transform_start_x: f64,
	pub(crate) transform_start_y: f64,
}

impl GraphEngine {
	/// Pins `node` where it currently is and keeps the layout warm.
	///
	/// Returns whether the gesture was captured, in which case the host must
	/// keep the event away from pan/zoom handling.
	pub fn drag_start(&mut self, node: usize) -> bool {
		if node >= self.nodes().len() {
			return false;
		}
		if let Some(active) = self.drag.node()
			&& active != node
		{
			self.release(active);
		}

		let target = self.config().drag_alpha_target;
		let primary = self.primary_mut();
		if primary.alpha_target() < target {
			primary.set_alpha_target(target);
			primary.restart();
		}
		let body = &mut primary.bodies_mut()[node];
		let (x, y) = (body.x, body.y);
		body.pin(x, y);

		debug!("[{node}] Drag start at ({x:.1}, {y:.1})");
		self.drag = DragState::Dragging { node };
		true
	}

	/// Moves the pin of the dragged node to graph coordinates `(x, y)`.
	pub fn drag_move(&mut self, node: usize, x: f64, y: f64) {
		if self.drag.node() != Some(node) || !(x.is_finite() && y.is_finite()) {
			return;
		}
		self.primary_mut().bodies_mut()[node].pin(x, y);
	}

	/// Releases the pin and lets the simulation energy decay again.
	pub fn drag_end(&mut self, node: usize) {
		if self.drag.node() != Some(node) {
			return;
		}
		let target = self.config().drag_alpha_target;
		let primary = self.primary_mut();
		if (primary.alpha_target() - target).abs() < f64::EPSILON {
			primary.set_alpha_target(0.0);
		}
		self.release(node);
		debug!("[{node}] Drag end");
		self.drag = DragState::Idle;
	}

	fn release(&mut self, node: usize) {
		if let Some(body) = self.primary_mut().bodies_mut().get_mut(node) {
			body.unpin();
		}
	}

	/// Inverts the pan/zoom transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Closest node under the screen point, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let radius = HIT_RADIUS.max(self.params().node_size / 2.0);
		self.scene()
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(index, &(x, y))| {
				let distance = ((x - gx).powi(2) + (y - gy).powi(2)).sqrt();
				(distance < radius).then_some((index, distance))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(index, _)| index)
	}

	/// Focuses the hovered node, or unfocuses on `None`.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		match node {
			Some(index) => self.focus(index),
			None => self.unfocus(),
		}
	}

	/// Starts a drag on a hit node, else starts panning. Returns whether a
	/// node captured the pointer.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> bool {
		if let Some(index) = self.node_at_position(sx, sy) {
			return self.drag_start(index);
		}
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
		false
	}

	/// Moves the dragged node, pans, or updates hover, in that order of precedence.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(node) = self.drag.node() {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.drag_move(node, gx, gy);
			return;
		}
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			return;
		}
		let hovered = self.node_at_position(sx, sy);
		self.set_hover(hovered);
	}

	/// Ends any drag or pan.
	pub fn pointer_up(&mut self) {
		if let Some(node) = self.drag.node() {
			self.drag_end(node);
		}
		self.pan.active = false;
	}

	/// Ends any gesture and clears hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zooms around the screen point, keeping it fixed.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}
