use log::warn;

use super::Body;

const LCG_A: u64 = 1_664_525;
const LCG_C: u64 = 1_013_904_223;
const LCG_M: u64 = 4_294_967_296;

/// Deterministic source of tiny offsets used to separate coincident points.
#[derive(Clone, Debug)]
pub(crate) struct Jiggle {
	state: u64,
}

impl Default for Jiggle {
	fn default() -> Self {
		Self { state: 1 }
	}
}

impl Jiggle {
	fn next_unit(&mut self) -> f64 {
		self.state = (LCG_A * self.state + LCG_C) % LCG_M;
		self.state as f64 / LCG_M as f64
	}

	pub(crate) fn next(&mut self) -> f64 {
		(self.next_unit() - 0.5) * 1e-6
	}
}

/// Pairwise repulsion (negative strength) or attraction between all bodies.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ManyBody {
	pub(crate) strength: f64,
	pub(crate) distance_min: f64,
}

impl ManyBody {
	pub(crate) fn new(strength: f64) -> Self {
		Self {
			strength,
			distance_min: 1.0,
		}
	}

	fn apply(&self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
		let positions: Vec<(f64, f64)> = bodies.iter().map(|b| (b.x, b.y)).collect();
		let distance_min_sq = self.distance_min * self.distance_min;

		for (i, body) in bodies.iter_mut().enumerate() {
			let (xi, yi) = positions[i];
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for (j, &(xj, yj)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let (mut x, mut y) = (xj - xi, yj - yi);
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = jiggle.next();
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle.next();
					l += y * y;
				}
				if l < distance_min_sq {
					l = (distance_min_sq * l).sqrt();
				}
				dvx += x * self.strength * alpha / l;
				dvy += y * self.strength * alpha / l;
			}
			body.vx += dvx;
			body.vy += dvy;
		}
	}
}

/// Translates all bodies so their mean position sits on the target.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Center {
	pub(crate) x: f64,
	pub(crate) y: f64,
	pub(crate) strength: f64,
}

impl Center {
	pub(crate) fn new(x: f64, y: f64) -> Self {
		Self { x, y, strength: 1.0 }
	}

	fn apply(&self, bodies: &mut [Body]) {
		if bodies.is_empty() {
			return;
		}
		let n = bodies.len() as f64;
		let (sum_x, sum_y) = bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let shift_x = (sum_x / n - self.x) * self.strength;
		let shift_y = (sum_y / n - self.y) * self.strength;
		for body in bodies {
			body.x -= shift_x;
			body.y -= shift_y;
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
	X,
	Y,
}

/// Per-axis spring toward a fixed coordinate.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Position {
	pub(crate) axis: Axis,
	pub(crate) target: f64,
	pub(crate) strength: f64,
}

impl Position {
	pub(crate) fn x(target: f64, strength: f64) -> Self {
		Self {
			axis: Axis::X,
			target,
			strength,
		}
	}

	pub(crate) fn y(target: f64, strength: f64) -> Self {
		Self {
			axis: Axis::Y,
			target,
			strength,
		}
	}

	fn apply(&self, bodies: &mut [Body], alpha: f64) {
		for body in bodies {
			match self.axis {
				Axis::X => body.vx += (self.target - body.x) * self.strength * alpha,
				Axis::Y => body.vy += (self.target - body.y) * self.strength * alpha,
			}
		}
	}
}

/// Springs between linked bodies with a rest length.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Link {
	links: Vec<(usize, usize)>,
	pub(crate) distance: f64,
	pub(crate) strength: f64,
	bias: Vec<f64>,
}

impl Link {
	pub(crate) fn new(links: Vec<(usize, usize)>, distance: f64, strength: f64) -> Self {
		Self {
			links,
			distance,
			strength,
			bias: Vec::new(),
		}
	}

	/// Drops pairs pointing past `body_count`, then computes the degree bias.
	fn initialize(&mut self, body_count: usize) {
		let before = self.links.len();
		self.links.retain(|&(s, t)| s.max(t) < body_count);
		if self.links.len() < before {
			warn!(
				"Dropped {} links outside {body_count} bodies",
				before - self.links.len()
			);
		}

		let mut degree = vec![0usize; body_count];
		for &(source, target) in &self.links {
			degree[source] += 1;
			degree[target] += 1;
		}
		self.bias = self
			.links
			.iter()
			.map(|&(source, target)| {
				degree[source] as f64 / (degree[source] + degree[target]) as f64
			})
			.collect();
	}

	fn apply(&self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
		for (&(source, target), &bias) in self.links.iter().zip(&self.bias) {
			let (s, t) = (bodies[source], bodies[target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			if x == 0.0 {
				x = jiggle.next();
			}
			let mut y = t.y + t.vy - s.y - s.vy;
			if y == 0.0 {
				y = jiggle.next();
			}
			let length = (x * x + y * y).sqrt();
			let scale = (length - self.distance) / length * alpha * self.strength;
			x *= scale;
			y *= scale;

			bodies[target].vx -= x * bias;
			bodies[target].vy -= y * bias;
			bodies[source].vx += x * (1.0 - bias);
			bodies[source].vy += y * (1.0 - bias);
		}
	}
}

/// A force registered on a simulation under a name.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Force {
	ManyBody(ManyBody),
	Center(Center),
	Position(Position),
	Link(Link),
}

impl Force {
	pub(super) fn initialize(&mut self, body_count: usize) {
		if let Force::Link(link) = self {
			link.initialize(body_count);
		}
	}

	pub(super) fn apply(&self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
		match self {
			Force::ManyBody(force) => force.apply(bodies, alpha, jiggle),
			Force::Center(force) => force.apply(bodies),
			Force::Position(force) => force.apply(bodies, alpha),
			Force::Link(force) => force.apply(bodies, alpha, jiggle),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bodies(points: &[(f64, f64)]) -> Vec<Body> {
		points.iter().map(|&(x, y)| Body::at(x, y)).collect()
	}

	#[test]
	fn negative_charge_pushes_apart() {
		let mut b = bodies(&[(0.0, 0.0), (10.0, 0.0)]);
		ManyBody::new(-30.0).apply(&mut b, 1.0, &mut Jiggle::default());
		assert!(b[0].vx < 0.0);
		assert!(b[1].vx > 0.0);
		assert!((b[0].vx + b[1].vx).abs() < 1e-12);
	}

	#[test]
	fn coincident_bodies_are_separated_without_nan() {
		let mut b = bodies(&[(5.0, 5.0), (5.0, 5.0)]);
		ManyBody::new(-30.0).apply(&mut b, 1.0, &mut Jiggle::default());
		for body in &b {
			assert!(body.vx.is_finite() && body.vy.is_finite());
		}
		assert!(b[0].vx != 0.0 || b[0].vy != 0.0);
	}

	#[test]
	fn center_moves_mean_onto_target() {
		let mut b = bodies(&[(0.0, 0.0), (10.0, 20.0)]);
		Center::new(100.0, 100.0).apply(&mut b);
		let mean_x = (b[0].x + b[1].x) / 2.0;
		let mean_y = (b[0].y + b[1].y) / 2.0;
		assert!((mean_x - 100.0).abs() < 1e-9);
		assert!((mean_y - 100.0).abs() < 1e-9);
	}

	#[test]
	fn position_force_pulls_per_axis() {
		let mut b = bodies(&[(0.0, 50.0)]);
		Position::x(100.0, 0.1).apply(&mut b, 1.0);
		assert!((b[0].vx - 10.0).abs() < 1e-9);
		assert_eq!(b[0].vy, 0.0);
	}

	#[test]
	fn stretched_link_pulls_endpoints_together() {
		let mut b = bodies(&[(0.0, 0.0), (100.0, 0.0)]);
		let mut link = Link::new(vec![(0, 1)], 50.0, 1.0);
		link.initialize(b.len());
		link.apply(&mut b, 1.0, &mut Jiggle::default());
		assert!(b[0].vx > 0.0);
		assert!(b[1].vx < 0.0);
		// equal degree splits the correction evenly
		assert!((b[0].vx + b[1].vx).abs() < 1e-9);
	}

	#[test]
	fn links_past_the_last_body_are_dropped() {
		let mut b = bodies(&[(0.0, 0.0), (100.0, 0.0)]);
		let mut link = Link::new(vec![(0, 1), (1, 7), (9, 0)], 50.0, 1.0);
		link.initialize(b.len());
		assert_eq!(link.links, vec![(0, 1)]);
		link.apply(&mut b, 1.0, &mut Jiggle::default());
		assert!(b[0].vx > 0.0);
	}
}
