mod forces;

use forces::Jiggle;
pub(crate) use forces::{Center, Force, Link, ManyBody, Position};

/// Tunables for both simulations. Defaults match the argument-graph layout.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Many-body strength between nodes; negative repels.
	pub charge: f64,
	/// Rest length of node links.
	pub link_distance: f64,
	/// Stiffness of node links.
	pub link_strength: f64,
	/// Strength of the per-axis pull toward the canvas center.
	pub position_strength: f64,
	/// Many-body strength between label carriers.
	pub label_charge: f64,
	/// Rest length between a label anchor and its text carrier.
	pub label_link_distance: f64,
	/// Stiffness of the anchor-to-text link.
	pub label_link_strength: f64,
	/// Energy floor held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Energy floor the label simulation is restarted with on every primary tick.
	pub label_alpha_target: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Energy below which a simulation goes idle.
	pub alpha_min: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge: -3000.0,
			link_distance: 50.0,
			link_strength: 1.0,
			position_strength: 0.1,
			label_charge: -50.0,
			label_link_distance: 0.0,
			label_link_strength: 2.0,
			drag_alpha_target: 0.3,
			label_alpha_target: 0.3,
			velocity_decay: 0.4,
			alpha_min: 0.001,
		}
	}
}

/// A simulated point: position, velocity and an optional pin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Horizontal pin; overrides `x` on every tick while set.
	pub fx: Option<f64>,
	/// Vertical pin; overrides `y` on every tick while set.
	pub fy: Option<f64>,
}

impl Body {
	/// Unpinned body at rest at `(x, y)`.
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			..Self::default()
		}
	}

	/// Fixes the body at `(x, y)` until [`Body::unpin`].
	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	/// Releases both axes.
	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	/// Whether either axis is pinned.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// Velocity-Verlet style force simulation with a decaying energy (`alpha`).
///
/// The simulation does not schedule itself: the owner calls [`Simulation::step`]
/// once per frame, which advances one tick while the simulation is running.
#[derive(Clone, Debug)]
pub struct Simulation {
	bodies: Vec<Body>,
	forces: Vec<(&'static str, Force)>,
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	velocity_decay: f64,
	running: bool,
	jiggle: Jiggle,
}

impl Simulation {
	/// Running simulation at full energy with no forces.
	pub fn new(bodies: Vec<Body>) -> Self {
		let alpha_min = 0.001;
		Self {
			bodies,
			forces: Vec::new(),
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			running: true,
			jiggle: Jiggle::default(),
		}
	}

	/// Sets the fraction of velocity lost per tick.
	pub fn velocity_decay(mut self, velocity_decay: f64) -> Self {
		self.velocity_decay = velocity_decay;
		self
	}

	/// Sets the idle threshold and derives the decay so cooling takes about 300 ticks.
	pub fn alpha_min(mut self, alpha_min: f64) -> Self {
		self.alpha_min = alpha_min;
		self.alpha_decay = 1.0 - alpha_min.powf(1.0 / 300.0);
		self
	}

	pub(crate) fn with_force(mut self, name: &'static str, force: Force) -> Self {
		self.set_force(name, force);
		self
	}

	/// Registers `force` under `name`, replacing an existing force in place.
	pub(crate) fn set_force(&mut self, name: &'static str, mut force: Force) {
		force.initialize(self.bodies.len());
		match self.forces.iter().position(|(key, _)| *key == name) {
			Some(index) => self.forces[index].1 = force,
			None => self.forces.push((name, force)),
		}
	}

	pub(crate) fn force(&self, name: &str) -> Option<&Force> {
		self.forces
			.iter()
			.find(|(existing, _)| *existing == name)
			.map(|(_, force)| force)
	}

	/// Current bodies, in insertion order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Mutable bodies, e.g. to pin or move one.
	pub fn bodies_mut(&mut self) -> &mut [Body] {
		&mut self.bodies
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Overrides the current energy.
	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	/// Energy the simulation converges to.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the energy floor; a non-zero target keeps the layout warm.
	pub fn set_alpha_target(&mut self, alpha_target: f64) {
		self.alpha_target = alpha_target;
	}

	/// Resumes stepping without touching alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Halts stepping.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Whether [`Simulation::step`] will advance.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Advances one tick if running; returns whether a tick happened.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.alpha_min {
			self.running = false;
		}
		true
	}

	/// One integration step, regardless of the running flag.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		for (_, force) in &self.forces {
			force.apply(&mut self.bodies, self.alpha, &mut self.jiggle);
		}

		let keep = 1.0 - self.velocity_decay;
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= keep;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= keep;
					body.y += body.vy;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pair() -> Simulation {
		Simulation::new(vec![Body::at(0.0, 0.0), Body::at(100.0, 0.0)])
			.with_force("charge", Force::ManyBody(ManyBody::new(-30.0)))
			.with_force("link", Force::Link(Link::new(vec![(0, 1)], 50.0, 1.0)))
	}

	#[test]
	fn alpha_decays_and_simulation_goes_idle() {
		let mut sim = pair();
		let mut ticks = 0;
		while sim.step() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < 0.001);
		// roughly 300 ticks with the default decay
		assert!((290..=310).contains(&ticks), "{ticks} ticks");
	}

	#[test]
	fn alpha_target_keeps_simulation_warm() {
		let mut sim = pair();
		sim.set_alpha_target(0.3);
		for _ in 0..1000 {
			sim.step();
		}
		assert!(sim.is_running());
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
	}

	#[test]
	fn pinned_body_snaps_to_pin() {
		let mut sim = pair();
		sim.bodies_mut()[0].pin(-20.0, 35.0);
		sim.tick();
		let body = sim.bodies()[0];
		assert_eq!((body.x, body.y), (-20.0, 35.0));
		assert_eq!((body.vx, body.vy), (0.0, 0.0));
	}

	#[test]
	fn set_force_replaces_by_name() {
		let mut sim = pair();
		sim.set_force("center", Force::Center(Center::new(1.0, 2.0)));
		sim.set_force("center", Force::Center(Center::new(5.0, 6.0)));
		assert_eq!(
			sim.force("center"),
			Some(&Force::Center(Center::new(5.0, 6.0)))
		);
		assert!(sim.force("missing").is_none());
	}

	#[test]
	fn stopped_simulation_does_not_step() {
		let mut sim = pair();
		sim.stop();
		let before = sim.bodies().to_vec();
		assert!(!sim.step());
		assert_eq!(sim.bodies(), before.as_slice());
		sim.restart();
		assert!(sim.step());
	}
}
