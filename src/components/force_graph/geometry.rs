use std::f64::consts::PI;

/// Vertical offset applied to every visible label, below its carrier.
pub const LABEL_SHIFT_Y: f64 = 16.0;

const INITIAL_RADIUS: f64 = 10.0;

/// Coerces non-finite coordinates to zero before they reach the surface.
pub fn sanitize(coord: f64) -> f64 {
	if coord.is_finite() { coord } else { 0.0 }
}

pub(crate) fn distance(dx: f64, dy: f64) -> f64 {
	(dx * dx + dy * dy).sqrt()
}

/// Horizontal shift of a label of `width` whose carrier sits `diff_x`
/// (at euclidean `dist`) from its anchor. Clamped to `[-width, 0]`.
pub fn label_shift_x(width: f64, diff_x: f64, dist: f64) -> f64 {
	if !(dist.is_finite() && dist > 0.0) || !width.is_finite() {
		return 0.0;
	}
	let shift = width * (diff_x - dist) / (2.0 * dist);
	if shift.is_finite() {
		shift.clamp(-width.abs(), 0.0)
	} else {
		0.0
	}
}

/// Phyllotaxis start position for the `index`th body around `(cx, cy)`.
pub(crate) fn spiral_position(index: usize, cx: f64, cy: f64) -> (f64, f64) {
	let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
	let angle = index as f64 * PI * (3.0 - 5.0_f64.sqrt());
	(cx + radius * angle.cos(), cy + radius * angle.sin())
}
