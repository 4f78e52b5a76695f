use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::palette::NodeShape;
use super::state::{GraphEngine, Segment, ViewTransform};

const BACKGROUND: &str = "#ffffff";
const LABEL_COLOR: &str = "#555";
const LABEL_FONT: &str = "12px Arial";
const LINE_HEIGHT: f64 = 14.0;

/// Text measurement offered by a surface; `None` when unsupported.
pub trait TextMeasure {
	/// Rendered width of `text` in pixels.
	fn text_width(&self, text: &str) -> Option<f64>;
}

/// Surface without live text measurement.
pub struct NoMeasure;

impl TextMeasure for NoMeasure {
	fn text_width(&self, _text: &str) -> Option<f64> {
		None
	}
}

/// Anything able to draw the graph primitives under a pan/zoom transform.
pub trait RenderSurface: TextMeasure {
	/// Paints the background over the whole viewport.
	fn clear(&mut self, width: f64, height: f64);
	/// Applies pan and zoom to everything drawn until [`RenderSurface::reset_view`].
	fn set_view(&mut self, transform: &ViewTransform);
	/// Undoes [`RenderSurface::set_view`].
	fn reset_view(&mut self);
	/// Draws one link.
	fn draw_edge(&mut self, segment: Segment, stroke: &str, opacity: f64, dashed: bool);
	/// Draws one node centered on `(x, y)`.
	fn draw_node(
		&mut self,
		x: f64,
		y: f64,
		radius: f64,
		fill: &str,
		shape: NodeShape,
		opacity: f64,
	);
	/// Draws a label, one line below the other, starting at `(x, y)`.
	fn draw_text(&mut self, lines: &[String], x: f64, y: f64, opacity: f64);
}

/// Draws the last projected scene: edges, then nodes, then visible labels.
pub fn render(engine: &GraphEngine, surface: &mut dyn RenderSurface) {
	let scene = engine.scene();
	let highlight = engine.highlight();
	let palette = &engine.palette;

	surface.clear(engine.width(), engine.height());
	surface.set_view(&engine.transform);

	for ((edge, segment), opacity) in engine
		.edges()
		.iter()
		.zip(&scene.edges)
		.zip(&highlight.edge_opacity)
	{
		let kind = edge.kind.as_deref();
		surface.draw_edge(
			*segment,
			palette.edge_stroke(kind),
			*opacity,
			palette.edge_dashed(kind),
		);
	}

	let radius = engine.params().node_size / 2.0;
	for ((node, &(x, y)), opacity) in engine
		.nodes()
		.iter()
		.zip(&scene.nodes)
		.zip(&highlight.node_opacity)
	{
		surface.draw_node(
			x,
			y,
			radius,
			palette.node_fill(node.kind.as_deref(), node.group),
			palette.node_shape(node.is_root),
			*opacity,
		);
	}

	let carriers = engine.labels().carriers();
	for (owner, &(x, y)) in scene.labels.iter().enumerate() {
		let index = owner * 2 + 1;
		let visible = highlight.label_visible.get(index).copied();
		let (Some(carrier), Some(true)) = (carriers.get(index), visible) else {
			continue;
		};
		surface.draw_text(&carrier.lines, x, y, 1.0);
	}

	surface.reset_view();
}

/// Canvas 2D backend; measures text, so bounding-box label offsets apply.
pub struct CanvasSurface {
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// Draws onto `ctx`.
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl TextMeasure for CanvasSurface {
	fn text_width(&self, text: &str) -> Option<f64> {
		self.ctx.set_font(LABEL_FONT);
		self.ctx
			.measure_text(text)
			.ok()
			.map(|metrics| metrics.width())
	}
}

impl RenderSurface for CanvasSurface {
	fn clear(&mut self, width: f64, height: f64) {
		self.ctx.set_fill_style_str(BACKGROUND);
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn set_view(&mut self, transform: &ViewTransform) {
		self.ctx.save();
		let _ = self.ctx.translate(transform.x, transform.y);
		let _ = self.ctx.scale(transform.k, transform.k);
	}

	fn reset_view(&mut self) {
		self.ctx.restore();
	}

	fn draw_edge(&mut self, segment: Segment, stroke: &str, opacity: f64, dashed: bool) {
		let ctx = &self.ctx;
		ctx.set_global_alpha(opacity);
		ctx.set_stroke_style_str(stroke);
		ctx.set_line_width(1.0);
		if dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(4.0),
				&JsValue::from_f64(3.0),
			));
		}
		ctx.begin_path();
		ctx.move_to(segment.x1, segment.y1);
		ctx.line_to(segment.x2, segment.y2);
		ctx.stroke();
		if dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
		ctx.set_global_alpha(1.0);
	}

	fn draw_node(
		&mut self,
		x: f64,
		y: f64,
		radius: f64,
		fill: &str,
		shape: NodeShape,
		opacity: f64,
	) {
		let ctx = &self.ctx;
		ctx.set_global_alpha(opacity);
		ctx.set_fill_style_str(fill);
		match shape {
			NodeShape::Circle => {
				ctx.begin_path();
				let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
				ctx.fill();
			}
			NodeShape::Square => {
				let side = radius * 2.4;
				ctx.fill_rect(x - side / 2.0, y - side / 2.0, side, side);
			}
		}
		ctx.set_global_alpha(1.0);
	}

	fn draw_text(&mut self, lines: &[String], x: f64, y: f64, opacity: f64) {
		let ctx = &self.ctx;
		ctx.set_global_alpha(opacity);
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(LABEL_FONT);
		for (row, line) in lines.iter().enumerate() {
			let _ = ctx.fill_text(line, x, y + row as f64 * LINE_HEIGHT);
		}
		ctx.set_global_alpha(1.0);
	}
}
