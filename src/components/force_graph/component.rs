use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, CanvasSurface};
use super::state::GraphEngine;
use super::types::{GraphData, LayoutParams};

struct Runtime {
	engine: GraphEngine,
	surface: CanvasSurface,
}

type Shared<T> = Rc<RefCell<Option<T>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some((width, height))
}

fn canvas_size(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen && let Some(size) = web_sys::window().as_ref().and_then(window_size) {
		return size;
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn remove_resize_listener(window: &Window, callback: &Closure<dyn FnMut()>) {
	if let Err(err) =
		window.remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
	{
		warn!("Cannot remove resize listener: {err:?}");
	}
}

/// Canvas-relative pointer position.
fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive argument graph drawn on a 2D canvas.
///
/// Changing `data` replaces the whole graph; the pan/zoom transform survives.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, default = "force-graph".to_string())] container_id: String,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = 10.0)] node_size: f64,
	#[prop(default = None)] text_wrap: Option<usize>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let runtime: Shared<Runtime> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (runtime_init, animate_init, resize_cb_init) =
		(runtime.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if let Some(rt) = runtime_init.borrow_mut().as_mut() {
			let Runtime { engine, surface } = rt;
			let (w, h) = (engine.width(), engine.height());
			if let Err(err) = engine.replace_data(&graph, w, h, node_size, &*surface) {
				warn!("Graph data rejected, keeping previous graph: {err}");
			}
			return;
		}

		let Some(window) = web_sys::window() else {
			error!("No window available");
			return;
		};
		let (w, h) = canvas_size(&canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			error!("Canvas 2D context unavailable");
			return;
		};
		let surface = CanvasSurface::new(ctx);
		let params = LayoutParams {
			width: w,
			height: h,
			node_size,
			text_wrap,
			..LayoutParams::default()
		};
		let engine = match GraphEngine::new(&graph, params, &surface) {
			Ok(engine) => engine,
			Err(err) => {
				error!("Cannot build graph: {err}");
				return;
			}
		};
		*runtime_init.borrow_mut() = Some(Runtime { engine, surface });

		if fullscreen {
			let (runtime_resize, canvas_resize) = (runtime_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(rt) = runtime_resize.borrow_mut().as_mut()
					&& let Err(err) = rt.engine.set_size(nw, nh)
				{
					warn!("Ignoring resize: {err}");
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow()
				&& let Err(err) =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
			{
				warn!("Cannot listen for resize: {err:?}");
			}
		}

		let (runtime_anim, animate_inner, resize_anim) =
			(runtime_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			// unmounted: release the engine and the resize listener, stop scheduling
			if !canvas.is_connected() {
				if let Some(cb) = resize_anim.borrow_mut().take() {
					remove_resize_listener(&win, &cb);
				}
				runtime_anim.borrow_mut().take();
				debug!("Canvas detached, animation stopped");
				return;
			}
			if let Some(rt) = runtime_anim.borrow_mut().as_mut() {
				rt.engine.frame();
				render::render(&rt.engine, &mut rt.surface);
			}
			if let Some(cb) = animate_inner.borrow().as_ref()
				&& let Err(err) = win.request_animation_frame(cb.as_ref().unchecked_ref())
			{
				error!("Animation frame request failed: {err:?}");
			}
		}));
		if let Some(ref cb) = *animate_init.borrow()
			&& let Err(err) = window.request_animation_frame(cb.as_ref().unchecked_ref())
		{
			error!("Animation frame request failed: {err:?}");
		}
	});

	let runtime_md = runtime.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(rt) = runtime_md.borrow_mut().as_mut()
			&& rt.engine.pointer_down(x, y)
		{
			ev.stop_propagation();
		}
	};

	let runtime_mm = runtime.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(rt) = runtime_mm.borrow_mut().as_mut() {
			rt.engine.pointer_move(x, y);
		}
	};

	let runtime_mu = runtime.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(rt) = runtime_mu.borrow_mut().as_mut() {
			rt.engine.pointer_up();
		}
	};

	let runtime_ml = runtime.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(rt) = runtime_ml.borrow_mut().as_mut() {
			rt.engine.pointer_leave();
		}
	};

	let runtime_wh = runtime.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(rt) = runtime_wh.borrow_mut().as_mut() {
			rt.engine.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			id=container_id
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
