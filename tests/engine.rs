use argument_graph_canvas::force_graph::{
	DIMMED_OPACITY, DragState, GraphData, GraphEngine, GraphError, LayoutParams, NoMeasure,
	TextMeasure,
};

struct FixedWidth;

impl TextMeasure for FixedWidth {
	fn text_width(&self, text: &str) -> Option<f64> {
		Some(7.0 * text.chars().count() as f64)
	}
}

const DISCUSSION: &str = r#"{
	"nodes": [
		{ "id": "topic", "label": "Four-day week?", "type": "agenda" },
		{ "id": "a", "label": "More rest", "type": "starting" },
		{ "id": "b", "label": "Less output", "type": "starting" },
		{ "id": "c", "label": "Studies show equal output", "type": "statement" },
		{ "id": "lonely", "type": "statement" }
	],
	"links": [
		{ "source": "a", "target": "topic", "type": "starting" },
		{ "source": "b", "target": "topic", "type": "starting" },
		{ "source": "c", "target": "b", "type": "attack" }
	]
}"#;

fn discussion() -> GraphData {
	serde_json::from_str(DISCUSSION).expect("valid json")
}

fn settle(engine: &mut GraphEngine) -> usize {
	let mut frames = 0;
	while engine.primary().is_running() {
		engine.frame();
		frames += 1;
		assert!(frames < 2000, "layout never settled");
	}
	frames
}

#[test]
fn dataset_loads_from_json() {
	let data = discussion();
	assert_eq!(data.nodes[0].kind.as_deref(), Some("agenda"));
	assert_eq!(data.nodes[4].label, None);
	assert_eq!(data.links[2].kind.as_deref(), Some("attack"));

	let engine = GraphEngine::new(&data, LayoutParams::default(), &FixedWidth).expect("valid");
	assert_eq!(engine.root(), engine.index_of("topic"));
	assert_eq!(engine.nodes()[4].text, "lonely");
	assert_eq!(engine.labels().carriers().len(), 10);
	assert_eq!(engine.labels().width(1), Some(63.0));
}

#[test]
fn layout_settles_around_the_centered_root() {
	let mut engine =
		GraphEngine::new(&discussion(), LayoutParams::default(), &FixedWidth).expect("valid");
	settle(&mut engine);
	// the first idle frame cools the label layout
	engine.frame();

	let root = engine.root().expect("root");
	assert_eq!(engine.scene().nodes[root], (400.0, 300.0));
	assert_eq!(engine.labels().simulation().alpha_target(), 0.0);
	for &(x, y) in &engine.scene().nodes {
		assert!(x.is_finite() && y.is_finite());
	}
	// linked statements stay within a few link lengths of each other
	let (ax, ay) = engine.scene().nodes[engine.index_of("a").expect("a")];
	assert!(((ax - 400.0).powi(2) + (ay - 300.0).powi(2)).sqrt() < 400.0);
}

#[test]
fn focus_dims_everything_outside_the_neighborhood() {
	let mut engine =
		GraphEngine::new(&discussion(), LayoutParams::default(), &NoMeasure).expect("valid");
	let b = engine.index_of("b").expect("b");
	let c = engine.index_of("c").expect("c");
	let topic = engine.index_of("topic").expect("topic");
	let a = engine.index_of("a").expect("a");

	engine.focus(b);
	let highlight = engine.highlight();
	assert_eq!(highlight.node_opacity[b], 1.0);
	assert_eq!(highlight.node_opacity[c], 1.0);
	assert_eq!(highlight.node_opacity[topic], 1.0);
	assert_eq!(highlight.node_opacity[a], DIMMED_OPACITY);
	assert_eq!(highlight.edge_opacity, vec![DIMMED_OPACITY, 1.0, 1.0]);
	assert!(highlight.label_visible[2 * c + 1]);
	assert!(!highlight.label_visible[2 * a + 1]);

	let lonely = engine.index_of("lonely").expect("lonely");
	engine.focus(lonely);
	let dimmed = engine
		.highlight()
		.node_opacity
		.iter()
		.filter(|&&o| o == DIMMED_OPACITY)
		.count();
	assert_eq!(dimmed, 4);
}

#[test]
fn drag_reheats_a_settled_layout_and_releases_cleanly() {
	let mut engine =
		GraphEngine::new(&discussion(), LayoutParams::default(), &NoMeasure).expect("valid");
	settle(&mut engine);
	let c = engine.index_of("c").expect("c");

	assert!(engine.drag_start(c));
	assert_eq!(engine.drag_state(), DragState::Dragging { node: c });
	for step in 0..20 {
		engine.drag_move(c, 100.0 + step as f64, 120.0);
		engine.frame();
	}
	assert_eq!(engine.scene().nodes[c], (119.0, 120.0));

	engine.drag_end(c);
	assert!(!engine.primary().bodies()[c].is_pinned());
	let frames = settle(&mut engine);
	assert!(frames > 0);
}

#[test]
fn replacing_with_a_broken_dataset_reports_the_link() {
	let mut engine =
		GraphEngine::new(&discussion(), LayoutParams::default(), &NoMeasure).expect("valid");
	let mut broken = discussion();
	broken.links[1].target = "nowhere".into();

	let err = engine
		.replace_data(&broken, 800.0, 600.0, 10.0, &NoMeasure)
		.expect_err("unknown endpoint");
	assert_eq!(
		err,
		GraphError::UnknownLinkEndpoint {
			link: 1,
			id: "nowhere".into()
		}
	);
	assert_eq!(engine.nodes().len(), 5);
}

#[test]
fn empty_dataset_is_valid() {
	let data = GraphData::default();
	let mut engine = GraphEngine::new(&data, LayoutParams::default(), &NoMeasure).expect("valid");
	assert_eq!(engine.root(), None);
	settle(&mut engine);
	assert!(engine.scene().nodes.is_empty());
}
