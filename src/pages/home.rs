use leptos::prelude::*;
use log::error;

use crate::components::force_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode};

const DISCUSSION: &str = r#"{
	"nodes": [
		{ "id": "topic", "label": "Should the city build a new park?", "type": "agenda" },
		{ "id": "s1", "label": "Parks raise the quality of life", "type": "starting" },
		{ "id": "s2", "label": "The budget is already stretched thin", "type": "starting" },
		{ "id": "s3", "label": "Green space lowers summer temperatures", "type": "statement" },
		{ "id": "s4", "label": "Maintenance costs keep growing every year", "type": "statement" },
		{ "id": "s5", "label": "Volunteers could take over the upkeep", "type": "statement" },
		{ "id": "s6", "label": "Volunteer groups rarely last", "type": "statement" },
		{ "id": "s7", "label": "Property values nearby would rise", "type": "statement" }
	],
	"links": [
		{ "source": "s1", "target": "topic", "type": "starting" },
		{ "source": "s2", "target": "topic", "type": "starting" },
		{ "source": "s3", "target": "s1", "type": "support" },
		{ "source": "s4", "target": "s2", "type": "support" },
		{ "source": "s5", "target": "s4", "type": "attack" },
		{ "source": "s6", "target": "s5", "type": "undercut" },
		{ "source": "s7", "target": "s1", "type": "support" }
	]
}"#;

fn discussion() -> GraphData {
	serde_json::from_str(DISCUSSION).unwrap_or_else(|err| {
		error!("Bundled discussion is malformed: {err}");
		GraphData::default()
	})
}

/// Generates a deterministic argument tree hanging off one agenda node.
fn generate_sample_data(n: usize) -> GraphData {
	const RELATIONS: [&str; 3] = ["support", "attack", "undercut"];

	let mut nodes = vec![GraphNode {
		id: "0".into(),
		label: Some("What should we discuss?".into()),
		kind: Some("agenda".into()),
		group: None,
	}];
	nodes.extend((1..n).map(|i| GraphNode {
		id: i.to_string(),
		label: (i < 10).then(|| format!("Statement {i}")),
		kind: Some(if i < 4 { "starting" } else { "statement" }.into()),
		group: Some((i % 10) as u32),
	}));

	let links: Vec<GraphLink> = (1..n)
		.map(|i| {
			let target = if i < 4 {
				0
			} else {
				1 + (rand_simple(i) * (i - 1) as f64) as usize
			};
			let kind = if target == 0 {
				"starting"
			} else {
				RELATIONS[i % 3]
			};
			GraphLink {
				source: i.to_string(),
				target: target.to_string(),
				kind: Some(kind.into()),
			}
		})
		.collect();

	GraphData { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (generated, set_generated) = signal(false);
	let graph_data = Signal::derive(move || {
		if generated.get() {
			generate_sample_data(60)
		} else {
			discussion()
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data fullscreen=true text_wrap=Some(24) />
				<div class="graph-overlay">
					<h1>"Argument Graph"</h1>
					<p class="subtitle">
						"Hover a statement to focus its neighbours. "
						"Drag to reposition. Scroll to zoom."
					</p>
					<button on:click=move |_| set_generated.update(|g| *g = !*g)>
						{move || {
							if generated.get() { "Show discussion" } else { "Show generated tree" }
						}}
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
