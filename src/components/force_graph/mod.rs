//! Force-directed argument graph: a primary layout simulation, a label
//! satellite simulation, hover focus and drag-to-pin.

mod adjacency;
mod component;
mod error;
mod geometry;
mod highlight;
mod interaction;
mod labels;
mod palette;
mod render;
mod simulation;
mod state;
mod types;

pub use adjacency::Adjacency;
pub use component::ForceGraphCanvas;
pub use error::GraphError;
pub use geometry::{LABEL_SHIFT_Y, label_shift_x, sanitize};
pub use highlight::{DIMMED_OPACITY, Highlight};
pub use interaction::{DragState, MAX_ZOOM, MIN_ZOOM};
pub use labels::{LabelCarrier, LabelModel, LabelOffsetStrategy, wrap_text};
pub use palette::{NodeShape, Palette};
pub use render::{CanvasSurface, NoMeasure, RenderSurface, TextMeasure, render};
pub use simulation::{Body, Simulation, SimulationConfig};
pub use state::{Edge, GraphEngine, NodeInfo, Scene, Segment, ViewTransform};
pub use types::{GraphData, GraphLink, GraphNode, LayoutParams};
