//! sankey-rs: deterministic Sankey diagram layout.
//!
//! Rows of `(from, to, weight)` become a leveled flow graph, the graph becomes
//! pixel geometry, and geometry becomes a backend-agnostic [`render::RenderFrame`].
//! [`SankeyChart`] ties the stages together and recomputes only what changed.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod labels;
pub mod render;
pub mod style;
pub mod telemetry;

pub use api::{SankeyChart, SankeyConfig};
pub use core::{SankeyGraph, SankeyLayout, build_graph, compute_layout};
pub use error::{SankeyError, SankeyResult};
