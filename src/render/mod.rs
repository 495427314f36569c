mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, Fill, GradientKey, LinearGradient, PathPrimitive, Stroke, TextAnchor, TextPrimitive,
};

use crate::error::SankeyResult;

/// Drawing surface the diagram is handed to.
///
/// Backends receive a fully materialized frame; they never see the graph or
/// the interaction state.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> SankeyResult<()>;
}
