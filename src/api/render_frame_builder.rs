use tracing::trace;

use crate::error::SankeyResult;
use crate::interaction::ElementRef;
use crate::labels::{LabelsConfig, place_labels};
use crate::render::{PathPrimitive, RenderFrame, Renderer, TextPrimitive};

use super::SankeyChart;
use super::invalidation::InvalidationTopic;

/// Ribbons and stubs paint beneath nodes.
pub const FLOW_Z_INDEX: i32 = 1;
pub const NODE_Z_INDEX: i32 = 2;

impl<R: Renderer> SankeyChart<R> {
    #[must_use]
    pub fn labels(&self) -> &LabelsConfig {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: LabelsConfig) {
        self.labels = labels;
        self.invalidate(InvalidationTopic::NodeLabels);
        self.invalidate(InvalidationTopic::FlowLabels);
    }

    /// Materializes the current diagram into a backend-agnostic frame.
    pub fn build_render_frame(&mut self) -> SankeyResult<RenderFrame> {
        self.compute()?;
        let mut frame = RenderFrame::new(self.bounds);
        let (Some(graph), Some(layout), Some(appearance)) = (
            self.graph.as_ref(),
            self.layout.as_ref(),
            self.appearance.as_ref(),
        ) else {
            return Ok(frame);
        };

        for geometry in &layout.flows {
            if let Some(style) = appearance.get(ElementRef::Flow(geometry.flow)) {
                frame.paths.push(PathPrimitive::new(
                    geometry.path.clone(),
                    style.fill.clone(),
                    style.stroke,
                    FLOW_Z_INDEX,
                ));
            }
        }
        for geometry in &layout.dropoffs {
            if let Some(style) = appearance.get(ElementRef::Dropoff(geometry.flow)) {
                frame.paths.push(PathPrimitive::new(
                    geometry.path.clone(),
                    style.fill.clone(),
                    style.stroke,
                    FLOW_Z_INDEX,
                ));
            }
        }
        for geometry in &layout.nodes {
            if let Some(style) = appearance.get(ElementRef::Node(geometry.node)) {
                frame.paths.push(PathPrimitive::new(
                    geometry.path.clone(),
                    style.fill.clone(),
                    style.stroke,
                    NODE_Z_INDEX,
                ));
            }
        }

        for label in place_labels(graph, layout, &self.labels, self.interaction.hovered_node()) {
            frame.texts.push(TextPrimitive::new(
                label.text,
                label.position.x,
                label.position.y,
                label.font_size_px,
                label.color,
                label.anchor,
            ));
        }

        self.stats.frames_built += 1;
        trace!(
            paths = frame.paths.len(),
            texts = frame.texts.len(),
            "sankey frame built"
        );
        Ok(frame)
    }

    pub fn render(&mut self) -> SankeyResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)?;
        self.clear_pending_invalidation();
        Ok(())
    }
}
