use crate::core::types::PixelPoint;
use crate::error::{SankeyError, SankeyResult};
use crate::interaction::{ElementRef, InteractionOutcome};
use crate::labels::TooltipSettings;
use crate::render::Renderer;

use super::SankeyChart;
use super::invalidation::InvalidationTopic;

impl<R: Renderer> SankeyChart<R> {
    #[must_use]
    pub fn tooltip_settings(&self) -> &TooltipSettings {
        &self.tooltip
    }

    pub fn set_tooltip_settings(&mut self, tooltip: TooltipSettings) {
        self.tooltip = tooltip;
    }

    /// Element under `(x, y)`, if any.
    pub fn hit_test(&mut self, x: f64, y: f64) -> SankeyResult<Option<ElementRef>> {
        self.compute()?;
        Ok(self
            .layout
            .as_ref()
            .and_then(|layout| self.interaction.hit_test(layout, PixelPoint::new(x, y))))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> SankeyResult<InteractionOutcome> {
        self.compute()?;
        let (Some(graph), Some(layout)) = (self.graph.as_ref(), self.layout.as_ref()) else {
            return Ok(InteractionOutcome::default());
        };
        let outcome =
            self.interaction
                .pointer_move(graph, layout, PixelPoint::new(x, y), &self.tooltip);
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    pub fn pointer_leave(&mut self) -> SankeyResult<InteractionOutcome> {
        self.compute()?;
        let Some(graph) = self.graph.as_ref() else {
            return Ok(InteractionOutcome::default());
        };
        let outcome = self.interaction.pointer_leave(graph);
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    pub fn hover(&mut self, element: ElementRef) -> SankeyResult<InteractionOutcome> {
        self.compute()?;
        self.check_element(element)?;
        let Some(graph) = self.graph.as_ref() else {
            return Ok(InteractionOutcome::default());
        };
        let outcome = self.interaction.hover(graph, element, &self.tooltip);
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    pub fn out(&mut self, element: ElementRef) -> SankeyResult<InteractionOutcome> {
        self.compute()?;
        self.check_element(element)?;
        let Some(graph) = self.graph.as_ref() else {
            return Ok(InteractionOutcome::default());
        };
        let outcome = self.interaction.out(graph, element);
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    pub fn select(&mut self, element: ElementRef) -> SankeyResult<InteractionOutcome> {
        self.compute()?;
        self.check_element(element)?;
        let outcome = self.interaction.select(element);
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    pub fn clear_selection(&mut self) -> InteractionOutcome {
        let outcome = self.interaction.clear_selection();
        self.apply_outcome(&outcome);
        outcome
    }

    fn check_element(&self, element: ElementRef) -> SankeyResult<()> {
        if self
            .graph
            .as_ref()
            .is_some_and(|graph| element.resolves_in(graph))
        {
            Ok(())
        } else {
            Err(SankeyError::InvalidData(format!(
                "element {element:?} does not exist in the current data"
            )))
        }
    }

    fn apply_outcome(&mut self, outcome: &InteractionOutcome) {
        if outcome.changes.is_empty() {
            return;
        }
        let elements: Vec<ElementRef> = outcome
            .changes
            .iter()
            .map(|change| change.element)
            .collect();
        self.refresh_appearance(&elements);
        if elements
            .iter()
            .any(|element| matches!(element, ElementRef::Node(_)))
        {
            self.invalidate(InvalidationTopic::FlowLabels);
        }
    }
}
