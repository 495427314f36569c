//! Pointer hit-testing and hover/select state for diagram elements.
//!
//! State changes never touch geometry; callers repaint the elements listed
//! in the returned changes.

use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::graph::{FlowIndex, NodeIndex, SankeyGraph};
use crate::core::layout::SankeyLayout;
use crate::core::types::PixelPoint;
use crate::labels::{LabelContext, Tooltip, TooltipSettings};
use crate::style::{ElementKind, PointState};

/// Tolerance added around every element during hit-testing.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 0.5;

/// Handle to a drawable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum ElementRef {
    Node(NodeIndex),
    Flow(FlowIndex),
    Dropoff(FlowIndex),
}

impl ElementRef {
    #[must_use]
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Flow(_) => ElementKind::Flow,
            Self::Dropoff(_) => ElementKind::Dropoff,
        }
    }

    /// Whether this handle names an element of `graph` with a matching kind.
    ///
    /// Handles go stale when the data changes; a stale one may point past
    /// the arena or at a link where a drop-off was.
    #[must_use]
    pub fn resolves_in(self, graph: &SankeyGraph) -> bool {
        match self {
            Self::Node(node) => node.get() < graph.nodes().len(),
            Self::Flow(flow) => graph
                .flows()
                .get(flow.get())
                .is_some_and(|flow| !flow.is_dropoff()),
            Self::Dropoff(flow) => graph
                .flows()
                .get(flow.get())
                .is_some_and(|flow| flow.is_dropoff()),
        }
    }

    /// Text context used by tooltips for this element.
    #[must_use]
    pub fn label_context(self, graph: &SankeyGraph) -> LabelContext {
        match self {
            Self::Node(node) => LabelContext::node(graph.node(node)),
            Self::Flow(flow) | Self::Dropoff(flow) => LabelContext::flow(graph, graph.flow(flow)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub element: ElementRef,
    pub state: PointState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionOutcome {
    pub changes: Vec<StateChange>,
    pub tooltip: Option<Tooltip>,
}

impl InteractionOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.tooltip.is_none()
    }

    fn merge(&mut self, other: Self) {
        self.changes.extend(other.changes);
        if other.tooltip.is_some() {
            self.tooltip = other.tooltip;
        }
    }
}

/// Elements that change state together with `element` on hover.
///
/// A node brings its incoming and outgoing ribbons, a ribbon brings both
/// endpoint nodes, a drop-off stands alone.
#[must_use]
pub fn related_elements(graph: &SankeyGraph, element: ElementRef) -> Vec<ElementRef> {
    let mut related = vec![element];
    match element {
        ElementRef::Node(node) => {
            let node = graph.node(node);
            related.extend(node.income.iter().copied().map(ElementRef::Flow));
            related.extend(node.outcome.iter().copied().map(ElementRef::Flow));
        }
        ElementRef::Flow(flow) => {
            let flow = graph.flow(flow);
            related.push(ElementRef::Node(flow.from));
            if let Some(to) = flow.to {
                related.push(ElementRef::Node(to));
            }
        }
        ElementRef::Dropoff(_) => {}
    }
    related
}

/// Hover and selection bookkeeping for one diagram.
///
/// A selected element keeps the selected state while hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyInteraction {
    hovered: Option<ElementRef>,
    hover_marks: IndexSet<ElementRef>,
    selected: IndexSet<ElementRef>,
    hit_tolerance: f64,
}

impl Default for SankeyInteraction {
    fn default() -> Self {
        Self {
            hovered: None,
            hover_marks: IndexSet::new(),
            selected: IndexSet::new(),
            hit_tolerance: DEFAULT_HIT_TOLERANCE_PX,
        }
    }
}

impl SankeyInteraction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hit_tolerance(mut self, tolerance: f64) -> Self {
        self.hit_tolerance = tolerance.max(0.0);
        self
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ElementRef> {
        self.hovered
    }

    /// Node under the pointer, used to move its flow labels.
    #[must_use]
    pub fn hovered_node(&self) -> Option<NodeIndex> {
        match self.hovered {
            Some(ElementRef::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.selected.iter().copied()
    }

    #[must_use]
    pub fn state_of(&self, element: ElementRef) -> PointState {
        if self.selected.contains(&element) {
            PointState::Selected
        } else if self.hover_marks.contains(&element) {
            PointState::Hovered
        } else {
            PointState::Normal
        }
    }

    /// Topmost element under `point`.
    ///
    /// Nodes are painted above ribbons and stubs so they win; among several
    /// ribbons the one whose centerline is nearest wins.
    #[must_use]
    pub fn hit_test(&self, layout: &SankeyLayout, point: PixelPoint) -> Option<ElementRef> {
        let tolerance = self.hit_tolerance;
        if let Some(node) = layout
            .nodes
            .iter()
            .filter(|geometry| geometry.rect.contains(point, tolerance))
            .min_by_key(|geometry| {
                let center = geometry.center();
                OrderedFloat((center.x - point.x).hypot(center.y - point.y))
            })
        {
            return Some(ElementRef::Node(node.node));
        }

        let mut candidates: SmallVec<[(OrderedFloat<f64>, ElementRef); 4]> = SmallVec::new();
        for geometry in &layout.flows {
            let Some((top, bottom)) = geometry.span_at(point.x) else {
                continue;
            };
            if point.y >= top - tolerance && point.y <= bottom + tolerance {
                let distance = (point.y - (top + bottom) / 2.0).abs();
                candidates.push((OrderedFloat(distance), ElementRef::Flow(geometry.flow)));
            }
        }
        for geometry in &layout.dropoffs {
            if geometry.contains(point, tolerance) {
                let middle = (geometry.y1 + geometry.y2) / 2.0;
                candidates.push((
                    OrderedFloat((point.y - middle).abs()),
                    ElementRef::Dropoff(geometry.flow),
                ));
            }
        }

        candidates
            .into_iter()
            .min_by_key(|item| item.0)
            .map(|(_, element)| element)
    }

    /// Marks `element` and its related elements hovered.
    pub fn hover(
        &mut self,
        graph: &SankeyGraph,
        element: ElementRef,
        tooltip: &TooltipSettings,
    ) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if !element.resolves_in(graph) {
            return outcome;
        }
        if let Some(previous) = self.hovered.filter(|previous| *previous != element) {
            outcome.merge(self.out(graph, previous));
        }

        self.hovered = Some(element);
        for related in related_elements(graph, element) {
            if self.hover_marks.insert(related) {
                outcome.changes.push(StateChange {
                    element: related,
                    state: self.state_of(related),
                });
            }
        }
        outcome.tooltip = Some(tooltip.render(&element.label_context(graph)));
        trace!(?element, changes = outcome.changes.len(), "sankey hover");
        outcome
    }

    /// Restores everything `hover(element)` marked.
    pub fn out(&mut self, graph: &SankeyGraph, element: ElementRef) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if self.hovered != Some(element) || !element.resolves_in(graph) {
            return outcome;
        }
        self.hovered = None;
        for related in related_elements(graph, element) {
            if self.hover_marks.shift_remove(&related) {
                outcome.changes.push(StateChange {
                    element: related,
                    state: self.state_of(related),
                });
            }
        }
        outcome
    }

    /// Hit-tests `point` and hovers or unhovers accordingly.
    pub fn pointer_move(
        &mut self,
        graph: &SankeyGraph,
        layout: &SankeyLayout,
        point: PixelPoint,
        tooltip: &TooltipSettings,
    ) -> InteractionOutcome {
        match (self.hit_test(layout, point), self.hovered) {
            (Some(hit), Some(current)) if hit == current => InteractionOutcome {
                changes: Vec::new(),
                tooltip: Some(tooltip.render(&hit.label_context(graph))),
            },
            (Some(hit), _) => self.hover(graph, hit, tooltip),
            (None, Some(current)) => self.out(graph, current),
            (None, None) => InteractionOutcome::default(),
        }
    }

    pub fn pointer_leave(&mut self, graph: &SankeyGraph) -> InteractionOutcome {
        match self.hovered {
            Some(current) => self.out(graph, current),
            None => InteractionOutcome::default(),
        }
    }

    /// Toggles the selection of `element`.
    pub fn select(&mut self, element: ElementRef) -> InteractionOutcome {
        if !self.selected.shift_remove(&element) {
            self.selected.insert(element);
        }
        InteractionOutcome {
            changes: vec![StateChange {
                element,
                state: self.state_of(element),
            }],
            tooltip: None,
        }
    }

    pub fn clear_selection(&mut self) -> InteractionOutcome {
        let cleared: Vec<ElementRef> = self.selected.drain(..).collect();
        InteractionOutcome {
            changes: cleared
                .into_iter()
                .map(|element| StateChange {
                    element,
                    state: self.state_of(element),
                })
                .collect(),
            tooltip: None,
        }
    }

    /// Drops all state; element handles are invalid after a data change.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.hover_marks.clear();
        self.selected.clear();
    }
}
