use crate::core::graph::{FlowIndex, NodeIndex, SankeyGraph};
use crate::error::SankeyResult;
use crate::interaction::{ElementRef, SankeyInteraction};
use crate::render::{Fill, Renderer, Stroke};
use crate::style::{
    ColorContext, ElementStyle, Palette, PointState, SankeyTheme, resolve_fill, resolve_stroke,
};

use super::SankeyChart;
use super::invalidation::InvalidationTopic;

/// Fill and stroke an element is currently painted with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAppearance {
    pub state: PointState,
    pub fill: Fill,
    pub stroke: Stroke,
}

/// Builds the resolver context for `element`.
#[must_use]
pub fn color_context(graph: &SankeyGraph, palette: &Palette, element: ElementRef) -> ColorContext {
    match element {
        ElementRef::Node(index) => {
            let node = graph.node(index);
            ColorContext::Node {
                id: node.id,
                name: node.name.clone(),
                source_color: palette.item_at(node.id),
                conflict: node.conflict,
            }
        }
        ElementRef::Flow(index) | ElementRef::Dropoff(index) => {
            let flow = graph.flow(index);
            let from = graph.node(flow.from);
            let source_color = palette.item_at(from.id);
            match flow.to {
                Some(to) => ColorContext::Flow {
                    from: from.name.clone(),
                    to: graph.node(to).name.clone(),
                    source_color,
                },
                None => ColorContext::Dropoff {
                    from: from.name.clone(),
                    source_color,
                },
            }
        }
    }
}

/// Styles consulted for each element kind, user overrides first.
pub(super) struct StyleSet<'a> {
    palette: &'a Palette,
    theme: &'a SankeyTheme,
    node: &'a ElementStyle,
    flow: &'a ElementStyle,
    dropoff: &'a ElementStyle,
}

impl StyleSet<'_> {
    fn resolve(&self, graph: &SankeyGraph, element: ElementRef, state: PointState) -> ResolvedAppearance {
        let (user, theme) = match element {
            ElementRef::Node(_) => (self.node, &self.theme.node),
            ElementRef::Flow(_) => (self.flow, &self.theme.flow),
            ElementRef::Dropoff(_) => (self.dropoff, &self.theme.dropoff),
        };
        let context = color_context(graph, self.palette, element);
        ResolvedAppearance {
            state,
            fill: resolve_fill(user, theme, state, &context),
            stroke: resolve_stroke(user, theme, state, &context),
        }
    }
}

/// Resolved appearance for every node and flow, indexed by arena position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppearanceCache {
    nodes: Vec<ResolvedAppearance>,
    flows: Vec<ResolvedAppearance>,
}

impl AppearanceCache {
    pub(super) fn build(
        graph: &SankeyGraph,
        palette: &Palette,
        theme: &SankeyTheme,
        [node, flow, dropoff]: [&ElementStyle; 3],
        interaction: &SankeyInteraction,
    ) -> Self {
        let styles = StyleSet {
            palette,
            theme,
            node,
            flow,
            dropoff,
        };
        let nodes = (0..graph.nodes().len())
            .map(|index| {
                let element = ElementRef::Node(NodeIndex::new(index));
                styles.resolve(graph, element, interaction.state_of(element))
            })
            .collect();
        let flows = graph
            .flows()
            .iter()
            .enumerate()
            .map(|(index, flow)| {
                let index = FlowIndex::new(index);
                let element = if flow.is_dropoff() {
                    ElementRef::Dropoff(index)
                } else {
                    ElementRef::Flow(index)
                };
                styles.resolve(graph, element, interaction.state_of(element))
            })
            .collect();
        Self { nodes, flows }
    }

    #[must_use]
    pub fn get(&self, element: ElementRef) -> Option<&ResolvedAppearance> {
        match element {
            ElementRef::Node(index) => self.nodes.get(index.get()),
            ElementRef::Flow(index) | ElementRef::Dropoff(index) => self.flows.get(index.get()),
        }
    }

    fn slot_mut(&mut self, element: ElementRef) -> Option<&mut ResolvedAppearance> {
        match element {
            ElementRef::Node(index) => self.nodes.get_mut(index.get()),
            ElementRef::Flow(index) | ElementRef::Dropoff(index) => {
                self.flows.get_mut(index.get())
            }
        }
    }
}

impl<R: Renderer> SankeyChart<R> {
    pub(super) fn style_set(&self) -> StyleSet<'_> {
        StyleSet {
            palette: &self.palette,
            theme: &self.theme,
            node: &self.node_style,
            flow: &self.flow_style,
            dropoff: &self.dropoff_style,
        }
    }

    /// Re-resolves only the listed elements after a state change.
    pub(super) fn refresh_appearance(&mut self, elements: &[ElementRef]) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        let resolved: Vec<(ElementRef, ResolvedAppearance)> = {
            let styles = self.style_set();
            elements
                .iter()
                .map(|element| {
                    let state = self.interaction.state_of(*element);
                    (*element, styles.resolve(graph, *element, state))
                })
                .collect()
        };
        if let Some(cache) = self.appearance.as_mut() {
            for (element, appearance) in resolved {
                if let Some(slot) = cache.slot_mut(element) {
                    *slot = appearance;
                }
            }
        }
        self.invalidate(InvalidationTopic::Appearance);
    }

    fn restyle(&mut self) {
        self.appearance = None;
        self.invalidate(InvalidationTopic::Appearance);
    }

    /// Current appearance of `element`, computing stale stages first.
    pub fn appearance_of(&mut self, element: ElementRef) -> SankeyResult<Option<ResolvedAppearance>> {
        self.compute()?;
        if !self
            .graph
            .as_ref()
            .is_some_and(|graph| element.resolves_in(graph))
        {
            return Ok(None);
        }
        Ok(self
            .appearance
            .as_ref()
            .and_then(|cache| cache.get(element))
            .cloned())
    }

    #[must_use]
    pub fn node_style(&self) -> &ElementStyle {
        &self.node_style
    }

    pub fn set_node_style(&mut self, style: ElementStyle) {
        self.node_style = style;
        self.restyle();
    }

    #[must_use]
    pub fn flow_style(&self) -> &ElementStyle {
        &self.flow_style
    }

    pub fn set_flow_style(&mut self, style: ElementStyle) {
        self.flow_style = style;
        self.restyle();
    }

    #[must_use]
    pub fn dropoff_style(&self) -> &ElementStyle {
        &self.dropoff_style
    }

    pub fn set_dropoff_style(&mut self, style: ElementStyle) {
        self.dropoff_style = style;
        self.restyle();
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) -> SankeyResult<()> {
        palette.validate()?;
        self.palette = palette;
        self.restyle();
        Ok(())
    }

    #[must_use]
    pub fn theme(&self) -> &SankeyTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: SankeyTheme) {
        self.theme = theme;
        self.restyle();
    }
}
