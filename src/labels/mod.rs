//! Label anchors and label/tooltip text derived from layout geometry.

mod format;

use serde::{Deserialize, Serialize};

use crate::core::graph::{NodeIndex, SankeyGraph};
use crate::core::layout::{DropoffGeometry, FlowGeometry, NodeGeometry, SankeyLayout};
use crate::core::types::PixelPoint;
use crate::interaction::ElementRef;
use crate::render::{Color, TextAnchor};

pub use format::{LabelContext, TokenFormatter, format_value};

/// `#212121`, kept on exact byte steps so it survives a hex round trip.
const DEFAULT_LABEL_COLOR: Color = Color::rgb(33.0 / 255.0, 33.0 / 255.0, 33.0 / 255.0);

/// Text settings for one element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSettings {
    pub enabled: bool,
    pub format: TokenFormatter,
    pub font_size_px: f64,
    pub color: Color,
}

impl LabelSettings {
    #[must_use]
    pub fn new(enabled: bool, format: &str) -> Self {
        Self {
            enabled,
            format: TokenFormatter::new(format),
            font_size_px: 11.0,
            color: DEFAULT_LABEL_COLOR,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = TokenFormatter::new(format);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsConfig {
    #[serde(default = "default_node_labels")]
    pub node: LabelSettings,
    #[serde(default = "default_flow_labels")]
    pub flow: LabelSettings,
    #[serde(default = "default_dropoff_labels")]
    pub dropoff: LabelSettings,
}

fn default_node_labels() -> LabelSettings {
    LabelSettings::new(true, "{%name}")
}

fn default_flow_labels() -> LabelSettings {
    LabelSettings::new(false, "{%value}")
}

fn default_dropoff_labels() -> LabelSettings {
    LabelSettings::new(false, "{%value}")
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            node: default_node_labels(),
            flow: default_flow_labels(),
            dropoff: default_dropoff_labels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipSettings {
    #[serde(default = "default_title_format")]
    pub title_format: TokenFormatter,
    #[serde(default = "default_body_format")]
    pub format: TokenFormatter,
}

fn default_title_format() -> TokenFormatter {
    TokenFormatter::new("{%name}")
}

fn default_body_format() -> TokenFormatter {
    TokenFormatter::new("{%value}")
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            title_format: default_title_format(),
            format: default_body_format(),
        }
    }
}

impl TooltipSettings {
    #[must_use]
    pub fn render(&self, context: &LabelContext) -> Tooltip {
        Tooltip {
            title: self.title_format.format(context),
            body: self.format.format(context),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    pub title: String,
    pub body: String,
}

/// Where a flow label sits relative to the hovered node, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowLabelFocus {
    #[default]
    Centered,
    /// The flow enters the hovered node.
    Income,
    /// The flow leaves the hovered node.
    Outcome,
}

impl FlowLabelFocus {
    #[must_use]
    pub fn for_flow(flow: &FlowGeometry, hovered_node: Option<NodeIndex>) -> Self {
        match hovered_node {
            Some(node) if flow.to == node => Self::Income,
            Some(node) if flow.from == node => Self::Outcome,
            _ => Self::Centered,
        }
    }
}

#[must_use]
pub fn node_label_anchor(geometry: &NodeGeometry) -> (PixelPoint, TextAnchor) {
    (geometry.center(), TextAnchor::Center)
}

#[must_use]
pub fn flow_label_anchor(geometry: &FlowGeometry, focus: FlowLabelFocus) -> (PixelPoint, TextAnchor) {
    match focus {
        FlowLabelFocus::Centered => (
            PixelPoint::new((geometry.left + geometry.right) / 2.0, geometry.top_center),
            TextAnchor::CenterBottom,
        ),
        FlowLabelFocus::Income => (geometry.left_top, TextAnchor::LeftBottom),
        FlowLabelFocus::Outcome => (geometry.right_top, TextAnchor::RightBottom),
    }
}

#[must_use]
pub fn dropoff_label_anchor(geometry: &DropoffGeometry) -> (PixelPoint, TextAnchor) {
    (geometry.right_anchor, TextAnchor::LeftCenter)
}

/// One positioned label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub element: ElementRef,
    pub text: String,
    pub position: PixelPoint,
    pub anchor: TextAnchor,
    pub font_size_px: f64,
    pub color: Color,
}

/// Positions every enabled label; empty texts are skipped.
#[must_use]
pub fn place_labels(
    graph: &SankeyGraph,
    layout: &SankeyLayout,
    config: &LabelsConfig,
    hovered_node: Option<NodeIndex>,
) -> Vec<LabelPlacement> {
    let mut out = Vec::new();
    let mut push = |settings: &LabelSettings,
                    element: ElementRef,
                    context: LabelContext,
                    (position, anchor): (PixelPoint, TextAnchor)| {
        let text = settings.format.format(&context);
        if text.is_empty() {
            return;
        }
        out.push(LabelPlacement {
            element,
            text,
            position,
            anchor,
            font_size_px: settings.font_size_px,
            color: settings.color,
        });
    };

    if config.node.enabled {
        for geometry in &layout.nodes {
            push(
                &config.node,
                ElementRef::Node(geometry.node),
                LabelContext::node(graph.node(geometry.node)),
                node_label_anchor(geometry),
            );
        }
    }
    if config.flow.enabled {
        for geometry in &layout.flows {
            let focus = FlowLabelFocus::for_flow(geometry, hovered_node);
            push(
                &config.flow,
                ElementRef::Flow(geometry.flow),
                LabelContext::flow(graph, graph.flow(geometry.flow)),
                flow_label_anchor(geometry, focus),
            );
        }
    }
    if config.dropoff.enabled {
        for geometry in &layout.dropoffs {
            push(
                &config.dropoff,
                ElementRef::Dropoff(geometry.flow),
                LabelContext::flow(graph, graph.flow(geometry.flow)),
                dropoff_label_anchor(geometry),
            );
        }
    }
    out
}
