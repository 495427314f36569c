use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::core::graph::{FlowIndex, NodeIndex, SankeyGraph};
use crate::core::path::{PathData, cubic_point};
use crate::core::types::{PixelPoint, Rect, apply_pixel_shift};
use crate::error::{SankeyError, SankeyResult};

/// Drop-off stubs extend below their node by this share of the node width.
pub const DROPOFF_PADDING_RATIO: f64 = 0.3;

/// Widest node, as a share of its column, that still leaves room for a
/// drop-off stub (`node_width / 4`) right of the node inside the column.
pub const MAX_DROPOFF_NODE_SHARE: f64 = 2.0 / 3.0;

const RIBBON_SAMPLES: usize = 24;

/// Node width, absolute or relative to the column width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeWidth {
    Pixels(f64),
    Percent(f64),
}

impl Default for NodeWidth {
    fn default() -> Self {
        Self::Percent(12.0)
    }
}

impl NodeWidth {
    #[must_use]
    pub fn resolve(self, column_width: f64) -> f64 {
        match self {
            Self::Pixels(pixels) => pixels,
            Self::Percent(percent) => column_width * percent / 100.0,
        }
    }

    pub fn validate(self) -> SankeyResult<()> {
        let ok = match self {
            Self::Pixels(pixels) => pixels.is_finite() && pixels >= 0.0,
            Self::Percent(percent) => percent.is_finite() && (0.0..=100.0).contains(&percent),
        };
        if ok {
            Ok(())
        } else {
            Err(SankeyError::InvalidOption(format!(
                "node width `{self}` must be a non-negative pixel value or a percent in [0, 100]"
            )))
        }
    }
}

impl fmt::Display for NodeWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(pixels) => write!(f, "{pixels}"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

impl FromStr for NodeWidth {
    type Err = SankeyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let parse = |number: &str| {
            number.trim().parse::<f64>().map_err(|_| {
                SankeyError::InvalidOption(format!("node width `{text}` is not a number"))
            })
        };
        match text.strip_suffix('%') {
            Some(percent) => parse(percent).map(Self::Percent),
            None => parse(text).map(Self::Pixels),
        }
    }
}

impl Serialize for NodeWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Pixels(pixels) => serializer.serialize_f64(*pixels),
            Self::Percent(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for NodeWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(pixels) => Ok(Self::Pixels(pixels)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    #[serde(default)]
    pub node_width: NodeWidth,
    #[serde(default = "default_node_padding")]
    pub node_padding: f64,
    #[serde(default = "default_curve_factor")]
    pub curve_factor: f64,
}

fn default_node_padding() -> f64 {
    20.0
}

fn default_curve_factor() -> f64 {
    0.33
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: NodeWidth::default(),
            node_padding: default_node_padding(),
            curve_factor: default_curve_factor(),
        }
    }
}

impl LayoutOptions {
    #[must_use]
    pub fn with_node_width(mut self, node_width: NodeWidth) -> Self {
        self.node_width = node_width;
        self
    }

    #[must_use]
    pub fn with_node_padding(mut self, node_padding: f64) -> Self {
        self.node_padding = node_padding;
        self
    }

    #[must_use]
    pub fn with_curve_factor(mut self, curve_factor: f64) -> Self {
        self.curve_factor = curve_factor;
        self
    }

    pub fn validate(self) -> SankeyResult<()> {
        self.node_width.validate()?;
        if !self.node_padding.is_finite() || self.node_padding < 0.0 {
            return Err(SankeyError::InvalidOption(
                "node padding must be finite and >= 0".to_owned(),
            ));
        }
        if !self.curve_factor.is_finite() || !(0.0..=1.0).contains(&self.curve_factor) {
            return Err(SankeyError::InvalidOption(
                "curve factor must be finite and in [0, 1]".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Vertical slice of a node edge where one flow attaches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub flow: FlowIndex,
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub node: NodeIndex,
    pub id: usize,
    pub level: usize,
    pub rect: Rect,
    /// Incoming attachments on the left edge, ordered by source id.
    pub income: Vec<EdgeSegment>,
    /// Outgoing attachments on the right edge, ordered by target id.
    pub outcome: Vec<EdgeSegment>,
    pub path: PathData,
}

impl NodeGeometry {
    #[must_use]
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            self.rect.left + self.rect.width / 2.0,
            self.rect.top + self.rect.height / 2.0,
        )
    }
}

/// Ribbon between two nodes plus the anchor points labels use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowGeometry {
    pub flow: FlowIndex,
    pub data_index: usize,
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub top_center: f64,
    pub bottom_center: f64,
    pub left_top: PixelPoint,
    pub right_top: PixelPoint,
    pub right_bottom: PixelPoint,
    pub left_bottom: PixelPoint,
    pub curvy: f64,
    pub path: PathData,
}

impl FlowGeometry {
    /// Vertical extent of the ribbon at `x`, or `None` outside its span.
    #[must_use]
    pub fn span_at(&self, x: f64) -> Option<(f64, f64)> {
        if x < self.left || x > self.right {
            return None;
        }
        let upper = sample_curve_y(
            self.left_top,
            PixelPoint::new(self.left_top.x + self.curvy, self.left_top.y),
            PixelPoint::new(self.right_top.x - self.curvy, self.right_top.y),
            self.right_top,
            x,
        )?;
        let lower = sample_curve_y(
            self.left_bottom,
            PixelPoint::new(self.left_bottom.x + self.curvy, self.left_bottom.y),
            PixelPoint::new(self.right_bottom.x - self.curvy, self.right_bottom.y),
            self.right_bottom,
            x,
        )?;
        Some((upper.min(lower), upper.max(lower)))
    }

    #[must_use]
    pub fn contains(&self, point: PixelPoint, tolerance: f64) -> bool {
        self.span_at(point.x).is_some_and(|(top, bottom)| {
            point.y >= top - tolerance && point.y <= bottom + tolerance
        })
    }
}

/// Interpolates `y` on a sampled cubic for a given `x`.
fn sample_curve_y(p0: PixelPoint, c1: PixelPoint, c2: PixelPoint, p1: PixelPoint, x: f64) -> Option<f64> {
    if (p1.x - p0.x).abs() <= f64::EPSILON {
        return Some(p0.y);
    }
    let mut previous = p0;
    for step in 1..=RIBBON_SAMPLES {
        let t = step as f64 / RIBBON_SAMPLES as f64;
        let current = cubic_point(p0, c1, c2, p1, t);
        let (lo, hi) = (previous.x.min(current.x), previous.x.max(current.x));
        if x >= lo && x <= hi {
            let span = current.x - previous.x;
            if span.abs() <= f64::EPSILON {
                return Some(current.y);
            }
            let ratio = (x - previous.x) / span;
            return Some(previous.y + (current.y - previous.y) * ratio);
        }
        previous = current;
    }
    None
}

/// Stub drawn under a node for one drop-off flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoffGeometry {
    pub flow: FlowIndex,
    pub data_index: usize,
    pub from: NodeIndex,
    pub left: f64,
    pub right: f64,
    pub y1: f64,
    pub y2: f64,
    pub radius: f64,
    /// Right end of the stub at the node bottom, where the label sits.
    pub right_anchor: PixelPoint,
    pub path: PathData,
}

impl DropoffGeometry {
    #[must_use]
    pub fn contains(&self, point: PixelPoint, tolerance: f64) -> bool {
        self.path
            .bounding_box()
            .is_some_and(|bbox| bbox.contains(point, tolerance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    pub level: usize,
    pub left: f64,
    pub width: f64,
    /// Unsnapped top of the first node.
    pub top: f64,
    pub height: f64,
    /// Effective gap between nodes after overflow shrinking.
    pub padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLayout {
    pub bounds: Rect,
    pub options: LayoutOptions,
    pub node_width: f64,
    pub column_width: f64,
    pub dropoff_padding: f64,
    pub weight_aspect: f64,
    pub curvy: f64,
    pub levels: Vec<LevelGeometry>,
    /// Node geometry in id order.
    pub nodes: Vec<NodeGeometry>,
    /// Ribbons in flow order.
    pub flows: Vec<FlowGeometry>,
    /// Drop-off stubs in flow order.
    pub dropoffs: Vec<DropoffGeometry>,
}

impl SankeyLayout {
    fn empty(bounds: Rect, options: LayoutOptions) -> Self {
        Self {
            bounds,
            options,
            node_width: 0.0,
            column_width: 0.0,
            dropoff_padding: 0.0,
            weight_aspect: 0.0,
            curvy: 0.0,
            levels: Vec::new(),
            nodes: Vec::new(),
            flows: Vec::new(),
            dropoffs: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node_by_id(&self, id: usize) -> Option<&NodeGeometry> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn node(&self, node: NodeIndex) -> Option<&NodeGeometry> {
        self.nodes.iter().find(|geometry| geometry.node == node)
    }

    #[must_use]
    pub fn flow(&self, flow: FlowIndex) -> Option<&FlowGeometry> {
        self.flows
            .binary_search_by_key(&flow, |geometry| geometry.flow)
            .ok()
            .map(|position| &self.flows[position])
    }

    #[must_use]
    pub fn flow_by_data_index(&self, data_index: usize) -> Option<&FlowGeometry> {
        self.flows
            .iter()
            .find(|geometry| geometry.data_index == data_index)
    }

    #[must_use]
    pub fn dropoff(&self, flow: FlowIndex) -> Option<&DropoffGeometry> {
        self.dropoffs
            .binary_search_by_key(&flow, |geometry| geometry.flow)
            .ok()
            .map(|position| &self.dropoffs[position])
    }

    #[must_use]
    pub fn dropoff_by_data_index(&self, data_index: usize) -> Option<&DropoffGeometry> {
        self.dropoffs
            .iter()
            .find(|geometry| geometry.data_index == data_index)
    }
}

/// Computes pixel geometry for every node, ribbon and drop-off stub.
///
/// Node rects are snapped to the pixel grid; attachment segments and level
/// metrics are not. An empty graph yields an empty layout.
pub fn compute_layout(
    graph: &SankeyGraph,
    bounds: Rect,
    options: LayoutOptions,
) -> SankeyResult<SankeyLayout> {
    bounds.validate()?;
    options.validate()?;

    let summary = graph.levels();
    let level_count = summary.len();
    if level_count == 0 {
        return Ok(SankeyLayout::empty(bounds, options));
    }

    let column_width = bounds.width / level_count as f64;
    let column_share = if graph.dropoffs().next().is_some() {
        MAX_DROPOFF_NODE_SHARE
    } else {
        1.0
    };
    let node_width = options
        .node_width
        .resolve(column_width)
        .min(column_width * column_share);
    let dropoff_padding = node_width * DROPOFF_PADDING_RATIO;
    let allowance = |last: Option<NodeIndex>| {
        last.filter(|index| graph.node(*index).dropoff_value > 0.0)
            .map_or(0.0, |_| dropoff_padding)
    };

    let mut weight_aspect = 0.0_f64;
    if summary.max_level_weight() > 0.0 {
        let dominant_allowance = allowance(
            summary
                .level(summary.max_level())
                .and_then(|level| level.last_node()),
        );
        weight_aspect = (bounds.height
            - summary.max_nodes_count().saturating_sub(1) as f64 * options.node_padding
            - dominant_allowance)
            / summary.max_level_weight();
        for level in summary.levels() {
            if level.weights_sum > 0.0 {
                let fit = (bounds.height - allowance(level.last_node())) / level.weights_sum;
                weight_aspect = weight_aspect.min(fit);
            }
        }
        weight_aspect = weight_aspect.max(0.0);
    }

    let mut levels = Vec::with_capacity(level_count);
    let mut nodes = Vec::with_capacity(graph.nodes().len());
    for (number, level) in summary.levels().iter().enumerate() {
        let column_left = bounds.left + number as f64 * column_width;
        let count = level.nodes.len();
        let pixel_height = level.weights_sum * weight_aspect;
        let level_allowance = allowance(level.last_node());

        let mut padding = options.node_padding;
        let gaps = count.saturating_sub(1) as f64;
        let mut height = gaps * padding + pixel_height + level_allowance;
        if height > bounds.height && count > 1 {
            padding = ((bounds.height - pixel_height - level_allowance) / gaps).max(0.0);
            height = gaps * padding + pixel_height + level_allowance;
        }
        let top = bounds.top + (bounds.height - height) / 2.0;
        levels.push(LevelGeometry {
            level: number,
            left: column_left,
            width: column_width,
            top,
            height,
            padding,
        });

        let mut last_top = top;
        for index in &level.nodes {
            let node = graph.node(*index);
            let raw_left = column_left + (column_width - node_width) / 2.0;
            let raw_bottom = last_top + node.weight * weight_aspect;
            let left = apply_pixel_shift(raw_left, 1);
            let node_top = apply_pixel_shift(last_top, 1);
            let right = apply_pixel_shift(raw_left + node_width, 1);
            let bottom = apply_pixel_shift(raw_bottom, 1);

            let mut income: Vec<(usize, FlowIndex)> = node
                .income
                .iter()
                .map(|flow| (graph.node(graph.flow(*flow).from).id, *flow))
                .collect();
            income.sort_by_key(|(id, _)| *id);
            let mut outcome: Vec<(usize, FlowIndex)> = node
                .outcome
                .iter()
                .filter_map(|flow| {
                    graph
                        .flow(*flow)
                        .to
                        .map(|to| (graph.node(to).id, *flow))
                })
                .collect();
            outcome.sort_by_key(|(id, _)| *id);

            let mut path = PathData::new();
            path.move_to(left, node_top)
                .line_to(right, node_top)
                .line_to(right, bottom)
                .line_to(left, bottom)
                .line_to(left, node_top)
                .close();

            nodes.push(NodeGeometry {
                node: *index,
                id: node.id,
                level: number,
                rect: Rect::new(left, node_top, right - left, bottom - node_top),
                income: stack_segments(graph, &income, left, node_top, weight_aspect),
                outcome: stack_segments(graph, &outcome, right, node_top, weight_aspect),
                path,
            });
            last_top = raw_bottom + padding;
        }
    }

    let curvy = if level_count > 1 {
        options.curve_factor * (bounds.width - node_width) / (level_count - 1) as f64
    } else {
        0.0
    };

    let stub_metrics = StubMetrics {
        node_width,
        dropoff_padding,
        floor: apply_pixel_shift(bounds.bottom(), 1),
    };
    let mut flows = Vec::new();
    let mut dropoffs = Vec::new();
    for (position, flow) in graph.flows().iter().enumerate() {
        let flow_index = FlowIndex::new(position);
        let from_geometry = &nodes[graph.node(flow.from).id];
        match flow.to {
            Some(to) => {
                let to_geometry = &nodes[graph.node(to).id];
                let (Some(start), Some(end)) = (
                    find_segment(&from_geometry.outcome, flow_index),
                    find_segment(&to_geometry.income, flow_index),
                ) else {
                    continue;
                };
                flows.push(ribbon(flow_index, flow.data_index, flow.from, to, start, end, curvy));
            }
            None => {
                let height = graph.node(flow.from).dropoff_value * weight_aspect;
                dropoffs.push(dropoff_stub(
                    flow_index,
                    flow.data_index,
                    flow.from,
                    from_geometry.rect,
                    height,
                    stub_metrics,
                ));
            }
        }
    }

    trace!(
        levels = level_count,
        nodes = nodes.len(),
        flows = flows.len(),
        dropoffs = dropoffs.len(),
        weight_aspect,
        "sankey layout computed"
    );

    Ok(SankeyLayout {
        bounds,
        options,
        node_width,
        column_width,
        dropoff_padding,
        weight_aspect,
        curvy,
        levels,
        nodes,
        flows,
        dropoffs,
    })
}

fn stack_segments(
    graph: &SankeyGraph,
    ordered: &[(usize, FlowIndex)],
    x: f64,
    top: f64,
    weight_aspect: f64,
) -> Vec<EdgeSegment> {
    let mut cursor = top;
    ordered
        .iter()
        .map(|(_, flow)| {
            let y1 = cursor;
            cursor += graph.flow(*flow).weight * weight_aspect;
            EdgeSegment {
                flow: *flow,
                x,
                y1,
                y2: cursor,
            }
        })
        .collect()
}

fn find_segment(segments: &[EdgeSegment], flow: FlowIndex) -> Option<EdgeSegment> {
    segments.iter().find(|segment| segment.flow == flow).copied()
}

fn ribbon(
    flow: FlowIndex,
    data_index: usize,
    from: NodeIndex,
    to: NodeIndex,
    start: EdgeSegment,
    end: EdgeSegment,
    curvy: f64,
) -> FlowGeometry {
    let mut path = PathData::new();
    path.move_to(start.x, start.y1)
        .curve_to(start.x + curvy, start.y1, end.x - curvy, end.y1, end.x, end.y1)
        .line_to(end.x, end.y2)
        .curve_to(end.x - curvy, end.y2, start.x + curvy, start.y2, start.x, start.y2)
        .line_to(start.x, start.y1)
        .close();

    FlowGeometry {
        flow,
        data_index,
        from,
        to,
        left: start.x,
        right: end.x,
        top: start.y1.min(end.y1),
        bottom: start.y2.max(end.y2),
        top_center: (start.y1 + end.y1) / 2.0,
        bottom_center: (start.y2 + end.y2) / 2.0,
        left_top: PixelPoint::new(start.x, start.y1),
        right_top: PixelPoint::new(end.x, end.y1),
        right_bottom: PixelPoint::new(end.x, end.y2),
        left_bottom: PixelPoint::new(start.x, start.y2),
        curvy,
        path,
    }
}

#[derive(Debug, Clone, Copy)]
struct StubMetrics {
    node_width: f64,
    dropoff_padding: f64,
    /// Lowest y a stub tip may reach: the snapped bottom of the bounds.
    floor: f64,
}

fn dropoff_stub(
    flow: FlowIndex,
    data_index: usize,
    from: NodeIndex,
    node_rect: Rect,
    height: f64,
    metrics: StubMetrics,
) -> DropoffGeometry {
    let left = node_rect.right();
    let radius = height.min(metrics.node_width / 4.0);
    let right = left + radius;
    let y2 = node_rect.bottom();
    let y1 = y2 - height;
    // Room below a node is reserved for the last node of a level only.
    let tip = (y2 + metrics.dropoff_padding).min(metrics.floor.max(y2));

    let mut path = PathData::new();
    path.move_to(left, y1).arc_to(radius, radius, -90.0, 90.0);
    if y1 + radius < y2 {
        path.line_to(right, y2);
    }
    path.line_to((left + right) / 2.0, tip)
        .line_to(left, y2)
        .close();

    DropoffGeometry {
        flow,
        data_index,
        from,
        left,
        right,
        y1,
        y2,
        radius,
        right_anchor: PixelPoint::new(right, y2),
        path,
    }
}
