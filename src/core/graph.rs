use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::leveling::{LevelAssigner, LevelingOptions};
use crate::core::levels::LevelSummary;
use crate::core::record::{FlowRecord, FlowRow, IndexedRecord, MissingPolicy, parse_rows};
use crate::error::SankeyResult;

/// Position of a node in the graph arena (creation order).
///
/// Not to be confused with [`Node::id`], the level-major color key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(usize);

impl NodeIndex {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Position of a flow in the graph arena (accepted-row order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowIndex(usize);

impl FlowIndex {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub level: usize,
    /// Dense level-major id, used as the palette key.
    pub id: usize,
    pub income_value: f64,
    pub outcome_value: f64,
    pub dropoff_value: f64,
    /// Incoming flows in insertion order.
    pub income: Vec<FlowIndex>,
    /// Outgoing flows with a target node, in insertion order.
    pub outcome: Vec<FlowIndex>,
    /// Drop-off flows leaving this node.
    pub dropoffs: Vec<FlowIndex>,
    pub weight: f64,
    pub conflict: bool,
}

impl Node {
    /// Every node starts at level 0; edge relaxation moves targets.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            level: 0,
            id: 0,
            income_value: 0.0,
            outcome_value: 0.0,
            dropoff_value: 0.0,
            income: Vec::new(),
            outcome: Vec::new(),
            dropoffs: Vec::new(),
            weight: 0.0,
            conflict: false,
        }
    }

    #[must_use]
    pub fn has_income(&self) -> bool {
        !self.income.is_empty()
    }

    /// Outgoing flows plus drop-offs.
    #[must_use]
    pub fn out_degree(&self) -> usize {
        self.outcome.len() + self.dropoffs.len()
    }

    #[must_use]
    pub fn is_source(&self) -> bool {
        self.income.is_empty()
    }

    #[must_use]
    pub fn is_sink(&self) -> bool {
        self.out_degree() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Index of the data row this flow was built from.
    pub data_index: usize,
    pub from: NodeIndex,
    /// `None` for a drop-off.
    pub to: Option<NodeIndex>,
    pub weight: f64,
}

impl Flow {
    #[must_use]
    pub fn is_dropoff(&self) -> bool {
        self.to.is_none()
    }
}

/// Incremental graph construction with per-edge level correction.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    flows: Vec<Flow>,
    index: IndexMap<String, NodeIndex>,
    assigner: LevelAssigner,
    dropped_rows: usize,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(options: LevelingOptions) -> Self {
        Self {
            nodes: Vec::new(),
            flows: Vec::new(),
            index: IndexMap::new(),
            assigner: LevelAssigner::new(options),
            dropped_rows: 0,
        }
    }

    fn node_or_insert(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.index.get(name) {
            return *index;
        }
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new(name));
        self.index.insert(name.to_owned(), index);
        index
    }

    /// Adds one validated record; levels are corrected before returning.
    pub fn push_record(&mut self, data_index: usize, record: &FlowRecord) -> SankeyResult<FlowIndex> {
        let from = self.node_or_insert(&record.from);
        let to = record.to.as_deref().map(|name| self.node_or_insert(name));
        let flow_index = FlowIndex::new(self.flows.len());
        let weight = record.weight;
        self.flows.push(Flow {
            data_index,
            from,
            to,
            weight,
        });

        match to {
            None => {
                let node = &mut self.nodes[from.get()];
                node.outcome_value += weight;
                node.dropoff_value += weight;
                node.dropoffs.push(flow_index);
            }
            Some(to) => {
                let source = &mut self.nodes[from.get()];
                source.outcome_value += weight;
                source.outcome.push(flow_index);

                let target = &mut self.nodes[to.get()];
                target.income_value += weight;
                target.income.push(flow_index);

                self.assigner
                    .relax_edge(&mut self.nodes, &self.flows, from, to)?;
            }
        }
        Ok(flow_index)
    }

    pub(crate) fn note_dropped_rows(&mut self, count: usize) {
        self.dropped_rows += count;
    }

    /// Pins sinks, computes node weights and aggregates levels.
    #[must_use]
    pub fn finish(mut self) -> SankeyGraph {
        self.assigner.finalize(&mut self.nodes);
        let levels = LevelSummary::aggregate(&mut self.nodes);
        debug!(
            nodes = self.nodes.len(),
            flows = self.flows.len(),
            levels = levels.len(),
            dropped_rows = self.dropped_rows,
            "sankey graph built"
        );
        SankeyGraph {
            nodes: self.nodes,
            flows: self.flows,
            index: self.index,
            levels,
            last_level: self.assigner.last_level(),
            dropped_rows: self.dropped_rows,
        }
    }
}

/// Immutable node/flow/level snapshot produced by one data pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyGraph {
    nodes: Vec<Node>,
    flows: Vec<Flow>,
    index: IndexMap<String, NodeIndex>,
    levels: LevelSummary,
    last_level: Option<usize>,
    dropped_rows: usize,
}

impl SankeyGraph {
    /// Validates raw rows with `policy` and builds the graph.
    pub fn from_rows(
        rows: &[FlowRow],
        policy: MissingPolicy,
        options: LevelingOptions,
    ) -> SankeyResult<Self> {
        let parsed = parse_rows(rows, policy);
        let mut builder = GraphBuilder::new(options);
        builder.note_dropped_rows(parsed.dropped);
        for IndexedRecord { data_index, record } in &parsed.records {
            builder.push_record(*data_index, record)?;
        }
        Ok(builder.finish())
    }

    /// Builds the graph from typed records; the record position is the data index.
    pub fn from_records(
        records: &[FlowRecord],
        policy: MissingPolicy,
        options: LevelingOptions,
    ) -> SankeyResult<Self> {
        let rows: Vec<FlowRow> = records.iter().map(FlowRow::from).collect();
        Self::from_rows(&rows, policy, options)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.get()]
    }

    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_index(name).map(|index| self.node(index))
    }

    /// Nodes in ascending id order (level-major).
    pub fn nodes_by_id(&self) -> impl Iterator<Item = (NodeIndex, &Node)> + '_ {
        self.levels
            .levels()
            .iter()
            .flat_map(|level| level.nodes.iter().copied())
            .map(|index| (index, self.node(index)))
    }

    #[must_use]
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    #[must_use]
    pub fn flow(&self, index: FlowIndex) -> &Flow {
        &self.flows[index.get()]
    }

    #[must_use]
    pub fn flow_by_data_index(&self, data_index: usize) -> Option<(FlowIndex, &Flow)> {
        self.flows
            .iter()
            .enumerate()
            .find(|(_, flow)| flow.data_index == data_index)
            .map(|(index, flow)| (FlowIndex::new(index), flow))
    }

    /// Flows that land on a node.
    pub fn links(&self) -> impl Iterator<Item = (FlowIndex, &Flow)> + '_ {
        self.flows
            .iter()
            .enumerate()
            .filter(|(_, flow)| !flow.is_dropoff())
            .map(|(index, flow)| (FlowIndex::new(index), flow))
    }

    pub fn dropoffs(&self) -> impl Iterator<Item = (FlowIndex, &Flow)> + '_ {
        self.flows
            .iter()
            .enumerate()
            .filter(|(_, flow)| flow.is_dropoff())
            .map(|(index, flow)| (FlowIndex::new(index), flow))
    }

    pub fn income_flows(&self, node: NodeIndex) -> impl Iterator<Item = &Flow> + '_ {
        self.node(node).income.iter().map(|index| self.flow(*index))
    }

    pub fn outcome_flows(&self, node: NodeIndex) -> impl Iterator<Item = &Flow> + '_ {
        self.node(node).outcome.iter().map(|index| self.flow(*index))
    }

    #[must_use]
    pub fn levels(&self) -> &LevelSummary {
        &self.levels
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Highest level reached while inserting edges; `None` without edges.
    #[must_use]
    pub fn last_level(&self) -> Option<usize> {
        self.last_level
    }

    #[must_use]
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a graph from typed records with default validation and leveling.
pub fn build_graph(records: &[FlowRecord]) -> SankeyResult<SankeyGraph> {
    SankeyGraph::from_records(
        records,
        MissingPolicy::default(),
        LevelingOptions::default(),
    )
}
