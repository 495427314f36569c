use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::graph::{Node, NodeIndex};

/// Nodes sharing one column, in encounter order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    pub nodes: Vec<NodeIndex>,
    pub weights_sum: f64,
}

impl Level {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn last_node(&self) -> Option<NodeIndex> {
        self.nodes.last().copied()
    }
}

/// Per-level aggregates plus the dominant level used to size the layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSummary {
    levels: Vec<Level>,
    max_level_weight: f64,
    max_level: usize,
    max_nodes_count: usize,
}

impl LevelSummary {
    /// Groups nodes by level and assigns dense level-major ids.
    ///
    /// Levels without nodes stay in the vector as empty entries. Among the
    /// levels at maximum weight, the first one with the most nodes wins.
    pub fn aggregate(nodes: &mut [Node]) -> Self {
        let level_count = nodes.iter().map(|node| node.level + 1).max().unwrap_or(0);
        let mut levels = vec![Level::default(); level_count];

        for (index, node) in nodes.iter().enumerate() {
            let level = &mut levels[node.level];
            level.nodes.push(NodeIndex::new(index));
            level.weights_sum += node.weight;
        }

        let max_level_weight = levels
            .iter()
            .map(|level| OrderedFloat(level.weights_sum))
            .max()
            .map_or(0.0, |weight| weight.0);

        let mut max_level = 0;
        let mut max_nodes_count = 0;
        let mut next_id = 0;
        for (number, level) in levels.iter().enumerate() {
            if level.weights_sum == max_level_weight && level.nodes.len() > max_nodes_count {
                max_nodes_count = level.nodes.len();
                max_level = number;
            }
            for index in &level.nodes {
                nodes[index.get()].id = next_id;
                next_id += 1;
            }
        }

        Self {
            levels,
            max_level_weight,
            max_level,
            max_nodes_count,
        }
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn level(&self, number: usize) -> Option<&Level> {
        self.levels.get(number)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn max_level_weight(&self) -> f64 {
        self.max_level_weight
    }

    /// Level number of the dominant level.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    #[must_use]
    pub fn max_nodes_count(&self) -> usize {
        self.max_nodes_count
    }
}
