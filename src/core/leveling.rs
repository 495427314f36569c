//! Online longest-path layering.
//!
//! Levels are corrected after every inserted edge rather than in a global
//! pass, so shifts must see the partially built graph. Propagation runs on an
//! explicit worklist bounded by the number of inserted edges; exceeding the
//! bound means the flows contain a cycle.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::graph::{Flow, Node, NodeIndex};
use crate::error::{SankeyError, SankeyResult};

/// Comparison used when pushing downstream neighbors of a shifted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelShiftRule {
    /// Push a neighbor whose level is `<=` the shifted node's level.
    /// Keeps every flow strictly left-to-right.
    #[default]
    Inclusive,
    /// Push only neighbors strictly behind the shifted node; equal-level
    /// neighbors stay where they are.
    Exclusive,
}

impl LevelShiftRule {
    #[must_use]
    pub fn should_shift(self, upstream_level: usize, downstream_level: usize) -> bool {
        match self {
            Self::Inclusive => upstream_level >= downstream_level,
            Self::Exclusive => upstream_level > downstream_level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelingOptions {
    #[serde(default)]
    pub shift_rule: LevelShiftRule,
    /// Moves nodes without outgoing flows or drop-offs to the last level.
    #[serde(default = "default_pin_sinks")]
    pub pin_sinks: bool,
    /// Optional hard cap on worklist steps per inserted edge.
    #[serde(default)]
    pub max_shift_steps: Option<usize>,
}

fn default_pin_sinks() -> bool {
    true
}

impl Default for LevelingOptions {
    fn default() -> Self {
        Self {
            shift_rule: LevelShiftRule::default(),
            pin_sinks: default_pin_sinks(),
            max_shift_steps: None,
        }
    }
}

impl LevelingOptions {
    #[must_use]
    pub fn with_shift_rule(mut self, rule: LevelShiftRule) -> Self {
        self.shift_rule = rule;
        self
    }

    #[must_use]
    pub fn with_pin_sinks(mut self, pin_sinks: bool) -> Self {
        self.pin_sinks = pin_sinks;
        self
    }

    #[must_use]
    pub fn with_max_shift_steps(mut self, steps: Option<usize>) -> Self {
        self.max_shift_steps = steps;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LevelAssigner {
    options: LevelingOptions,
    last_level: Option<usize>,
    edges_inserted: usize,
    worklist: VecDeque<NodeIndex>,
}

impl LevelAssigner {
    pub(crate) fn new(options: LevelingOptions) -> Self {
        Self {
            options,
            last_level: None,
            edges_inserted: 0,
            worklist: VecDeque::new(),
        }
    }

    #[must_use]
    pub(crate) fn last_level(&self) -> Option<usize> {
        self.last_level
    }

    /// Restores `from.level < to.level` for a freshly inserted edge and
    /// propagates the shift downstream.
    pub(crate) fn relax_edge(
        &mut self,
        nodes: &mut [Node],
        flows: &[Flow],
        from: NodeIndex,
        to: NodeIndex,
    ) -> SankeyResult<()> {
        self.edges_inserted += 1;
        let from_level = nodes[from.get()].level;
        if from_level >= nodes[to.get()].level {
            self.set_level(nodes, to, from_level + 1)?;
            self.propagate(nodes, flows, to)?;
        }
        self.observe_level(nodes[to.get()].level);
        Ok(())
    }

    fn propagate(
        &mut self,
        nodes: &mut [Node],
        flows: &[Flow],
        start: NodeIndex,
    ) -> SankeyResult<()> {
        self.worklist.clear();
        self.worklist.push_back(start);
        let mut steps = 0_usize;

        while let Some(shifted) = self.worklist.pop_front() {
            steps += 1;
            if let Some(limit) = self.options.max_shift_steps {
                if steps > limit {
                    return Err(SankeyError::NotLayerable {
                        node: nodes[shifted.get()].name.clone(),
                        level: nodes[shifted.get()].level,
                    });
                }
            }

            let level = nodes[shifted.get()].level;
            for position in 0..nodes[shifted.get()].outcome.len() {
                let flow_index = nodes[shifted.get()].outcome[position];
                let Some(target) = flows[flow_index.get()].to else {
                    continue;
                };
                if self
                    .options
                    .shift_rule
                    .should_shift(level, nodes[target.get()].level)
                {
                    self.set_level(nodes, target, level + 1)?;
                    self.worklist.push_back(target);
                }
            }
        }

        trace!(steps, start = start.get(), "level shift propagated");
        Ok(())
    }

    fn set_level(&mut self, nodes: &mut [Node], node: NodeIndex, level: usize) -> SankeyResult<()> {
        // The longest acyclic path cannot be longer than the edge count.
        if level > self.edges_inserted {
            self.worklist.clear();
            return Err(SankeyError::NotLayerable {
                node: nodes[node.get()].name.clone(),
                level: self.edges_inserted,
            });
        }
        nodes[node.get()].level = level;
        self.observe_level(level);
        Ok(())
    }

    fn observe_level(&mut self, level: usize) {
        self.last_level = Some(self.last_level.map_or(level, |last| last.max(level)));
    }

    /// Single pass over all nodes: sink pinning, conflict flag and weight.
    pub(crate) fn finalize(&self, nodes: &mut [Node]) {
        let last_level = self.last_level.unwrap_or(0);
        for node in nodes.iter_mut() {
            let has_income = !node.income.is_empty();
            let has_outgoing = node.out_degree() > 0;

            if self.options.pin_sinks && !has_outgoing {
                node.level = last_level;
            }

            node.conflict = has_income && has_outgoing && node.income_value != node.outcome_value;
            node.weight = if !has_income {
                node.outcome_value
            } else if !has_outgoing {
                node.income_value
            } else {
                node.income_value.max(node.outcome_value)
            };
        }
    }
}
