#[cfg(feature = "parallel-layout")]
use rayon::prelude::*;

use crate::core::graph::SankeyGraph;
use crate::core::layout::{LayoutOptions, SankeyLayout, compute_layout};
use crate::core::leveling::LevelingOptions;
use crate::core::record::{FlowRow, MissingPolicy};
use crate::core::types::Rect;
use crate::error::SankeyResult;

/// One independent diagram: its rows plus where to lay it out.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutJob {
    pub rows: Vec<FlowRow>,
    pub bounds: Rect,
    pub options: LayoutOptions,
}

impl LayoutJob {
    #[must_use]
    pub fn new(rows: Vec<FlowRow>, bounds: Rect) -> Self {
        Self {
            rows,
            bounds,
            options: LayoutOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self, policy: MissingPolicy, leveling: LevelingOptions) -> SankeyResult<SankeyLayout> {
        let graph = SankeyGraph::from_rows(&self.rows, policy, leveling)?;
        compute_layout(&graph, self.bounds, self.options)
    }
}

/// Lays out many diagrams; results keep the job order.
///
/// With `parallel-layout` enabled jobs run on the rayon pool. Each job is
/// single-threaded, so results are identical either way.
#[must_use]
pub fn layout_batch(
    jobs: &[LayoutJob],
    policy: MissingPolicy,
    leveling: LevelingOptions,
) -> Vec<SankeyResult<SankeyLayout>> {
    #[cfg(feature = "parallel-layout")]
    {
        jobs.par_iter()
            .map(|job| job.run(policy, leveling))
            .collect()
    }

    #[cfg(not(feature = "parallel-layout"))]
    {
        jobs.iter().map(|job| job.run(policy, leveling)).collect()
    }
}
