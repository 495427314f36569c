use tracing::debug;

use crate::core::leveling::LevelingOptions;
use crate::core::record::{FlowRecord, FlowRow, MissingPolicy};
use crate::render::Renderer;

use super::SankeyChart;
use super::invalidation::InvalidationTopic;

impl<R: Renderer> SankeyChart<R> {
    /// Replaces all rows; the graph is rebuilt on the next pass.
    pub fn set_data(&mut self, rows: Vec<FlowRow>) {
        debug!(rows = rows.len(), "set sankey data");
        self.rows = rows;
        self.invalidate_data();
    }

    /// Replaces all rows with typed records.
    pub fn set_records(&mut self, records: &[FlowRecord]) {
        self.set_data(records.iter().map(FlowRow::from).collect());
    }

    /// Appends one row; levels are recomputed from scratch like any other
    /// data change.
    pub fn append_row(&mut self, row: FlowRow) {
        self.rows.push(row);
        debug!(rows = self.rows.len(), "append sankey row");
        self.invalidate_data();
    }

    #[must_use]
    pub fn rows(&self) -> &[FlowRow] {
        &self.rows
    }

    #[must_use]
    pub fn missing_policy(&self) -> MissingPolicy {
        self.missing_policy
    }

    pub fn set_missing_policy(&mut self, policy: MissingPolicy) {
        if policy != self.missing_policy {
            self.missing_policy = policy;
            self.invalidate_data();
        }
    }

    #[must_use]
    pub fn leveling_options(&self) -> LevelingOptions {
        self.leveling
    }

    pub fn set_leveling_options(&mut self, options: LevelingOptions) {
        if options != self.leveling {
            self.leveling = options;
            self.invalidate_data();
        }
    }

    pub(super) fn invalidate_data(&mut self) {
        self.graph = None;
        self.layout = None;
        self.appearance = None;
        self.interaction.reset();
        self.invalidate(InvalidationTopic::Data);
    }
}
