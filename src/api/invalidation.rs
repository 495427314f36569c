use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::SankeyResult;
use crate::render::Renderer;

use super::SankeyChart;

/// Pipeline stage a change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTopic {
    /// Rows, missing policy or leveling changed: rebuild the graph.
    Data,
    /// Bounds or layout options changed: recompute geometry.
    Bounds,
    /// Styles, palette or interaction state changed: recolor.
    Appearance,
    NodeLabels,
    FlowLabels,
}

impl InvalidationTopic {
    const fn bit(self) -> u8 {
        match self {
            Self::Data => 1 << 0,
            Self::Bounds => 1 << 1,
            Self::Appearance => 1 << 2,
            Self::NodeLabels => 1 << 3,
            Self::FlowLabels => 1 << 4,
        }
    }
}

/// Bitmask of pending invalidation topics.
///
/// Upstream topics imply downstream ones: data implies bounds, bounds
/// implies appearance and both label kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Invalidation {
    bits: u8,
}

impl Invalidation {
    const LABEL_BITS: u8 = InvalidationTopic::NodeLabels.bit() | InvalidationTopic::FlowLabels.bit();
    const BOUNDS_BITS: u8 =
        InvalidationTopic::Bounds.bit() | InvalidationTopic::Appearance.bit() | Self::LABEL_BITS;
    const ALL_BITS: u8 = InvalidationTopic::Data.bit() | Self::BOUNDS_BITS;

    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            bits: Self::ALL_BITS,
        }
    }

    /// Mask for `topic` plus every topic downstream of it.
    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        let bits = match topic {
            InvalidationTopic::Data => Self::ALL_BITS,
            InvalidationTopic::Bounds => Self::BOUNDS_BITS,
            InvalidationTopic::Appearance
            | InvalidationTopic::NodeLabels
            | InvalidationTopic::FlowLabels => topic.bit(),
        };
        Self { bits }
    }

    #[must_use]
    pub const fn with_topic(self, topic: InvalidationTopic) -> Self {
        self.union(Self::from_topic(topic))
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains(self, topic: InvalidationTopic) -> bool {
        (self.bits & topic.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }

    pub fn merge(&mut self, other: Self) {
        self.bits |= other.bits;
    }
}

impl<R: Renderer> SankeyChart<R> {
    pub(super) fn invalidate(&mut self, topic: InvalidationTopic) {
        self.pending.merge(Invalidation::from_topic(topic));
        trace!(?topic, "sankey invalidated");
    }

    #[must_use]
    pub fn pending_invalidation(&self) -> Invalidation {
        self.pending
    }

    #[must_use]
    pub fn has_pending_invalidation(&self) -> bool {
        !self.pending.is_none()
    }

    pub fn clear_pending_invalidation(&mut self) {
        self.pending = Invalidation::none();
    }

    /// Renders only when something is pending; returns whether it did.
    pub fn render_if_invalidated(&mut self) -> SankeyResult<bool> {
        if !self.has_pending_invalidation() {
            return Ok(false);
        }
        if let Err(err) = self.render() {
            warn!(error = %err, pending = ?self.pending, "sankey render pass failed");
            return Err(err);
        }
        Ok(true)
    }
}
