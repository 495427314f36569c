use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::graph::SankeyGraph;
use crate::core::layout::{LayoutOptions, SankeyLayout, compute_layout};
use crate::core::leveling::LevelingOptions;
use crate::core::record::{FlowRow, MissingPolicy};
use crate::core::types::Rect;
use crate::error::SankeyResult;
use crate::interaction::SankeyInteraction;
use crate::labels::{LabelsConfig, TooltipSettings};
use crate::render::Renderer;
use crate::style::{ElementStyle, Palette, SankeyTheme};

use super::appearance::AppearanceCache;
use super::config::SankeyConfig;
use super::invalidation::{Invalidation, InvalidationTopic};

/// How many times each pipeline stage has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub graph_builds: usize,
    pub layout_passes: usize,
    pub appearance_passes: usize,
    pub frames_built: usize,
}

/// Sankey diagram facade consumed by host applications.
///
/// Owns data, options and styles plus the cached graph, layout and
/// appearance stages; each setter invalidates only the stages it affects.
pub struct SankeyChart<R: Renderer> {
    pub(super) renderer: R,
    pub(super) bounds: Rect,
    pub(super) rows: Vec<FlowRow>,
    pub(super) missing_policy: MissingPolicy,
    pub(super) leveling: LevelingOptions,
    pub(super) layout_options: LayoutOptions,
    pub(super) node_style: ElementStyle,
    pub(super) flow_style: ElementStyle,
    pub(super) dropoff_style: ElementStyle,
    pub(super) theme: SankeyTheme,
    pub(super) palette: Palette,
    pub(super) labels: LabelsConfig,
    pub(super) tooltip: TooltipSettings,
    pub(super) interaction: SankeyInteraction,
    pub(super) graph: Option<SankeyGraph>,
    pub(super) layout: Option<SankeyLayout>,
    pub(super) appearance: Option<AppearanceCache>,
    pub(super) pending: Invalidation,
    pub(super) stats: PipelineStats,
}

impl<R: Renderer> SankeyChart<R> {
    pub fn new(renderer: R, bounds: Rect) -> SankeyResult<Self> {
        Self::with_config(renderer, bounds, SankeyConfig::default())
    }

    pub fn with_config(renderer: R, bounds: Rect, config: SankeyConfig) -> SankeyResult<Self> {
        bounds.validate()?;
        config.validate()?;
        Ok(Self {
            renderer,
            bounds,
            layout_options: config.layout_options(),
            rows: config.data,
            missing_policy: config.missing_policy,
            leveling: config.leveling,
            node_style: config.node,
            flow_style: config.flow,
            dropoff_style: config.dropoff,
            theme: SankeyTheme::default(),
            palette: config.palette,
            labels: config.labels,
            tooltip: config.tooltip,
            interaction: SankeyInteraction::default(),
            graph: None,
            layout: None,
            appearance: None,
            pending: Invalidation::all(),
            stats: PipelineStats::default(),
        })
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) -> SankeyResult<()> {
        bounds.validate()?;
        if bounds != self.bounds {
            self.bounds = bounds;
            self.layout = None;
            self.invalidate(InvalidationTopic::Bounds);
        }
        Ok(())
    }

    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        self.layout_options
    }

    pub fn set_layout_options(&mut self, options: LayoutOptions) -> SankeyResult<()> {
        options.validate()?;
        if options != self.layout_options {
            self.layout_options = options;
            self.layout = None;
            self.invalidate(InvalidationTopic::Bounds);
        }
        Ok(())
    }

    #[must_use]
    pub fn graph(&self) -> Option<&SankeyGraph> {
        self.graph.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> Option<&SankeyLayout> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn interaction(&self) -> &SankeyInteraction {
        &self.interaction
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Brings every stale stage up to date.
    ///
    /// A failing stage leaves earlier stages cached and later ones empty, so
    /// the next call retries from the failed stage.
    pub fn compute(&mut self) -> SankeyResult<()> {
        if self.graph.is_none() {
            let graph = SankeyGraph::from_rows(&self.rows, self.missing_policy, self.leveling)?;
            debug!(
                rows = self.rows.len(),
                nodes = graph.nodes().len(),
                dropped_rows = graph.dropped_rows(),
                "sankey graph rebuilt"
            );
            self.graph = Some(graph);
            self.layout = None;
            self.stats.graph_builds += 1;
        }

        if self.layout.is_none() {
            let Some(graph) = self.graph.as_ref() else {
                return Ok(());
            };
            let layout = compute_layout(graph, self.bounds, self.layout_options)?;
            trace!(weight_aspect = layout.weight_aspect, "sankey layout rebuilt");
            self.layout = Some(layout);
            self.appearance = None;
            self.stats.layout_passes += 1;
        }

        if self.appearance.is_none() {
            let Some(graph) = self.graph.as_ref() else {
                return Ok(());
            };
            let cache = AppearanceCache::build(
                graph,
                &self.palette,
                &self.theme,
                [&self.node_style, &self.flow_style, &self.dropoff_style],
                &self.interaction,
            );
            trace!("sankey appearance rebuilt");
            self.appearance = Some(cache);
            self.stats.appearance_passes += 1;
        }
        Ok(())
    }
}
