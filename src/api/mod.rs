mod appearance;
mod chart;
mod config;
mod data_controller;
mod interaction_controller;
mod invalidation;
mod json_contract;
mod render_frame_builder;

pub use appearance::{AppearanceCache, ResolvedAppearance, color_context};
pub use chart::{PipelineStats, SankeyChart};
pub use config::SankeyConfig;
pub use invalidation::{Invalidation, InvalidationTopic};
pub use json_contract::{SANKEY_CONFIG_JSON_SCHEMA_V1, SankeyConfigJsonContractV1};
pub use render_frame_builder::{FLOW_Z_INDEX, NODE_Z_INDEX};
