use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SankeyError, SankeyResult};
use crate::render::Renderer;

use super::SankeyChart;
use super::config::SankeyConfig;

pub const SANKEY_CONFIG_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: SankeyConfig,
}

impl SankeyConfig {
    pub fn to_json_pretty(&self) -> SankeyResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SankeyError::InvalidData(format!("failed to serialize sankey config: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> SankeyResult<String> {
        let payload = SankeyConfigJsonContractV1 {
            schema_version: SANKEY_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            SankeyError::InvalidData(format!("failed to serialize sankey config contract v1: {e}"))
        })
    }

    /// Accepts either a versioned contract or a bare config object.
    pub fn from_json_compat_str(input: &str) -> SankeyResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| SankeyError::InvalidData(format!("failed to parse sankey json: {e}")))?;

        if value.get("schema_version").is_some() {
            let payload: SankeyConfigJsonContractV1 = serde_json::from_value(value).map_err(|e| {
                SankeyError::InvalidData(format!("failed to parse sankey config contract: {e}"))
            })?;
            if payload.schema_version != SANKEY_CONFIG_JSON_SCHEMA_V1 {
                return Err(SankeyError::InvalidData(format!(
                    "unsupported sankey config schema version: {}",
                    payload.schema_version
                )));
            }
            return Ok(payload.config);
        }

        serde_json::from_value(value)
            .map_err(|e| SankeyError::InvalidData(format!("failed to parse sankey config: {e}")))
    }
}

impl<R: Renderer> SankeyChart<R> {
    /// Snapshot of data and settings; callback styles are not included.
    #[must_use]
    pub fn serialize(&self) -> SankeyConfig {
        SankeyConfig {
            data: self.rows.clone(),
            node_width: self.layout_options.node_width,
            node_padding: self.layout_options.node_padding,
            curve_factor: self.layout_options.curve_factor,
            missing_policy: self.missing_policy,
            leveling: self.leveling,
            node: self.node_style.clone(),
            flow: self.flow_style.clone(),
            dropoff: self.dropoff_style.clone(),
            palette: self.palette.clone(),
            labels: self.labels.clone(),
            tooltip: self.tooltip.clone(),
        }
    }

    /// Replaces data and settings from a config; nothing changes on error.
    pub fn apply_config(&mut self, config: SankeyConfig) -> SankeyResult<()> {
        config.validate()?;
        self.layout_options = config.layout_options();
        self.rows = config.data;
        self.missing_policy = config.missing_policy;
        self.leveling = config.leveling;
        self.node_style = config.node;
        self.flow_style = config.flow;
        self.dropoff_style = config.dropoff;
        self.palette = config.palette;
        self.labels = config.labels;
        self.tooltip = config.tooltip;
        self.invalidate_data();
        debug!(rows = self.rows.len(), "sankey config applied");
        Ok(())
    }

    pub fn setup_by_json(&mut self, input: &str) -> SankeyResult<()> {
        let config = SankeyConfig::from_json_compat_str(input)?;
        self.apply_config(config)
    }

    pub fn config_json_contract_v1_pretty(&self) -> SankeyResult<String> {
        self.serialize().to_json_contract_v1_pretty()
    }
}
