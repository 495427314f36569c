use serde::{Deserialize, Serialize};

use crate::core::layout::{LayoutOptions, NodeWidth};
use crate::core::leveling::LevelingOptions;
use crate::core::record::{FlowRow, MissingPolicy};
use crate::error::SankeyResult;
use crate::labels::{LabelsConfig, TooltipSettings};
use crate::style::{ElementStyle, Palette};

/// Serializable chart settings plus data.
///
/// Style overrides only carry constant values; callback resolvers are
/// dropped on serialization and unset values fall back to the theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SankeyConfig {
    #[serde(default)]
    pub data: Vec<FlowRow>,
    #[serde(default)]
    pub node_width: NodeWidth,
    #[serde(default = "default_node_padding")]
    pub node_padding: f64,
    #[serde(default = "default_curve_factor")]
    pub curve_factor: f64,
    #[serde(default)]
    pub missing_policy: MissingPolicy,
    #[serde(default)]
    pub leveling: LevelingOptions,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub node: ElementStyle,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub flow: ElementStyle,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub dropoff: ElementStyle,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub tooltip: TooltipSettings,
}

fn default_node_padding() -> f64 {
    LayoutOptions::default().node_padding
}

fn default_curve_factor() -> f64 {
    LayoutOptions::default().curve_factor
}

impl Default for SankeyConfig {
    fn default() -> Self {
        let layout = LayoutOptions::default();
        Self {
            data: Vec::new(),
            node_width: layout.node_width,
            node_padding: layout.node_padding,
            curve_factor: layout.curve_factor,
            missing_policy: MissingPolicy::default(),
            leveling: LevelingOptions::default(),
            node: ElementStyle::default(),
            flow: ElementStyle::default(),
            dropoff: ElementStyle::default(),
            palette: Palette::default(),
            labels: LabelsConfig::default(),
            tooltip: TooltipSettings::default(),
        }
    }
}

impl SankeyConfig {
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            node_width: self.node_width,
            node_padding: self.node_padding,
            curve_factor: self.curve_factor,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<FlowRow>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.node_width = options.node_width;
        self.node_padding = options.node_padding;
        self.curve_factor = options.curve_factor;
        self
    }

    pub fn validate(&self) -> SankeyResult<()> {
        self.layout_options().validate()?;
        self.palette.validate()
    }
}
