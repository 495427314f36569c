use serde::{Deserialize, Serialize};

use crate::error::{SankeyError, SankeyResult};
use crate::render::Color;

const DEFAULT_COLORS: [&str; 40] = [
    "#1D8BD1", "#F1683C", "#2AD62A", "#DBDC25", "#8FBC8B", "#D2B48C", "#FAF0E6", "#20B2AA",
    "#B0C4DE", "#DDA0DD", "#9C9AFF", "#9C3063", "#FFFFCE", "#CEFFFF", "#630063", "#FF8284",
    "#0065CE", "#CECFFF", "#000084", "#FF00FF", "#FFFF00", "#00FFFF", "#840084", "#840000",
    "#008284", "#0000FF", "#00CFFF", "#CEFFFF", "#CEFFCE", "#FFFF9C", "#9CCFFF", "#FF9ACE",
    "#CE9AFF", "#FFCF9C", "#3165FF", "#31CFCE", "#9CCF00", "#FFCF00", "#FF9A00", "#FF6500",
];

fn default_colors() -> Vec<Color> {
    DEFAULT_COLORS
        .iter()
        .filter_map(|hex| Color::from_hex(hex).ok())
        .collect()
}

/// Cycles through a fixed color list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctPalette {
    #[serde(default = "default_colors")]
    pub colors: Vec<Color>,
}

impl Default for DistinctPalette {
    fn default() -> Self {
        Self {
            colors: default_colors(),
        }
    }
}

impl DistinctPalette {
    #[must_use]
    pub fn item_at(&self, index: usize) -> Option<Color> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[index % self.colors.len()])
    }
}

/// Samples `count` colors from a gradient through evenly spaced stops.
///
/// Indexes past the end clamp to the last sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePalette {
    #[serde(default = "default_colors")]
    pub colors: Vec<Color>,
    /// Number of samples; defaults to the number of stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Default for RangePalette {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            count: None,
        }
    }
}

impl RangePalette {
    #[must_use]
    pub fn new(colors: Vec<Color>, count: Option<usize>) -> Self {
        Self { colors, count }
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.count.unwrap_or(self.colors.len())
    }

    #[must_use]
    pub fn item_at(&self, index: usize) -> Option<Color> {
        let count = self.sample_count();
        let (first, last) = (self.colors.first()?, self.colors.last()?);
        if count == 0 {
            return None;
        }
        if self.colors.len() == 1 {
            return Some(*first);
        }

        let index = index.min(count - 1);
        let offset = if count == 1 {
            0.0
        } else {
            index as f64 / (count - 1) as f64
        };
        let step = 1.0 / (self.colors.len() - 1) as f64;
        let position = offset / step;
        let left = position.floor() as usize;
        if left + 1 >= self.colors.len() {
            return Some(*last);
        }
        let t = position - left as f64;
        Some(self.colors[left].blend(self.colors[left + 1], t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Palette {
    Distinct(DistinctPalette),
    Range(RangePalette),
}

impl Default for Palette {
    fn default() -> Self {
        Self::Distinct(DistinctPalette::default())
    }
}

impl Palette {
    /// Color keyed by a node id; black when the palette has no colors.
    #[must_use]
    pub fn item_at(&self, index: usize) -> Color {
        match self {
            Self::Distinct(palette) => palette.item_at(index),
            Self::Range(palette) => palette.item_at(index),
        }
        .unwrap_or(Color::BLACK)
    }

    pub fn validate(&self) -> SankeyResult<()> {
        let colors = match self {
            Self::Distinct(palette) => &palette.colors,
            Self::Range(palette) => &palette.colors,
        };
        if colors.is_empty() {
            return Err(SankeyError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        colors.iter().try_for_each(|color| color.validate())
    }
}
