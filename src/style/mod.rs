//! Per-element fill and stroke resolution.

mod palette;
mod resolver;
mod theme;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use palette::{DistinctPalette, Palette, RangePalette};
pub use resolver::{
    ColorContext, ColorResolver, ElementStyle, PointState, ResolverFn, StateStyle, resolve_fill,
    resolve_stroke,
};
pub use theme::{
    CONFLICT_STROKE_THICKNESS, DARKEN_FACTOR, FLOW_OPACITY, SankeyTheme, dropoff_gradient,
};

/// Kind of drawable diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Node,
    Flow,
    Dropoff,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Flow => "flow",
            Self::Dropoff => "dropoff",
        })
    }
}
