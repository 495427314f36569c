pub mod batch;
pub mod graph;
pub mod layout;
pub mod leveling;
pub mod levels;
pub mod path;
pub mod record;
pub mod types;

pub use batch::{LayoutJob, layout_batch};
pub use graph::{Flow, FlowIndex, GraphBuilder, Node, NodeIndex, SankeyGraph, build_graph};
pub use layout::{
    DROPOFF_PADDING_RATIO, DropoffGeometry, EdgeSegment, FlowGeometry, LayoutOptions,
    LevelGeometry, MAX_DROPOFF_NODE_SHARE, NodeGeometry, NodeWidth, SankeyLayout, compute_layout,
};
pub use leveling::{LevelShiftRule, LevelingOptions};
pub use levels::{Level, LevelSummary};
pub use path::{PathCommand, PathData};
pub use record::{FlowRecord, FlowRow, MissingPolicy, parse_rows};
pub use types::{PixelPoint, Rect, apply_pixel_shift};
