use thiserror::Error;

pub type SankeyResult<T> = Result<T, SankeyError>;

#[derive(Debug, Error)]
pub enum SankeyError {
    #[error("invalid layout bounds: width={width}, height={height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("invalid layout option: {0}")]
    InvalidOption(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Level propagation did not settle: the flows contain a cycle.
    #[error("graph is not layerable: node `{node}` was pushed past level {level}")]
    NotLayerable { node: String, level: usize },
}
