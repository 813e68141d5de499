use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrvError {
    #[error("Vertex index {index} out of range (vertex count {count})")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("Segment index {index} out of range (segment count {count})")]
    SegmentOutOfRange { index: usize, count: usize },

    #[error("Invalid weight {0}: weights must be finite and positive")]
    InvalidWeight(f64),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CrvError>;
