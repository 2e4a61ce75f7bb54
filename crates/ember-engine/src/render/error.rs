use thiserror::Error;

/// Kind of the renderer's current error, `None` when healthy.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    #[default]
    None,
    /// No valid shader program is bound.
    InvalidProgram,
    /// Vertex upload size check failed.
    InvalidVbo,
    /// Index upload size check failed.
    InvalidEbo,
    /// Vertex layout object could not be created.
    InvalidVao,
    /// Any other backend-reported failure.
    Backend,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RendererError {
    #[error("no valid shader program is bound")]
    InvalidProgram,
    #[error("VBO buffer size {actual} was expected to be size {expected}")]
    InvalidVbo { actual: u64, expected: u64 },
    #[error("EBO buffer size {actual} was expected to be size {expected}")]
    InvalidEbo { actual: u64, expected: u64 },
    #[error("vertex layout object could not be created")]
    InvalidVao,
    #[error("{0}")]
    Backend(String),
}

impl RendererError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RendererError::InvalidProgram => ErrorKind::InvalidProgram,
            RendererError::InvalidVbo { .. } => ErrorKind::InvalidVbo,
            RendererError::InvalidEbo { .. } => ErrorKind::InvalidEbo,
            RendererError::InvalidVao => ErrorKind::InvalidVao,
            RendererError::Backend(_) => ErrorKind::Backend,
        }
    }
}
