use crate::tessellation::TileIndex;

/// Errors produced by tessellation construction and tile queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TessellationError {
    /// A tile index outside `[0, num_tiles)` was supplied.
    #[error("tile index {index} out of range (tessellation has {num_tiles} tiles)")]
    TileOutOfRange {
        /// The rejected index.
        index: TileIndex,
        /// Number of tiles in the tessellation.
        num_tiles: usize,
    },
    /// Construction parameters do not describe a usable tessellation.
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),
}

/// Result alias for tessellation operations.
pub type Result<T> = std::result::Result<T, TessellationError>;
