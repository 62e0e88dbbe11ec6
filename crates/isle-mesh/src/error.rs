//! Mesh build errors.

/// Why a terrain mesh could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// The sampling stride does not evenly divide `grid_size - 1`, so the
    /// simplified mesh would not reach the grid's far edge.
    #[error(
        "invalid detail level {detail_level:?}: stride {stride} does not divide grid size {grid_size} - 1"
    )]
    InvalidDetailLevel {
        /// Requested detail level, when the stride was derived from one.
        detail_level: Option<u32>,
        stride: usize,
        grid_size: usize,
    },

    /// The height grid has no cells.
    #[error("cannot mesh an empty height grid")]
    EmptyGrid,
}
