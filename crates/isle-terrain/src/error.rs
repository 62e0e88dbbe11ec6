//! Recoverable terrain generation errors.

/// Conditions that degrade a generation run without aborting it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A satellite island could not be placed without violating the minimum
    /// separation within the attempt cap. The satellite is omitted.
    #[error("satellite island {index} could not be placed after {attempts} attempts")]
    IslandPlacementFailure {
        /// Index the satellite would have had in the island list.
        index: usize,
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The spiral spawn search found no surface point above the minimum height.
    #[error("no spawn surface found above minimum height after {steps} probe steps")]
    MissingSpawnSurface {
        /// Number of probe steps taken.
        steps: u32,
    },
}
