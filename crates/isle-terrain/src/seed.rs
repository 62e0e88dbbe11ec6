//! Deterministic seed derivation.
//!
//! Every random stream in a generation run is derived from the single world
//! seed, so the same seed reproduces the same island, textures and placements.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Exclusive upper bound for seeds drawn from the process-wide source.
pub const MAX_RANDOM_SEED: i32 = 100_000;

/// The independent random streams a generation run consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeedStage {
    /// Satellite island angles and distances.
    IslandPlacement,
    /// Object scatter jitter, roulette draws and yaw.
    Scatter,
}

/// Derive a u64 seed for one stage from the world seed.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine the world seed with the
/// stage tag into a well-distributed u64.
pub fn derive_stage_seed(world_seed: i32, stage: SeedStage) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for one stage of a run.
pub fn stage_rng(world_seed: i32, stage: SeedStage) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stage_seed(world_seed, stage))
}

/// Deterministic RNG seeded directly from a noise seed.
pub fn seeded_rng(seed: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as i64 as u64)
}

/// Draw a fresh world seed in `[0, MAX_RANDOM_SEED)` from the thread-local RNG.
pub fn random_world_seed() -> i32 {
    rand::rng().random_range(0..MAX_RANDOM_SEED)
}
