//! World orchestration errors.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A background worker thread could not be started.
    #[error("failed to spawn generation worker")]
    WorkerSpawn(#[source] io::Error),

    /// The worker pool has shut down and accepts no more jobs.
    #[error("generation workers have stopped")]
    WorkersStopped,
}
