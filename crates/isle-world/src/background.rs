//! Off-thread world generation with all-or-nothing cancellation.
//!
//! Jobs run on named worker threads fed through a channel. Each job carries a
//! cancellation flag that the pipeline checks before every stage; a cancelled
//! job produces no result at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use dashmap::DashMap;
use isle_terrain::seed::random_world_seed;

use crate::error::WorldError;
use crate::pipeline::{GeneratedWorld, Stage, generate_world_checked};
use crate::settings::WorldSettings;

/// Handle for a submitted job.
pub type JobId = u64;

/// A finished background run.
#[derive(Debug)]
pub struct CompletedWorld {
    pub job: JobId,
    pub world: Arc<GeneratedWorld>,
    /// Wall time spent in the pipeline.
    pub generation_time: Duration,
}

struct Job {
    id: JobId,
    seed: i32,
    settings: WorldSettings,
    cancelled: Arc<AtomicBool>,
}

/// Runs generation jobs on a small pool of worker threads.
pub struct BackgroundGenerator {
    job_sender: Option<Sender<Job>>,
    result_receiver: Receiver<CompletedWorld>,
    active: Arc<DashMap<JobId, Arc<AtomicBool>>>,
    next_id: AtomicU64,
    workers: Vec<JoinHandle<()>>,
}

impl BackgroundGenerator {
    /// Spawn `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Result<Self, WorldError> {
        let (job_sender, job_receiver) = unbounded::<Job>();
        let (result_sender, result_receiver) = unbounded::<CompletedWorld>();
        let active: Arc<DashMap<JobId, Arc<AtomicBool>>> = Arc::new(DashMap::new());

        let mut workers = Vec::new();
        for n in 0..worker_count.max(1) {
            let jobs = job_receiver.clone();
            let results = result_sender.clone();
            let active = Arc::clone(&active);
            let handle = std::thread::Builder::new()
                .name(format!("isle-gen-worker-{n}"))
                .spawn(move || worker_loop(&jobs, &results, &active))
                .map_err(WorldError::WorkerSpawn)?;
            workers.push(handle);
        }

        Ok(Self {
            job_sender: Some(job_sender),
            result_receiver,
            active,
            next_id: AtomicU64::new(1),
            workers,
        })
    }

    /// Queue a run. `seed` overrides `settings.seed`; with neither, a random
    /// seed is drawn now so the job's seed is fixed at submission.
    pub fn submit(&self, settings: &WorldSettings, seed: Option<i32>) -> Result<JobId, WorldError> {
        let sender = self.job_sender.as_ref().ok_or(WorldError::WorkersStopped)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let seed = seed.or(settings.seed).unwrap_or_else(random_world_seed);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active.insert(id, Arc::clone(&cancelled));

        let job = Job {
            id,
            seed,
            settings: settings.clone(),
            cancelled,
        };
        if sender.send(job).is_err() {
            self.active.remove(&id);
            return Err(WorldError::WorkersStopped);
        }
        tracing::debug!(job = id, seed, "generation job queued");
        Ok(id)
    }

    /// Cancel a queued or running job. Returns `false` when the job is
    /// unknown or already finished.
    pub fn cancel(&self, job: JobId) -> bool {
        cancel_job(&self.active, job)
    }

    pub fn is_pending(&self, job: JobId) -> bool {
        self.active.contains_key(&job)
    }

    /// Jobs queued or running and not cancelled.
    pub fn in_flight_count(&self) -> usize {
        self.active.len()
    }

    /// Every world finished since the last call.
    pub fn drain_results(&self) -> Vec<CompletedWorld> {
        self.result_receiver.try_iter().collect()
    }

    /// Block up to `timeout` for the next finished world.
    pub fn wait_result(&self, timeout: Duration) -> Option<CompletedWorld> {
        self.result_receiver.recv_timeout(timeout).ok()
    }
}

impl Drop for BackgroundGenerator {
    fn drop(&mut self) {
        for entry in self.active.iter() {
            entry.value().store(true, Ordering::Relaxed);
        }
        // Closing the queue ends each worker loop.
        self.job_sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("generation worker panicked");
            }
        }
    }
}

/// Whoever removes the job's entry first decides its fate: `cancel` wins and
/// the run is discarded, or the worker wins and the world is published.
fn cancel_job(active: &DashMap<JobId, Arc<AtomicBool>>, job: JobId) -> bool {
    match active.remove(&job) {
        Some((_, flag)) => {
            flag.store(true, Ordering::Relaxed);
            true
        }
        None => false,
    }
}

fn worker_loop(
    jobs: &Receiver<Job>,
    results: &Sender<CompletedWorld>,
    active: &DashMap<JobId, Arc<AtomicBool>>,
) {
    while let Ok(job) = jobs.recv() {
        if !run_job(&job, results, active, |_| {}) {
            break;
        }
    }
}

/// Run one job; `on_stage` sees each stage that passed its cancellation
/// check. Returns `false` once nobody is listening for results.
fn run_job(
    job: &Job,
    results: &Sender<CompletedWorld>,
    active: &DashMap<JobId, Arc<AtomicBool>>,
    mut on_stage: impl FnMut(Stage),
) -> bool {
    let start = Instant::now();
    let outcome = generate_world_checked(&job.settings, job.seed, |stage| {
        if job.cancelled.load(Ordering::Relaxed) {
            return Err(stage);
        }
        on_stage(stage);
        Ok(())
    });

    match outcome {
        Ok(world) => {
            if active.remove(&job.id).is_none() {
                log_abandoned(job.id, None);
                return true;
            }
            let completed = CompletedWorld {
                job: job.id,
                world: Arc::new(world),
                generation_time: start.elapsed(),
            };
            results.send(completed).is_ok()
        }
        Err(stage) => {
            log_abandoned(job.id, Some(stage));
            true
        }
    }
}

fn log_abandoned(job: JobId, stage: Option<Stage>) {
    tracing::debug!(job, ?stage, "generation job cancelled; result discarded");
}
