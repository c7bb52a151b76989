//! Benchmark harness
//!
//! Orchestrates one run: acquires the target, builds one worker per thread,
//! launches them together, joins them, and times the whole thing.
//!
//! # Ownership
//!
//! The target is owned here and lent to workers as `&dyn Target` inside a
//! thread scope, so it is released only after the last worker has joined.
//! Results go into a [`ResultSet`] sized to `thread_count` before any thread
//! starts; each worker gets a `&mut` to its own slot, so no lock is needed.
//!
//! # Randomness
//!
//! A root xoshiro256++ generator is seeded once (from `--seed` or the clock).
//! Worker `i` receives the root state advanced by `i` jumps of 2^128 draws,
//! which gives every worker its own non-overlapping stream.

use crate::config::validator::{validate_target_size, validate_workload};
use crate::config::{BenchmarkConfig, RuntimeConfig, TargetConfig};
use crate::target::{open_target, Target};
use crate::util::time::format_duration;
use crate::worker::{affinity, Worker, WorkerReport};
use crate::Result;
use anyhow::Context;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Per-worker results, indexed by worker ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    reports: Vec<WorkerReport>,
}

impl ResultSet {
    /// One empty slot per worker, each tagged with its ID
    fn with_slots(thread_count: usize) -> Self {
        let reports = (0..thread_count)
            .map(|id| WorkerReport { id, ..WorkerReport::default() })
            .collect();
        Self { reports }
    }

    /// Build a result set from finished reports, ordered by worker ID
    pub fn from_reports(mut reports: Vec<WorkerReport>) -> Self {
        reports.sort_by_key(|r| r.id);
        Self { reports }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerReport> {
        self.reports.iter()
    }

    /// Elapsed milliseconds of every worker, in ID order
    pub fn elapsed_ms(&self) -> Vec<f64> {
        self.reports.iter().map(WorkerReport::elapsed_ms).collect()
    }

    pub fn total_errors(&self) -> u64 {
        self.reports.iter().map(|r| r.errors).sum()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub results: ResultSet,
    /// From just before the first worker launch to just after the last join
    pub total_wall: Duration,
    /// Root seed, for reproducing the run
    pub seed: u64,
    /// Description of the target
    pub target: String,
}

/// Runs one benchmark
#[derive(Debug, Clone)]
pub struct Harness {
    workload: BenchmarkConfig,
    runtime: RuntimeConfig,
}

impl Harness {
    /// Create a harness for a validated workload
    pub fn new(workload: BenchmarkConfig, runtime: RuntimeConfig) -> Result<Self> {
        validate_workload(&workload)?;
        Ok(Self { workload, runtime })
    }

    /// Acquire the configured target, run against it, then release it
    pub fn run(&self, target_config: &TargetConfig) -> Result<RunOutcome> {
        let target = open_target(target_config)?;
        let outcome = self.run_on(target.as_ref());
        drop(target);
        outcome
    }

    /// Run against a target owned by the caller
    pub fn run_on(&self, target: &dyn Target) -> Result<RunOutcome> {
        let thread_count = self.workload.thread_count;
        validate_target_size(target.size(), self.workload.io_size)?;

        let seed = self.runtime.seed.unwrap_or_else(clock_seed);
        info!(
            threads = thread_count,
            requests = self.workload.requests_per_thread,
            total = self.workload.total_requests(),
            read_ratio = self.workload.read_ratio,
            io_size = self.workload.io_size,
            pattern = %self.workload.pattern,
            target = %target.describe(),
            seed,
            "starting run"
        );

        let mut root = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut workers = Vec::with_capacity(thread_count);
        for id in 0..thread_count {
            workers.push(Worker::new(id, &self.workload, target, root.clone())?);
            root.jump();
        }

        if self.runtime.pin_cpus {
            affinity::warn_if_oversubscribed(thread_count);
        }

        let pin_cpus = self.runtime.pin_cpus;
        let mut results = ResultSet::with_slots(thread_count);

        let start = Instant::now();
        let (panicked, spawn_error) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(thread_count);
            let mut spawn_error = None;
            for (mut worker, slot) in workers.into_iter().zip(results.reports.iter_mut()) {
                let spawned = thread::Builder::new()
                    .name(format!("pario-worker-{}", worker.id()))
                    .spawn_scoped(s, move || {
                        if pin_cpus {
                            affinity::pin_worker(worker.id());
                        }
                        *slot = worker.run();
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        spawn_error = Some(e);
                        break;
                    }
                }
            }

            // Join everything already running before reporting a spawn failure
            let panicked = handles.into_iter().filter_map(|h| h.join().err()).count();
            (panicked, spawn_error)
        });
        let total_wall = start.elapsed();

        if let Some(e) = spawn_error {
            return Err(e).context("Failed to spawn worker thread");
        }
        if panicked > 0 {
            anyhow::bail!("{} of {} worker threads panicked", panicked, thread_count);
        }

        debug!(wall = %format_duration(total_wall), errors = results.total_errors(), "all workers joined");

        Ok(RunOutcome {
            results,
            total_wall,
            seed,
            target: target.describe(),
        })
    }
}

/// Seed from the high-resolution clock
fn clock_seed() -> u64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    now.as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IoPattern;
    use crate::error::ConfigError;
    use crate::target::mock::{Fault, MockTarget};
    use crate::target::ram::RamTarget;
    use std::io::Write;

    fn workload(threads: usize, requests: u64, pattern: IoPattern) -> BenchmarkConfig {
        BenchmarkConfig {
            thread_count: threads,
            requests_per_thread: requests,
            read_ratio: 0.4,
            io_size: 4096,
            pattern,
        }
    }

    fn seeded(seed: u64) -> RuntimeConfig {
        RuntimeConfig { seed: Some(seed), pin_cpus: false }
    }

    #[test]
    fn test_result_set_has_one_slot_per_thread() {
        for threads in [1, 2, 7, 16] {
            let harness = Harness::new(workload(threads, 20, IoPattern::Random), seeded(1)).unwrap();
            let target = RamTarget::new(4 * 1024 * 1024).unwrap();

            let outcome = harness.run_on(&target).unwrap();
            assert_eq!(outcome.results.len(), threads);
            for (id, report) in outcome.results.iter().enumerate() {
                assert_eq!(report.id, id);
                assert_eq!(report.requests(), 20);
            }
        }
    }

    #[test]
    fn test_every_request_reaches_target() {
        let harness = Harness::new(workload(8, 125, IoPattern::RandomBlock), seeded(5)).unwrap();
        let target = MockTarget::new(1024 * 1024);

        let outcome = harness.run_on(&target).unwrap();
        assert_eq!(target.call_count(), 1000);
        assert_eq!(outcome.results.total_errors(), 0);
        assert_eq!(outcome.seed, 5);
        assert_eq!(outcome.target, "mock:1048576");
    }

    #[test]
    fn test_wall_time_covers_workers() {
        let harness = Harness::new(workload(4, 200, IoPattern::Sequential), seeded(9)).unwrap();
        let target = RamTarget::new(1024 * 1024).unwrap();

        let outcome = harness.run_on(&target).unwrap();
        for report in outcome.results.iter() {
            assert!(report.elapsed <= outcome.total_wall);
        }
    }

    #[test]
    fn test_workers_draw_independent_streams() {
        let harness = Harness::new(workload(2, 64, IoPattern::Random), seeded(77)).unwrap();
        let target = MockTarget::new(64 * 1024 * 1024);

        harness.run_on(&target).unwrap();
        let offsets: std::collections::HashSet<u64> =
            target.records().iter().map(|r| r.offset).collect();
        // Two workers replaying one stream would produce at most 64 distinct offsets
        assert!(offsets.len() > 64);
    }

    #[test]
    fn test_failed_request_does_not_stop_run() {
        let harness = Harness::new(workload(4, 50, IoPattern::Random), seeded(3)).unwrap();
        let target = MockTarget::new(1024 * 1024);
        target.inject(17, Fault::Short(10));

        let outcome = harness.run_on(&target).unwrap();
        assert_eq!(outcome.results.total_errors(), 1);
        assert_eq!(target.call_count(), 200);
        assert_eq!(outcome.results.len(), 4);
    }

    #[test]
    fn test_target_too_small() {
        let harness = Harness::new(workload(2, 10, IoPattern::Random), seeded(1)).unwrap();
        let target = MockTarget::new(4096);

        let err = harness.run_on(&target).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::TargetTooSmall { .. })));
        assert_eq!(target.call_count(), 0);
    }

    #[test]
    fn test_invalid_workload() {
        let err = Harness::new(workload(0, 10, IoPattern::Random), seeded(1)).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Zero { .. })));
    }

    #[test]
    fn test_run_against_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 256 * 1024]).unwrap();
        file.flush().unwrap();

        let harness = Harness::new(workload(4, 100, IoPattern::Random), seeded(11)).unwrap();
        let config = TargetConfig::Files { paths: vec![file.path().to_path_buf()], direct: false };

        let outcome = harness.run(&config).unwrap();
        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.results.total_errors(), 0);
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 256 * 1024);
    }

    #[test]
    fn test_sequential_writes_never_grow_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 10_000]).unwrap();
        file.flush().unwrap();

        let mut config = workload(1, 3, IoPattern::Sequential);
        config.read_ratio = 0.0;
        let harness = Harness::new(config, seeded(2)).unwrap();
        let target = TargetConfig::Files { paths: vec![file.path().to_path_buf()], direct: false };

        // Offsets 0, 4096, 8192: the last one would end at 12288
        let outcome = harness.run(&target).unwrap();
        let report = outcome.results.iter().next().unwrap();
        assert_eq!(report.writes, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 10_000);
    }

    #[test]
    fn test_run_against_ram() {
        let harness = Harness::new(workload(3, 100, IoPattern::Sequential), RuntimeConfig::default()).unwrap();

        let outcome = harness.run(&TargetConfig::Ram { size: 8 * 1024 * 1024 }).unwrap();
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.target.starts_with("ram:"));
    }

    #[test]
    fn test_pinned_run_completes() {
        let runtime = RuntimeConfig { seed: Some(4), pin_cpus: true };
        let harness = Harness::new(workload(2, 10, IoPattern::Random), runtime).unwrap();
        let target = RamTarget::new(1024 * 1024).unwrap();

        let outcome = harness.run_on(&target).unwrap();
        assert_eq!(outcome.results.len(), 2);
    }

    #[test]
    fn test_result_set_from_reports() {
        let reports = vec![
            WorkerReport { id: 1, elapsed: Duration::from_millis(200), ..Default::default() },
            WorkerReport { id: 0, elapsed: Duration::from_millis(100), errors: 2, ..Default::default() },
        ];
        let set = ResultSet::from_reports(reports);
        let elapsed = set.elapsed_ms();
        assert!((elapsed[0] - 100.0).abs() < 1e-9);
        assert!((elapsed[1] - 200.0).abs() < 1e-9);
        assert_eq!(set.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(set.total_errors(), 2);
        assert!(!set.is_empty());
    }
}
