//! Stress command handler.
//!
//! Runs background workers and a primary "render" loop against one
//! simulated device, all sharing a [`DeviceLendingService`], then reports
//! how long each tier waited for its leases.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hudlend_core::graphics::{
    DesignatedThread, DeviceLendingService, LendingSnapshot, Priority,
};
use rand::Rng;
use serde::Serialize;

use crate::error::CliError;

/// Time the primary thread spends between frames, outside the lease.
const FRAME_GAP: Duration = Duration::from_micros(200);

/// Workload parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressConfig {
    pub workers: usize,
    pub cycles: usize,
    pub frames: usize,
    pub high_ratio: f64,
}

impl StressConfig {
    fn validate(&self) -> Result<(), CliError> {
        if !(0.0..=1.0).contains(&self.high_ratio) {
            return Err(CliError::Arguments(format!(
                "--high-ratio must be between 0.0 and 1.0, got {}",
                self.high_ratio
            )));
        }
        if self.workers == 0 && self.frames == 0 {
            return Err(CliError::Arguments(
                "nothing to do: both --workers and --frames are 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Device stand-in: counts what was done with it.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    frames: u64,
    uploads: u64,
}

/// Wait-time statistics for one group of requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WaitStats {
    pub grants: u64,
    pub total_wait_us: u64,
    pub max_wait_us: u64,
}

impl WaitStats {
    fn record(&mut self, waited: Duration) {
        let micros = u64::try_from(waited.as_micros()).unwrap_or(u64::MAX);
        self.grants += 1;
        self.total_wait_us = self.total_wait_us.saturating_add(micros);
        self.max_wait_us = self.max_wait_us.max(micros);
    }

    fn merge(&mut self, other: Self) {
        self.grants += other.grants;
        self.total_wait_us = self.total_wait_us.saturating_add(other.total_wait_us);
        self.max_wait_us = self.max_wait_us.max(other.max_wait_us);
    }

    /// Mean wait in microseconds, 0 when nothing was granted.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_wait_us(&self) -> f64 {
        if self.grants == 0 {
            0.0
        } else {
            self.total_wait_us as f64 / self.grants as f64
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerStats {
    high: WaitStats,
    low: WaitStats,
}

/// Outcome of a stress run.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub workers: usize,
    pub elapsed_ms: u64,
    pub frames_rendered: u64,
    pub uploads: u64,
    pub primary: WaitStats,
    pub worker_high: WaitStats,
    pub worker_low: WaitStats,
    pub final_state: LendingSnapshot,
}

/// Execute the stress command and print the report.
pub fn execute(out: &mut impl Write, config: StressConfig, json: bool) -> Result<(), CliError> {
    let report = run(config)?;

    let written = if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    } else {
        write_summary(out, &report)
    };
    written.map_err(|e| CliError::Output(e.to_string()))
}

/// Run the workload on the calling thread (as primary) plus `workers`
/// background threads.
pub fn run(config: StressConfig) -> Result<StressReport, CliError> {
    config.validate()?;

    let service = DeviceLendingService::new(
        SimulatedDevice::default(),
        Arc::new(DesignatedThread::current()),
    );
    let started = Instant::now();

    tracing::info!(
        workers = config.workers,
        cycles = config.cycles,
        frames = config.frames,
        high_ratio = config.high_ratio,
        "Starting stress run"
    );

    let (primary, worker_results) = thread::scope(|s| {
        let service = &service;
        let handles: Vec<_> = (0..config.workers)
            .map(|_| s.spawn(move || upload_loop(service, config.cycles, config.high_ratio)))
            .collect();

        let primary = render_loop(service, config.frames);
        let results: Vec<_> = handles.into_iter().map(thread::ScopedJoinHandle::join).collect();
        (primary, results)
    });

    let mut worker_high = WaitStats::default();
    let mut worker_low = WaitStats::default();
    for (index, result) in worker_results.into_iter().enumerate() {
        let stats = result.map_err(|_| CliError::Worker(format!("worker {index} panicked")))?;
        worker_high.merge(stats.high);
        worker_low.merge(stats.low);
    }

    let (frames_rendered, uploads) = {
        let device = service.lend(Priority::High);
        (device.frames, device.uploads)
    };

    let report = StressReport {
        workers: config.workers,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        frames_rendered,
        uploads,
        primary,
        worker_high,
        worker_low,
        final_state: service.snapshot(),
    };

    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        grants = report.final_state.total_grants,
        "Stress run finished"
    );
    Ok(report)
}

fn render_loop(service: &DeviceLendingService<SimulatedDevice>, frames: usize) -> WaitStats {
    let mut stats = WaitStats::default();
    for _ in 0..frames {
        let requested = Instant::now();
        // Promoted to high: this is the primary thread.
        let mut device = service.lend(Priority::Low);
        stats.record(requested.elapsed());
        device.frames += 1;
        drop(device);
        thread::sleep(FRAME_GAP);
    }
    stats
}

fn upload_loop(
    service: &DeviceLendingService<SimulatedDevice>,
    cycles: usize,
    high_ratio: f64,
) -> WorkerStats {
    let mut rng = rand::thread_rng();
    let mut stats = WorkerStats::default();

    for _ in 0..cycles {
        let priority = Priority::from(rng.gen_bool(high_ratio));
        let requested = Instant::now();
        let mut device = service.lend(priority);
        let waited = requested.elapsed();
        device.uploads += 1;
        drop(device);

        match priority {
            Priority::High => stats.high.record(waited),
            Priority::Low => stats.low.record(waited),
        }
    }
    stats
}

fn write_summary(out: &mut impl Write, report: &StressReport) -> std::io::Result<()> {
    writeln!(out, "workers = {}", report.workers)?;
    writeln!(out, "elapsed_ms = {}", report.elapsed_ms)?;
    writeln!(out, "frames_rendered = {}", report.frames_rendered)?;
    writeln!(out, "uploads = {}", report.uploads)?;
    for (label, stats) in [
        ("primary", &report.primary),
        ("worker_high", &report.worker_high),
        ("worker_low", &report.worker_low),
    ] {
        writeln!(
            out,
            "{label} = grants {} / mean wait {:.1}us / max wait {}us",
            stats.grants,
            stats.mean_wait_us(),
            stats.max_wait_us
        )?;
    }
    writeln!(out, "total_grants = {}", report.final_state.total_grants)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize, cycles: usize, frames: usize, high_ratio: f64) -> StressConfig {
        StressConfig {
            workers,
            cycles,
            frames,
            high_ratio,
        }
    }

    #[test]
    fn test_every_request_is_granted_once() {
        let report = run(config(3, 50, 10, 0.5)).unwrap();

        assert_eq!(report.frames_rendered, 10);
        assert_eq!(report.uploads, 150);
        assert_eq!(report.primary.grants, 10);
        assert_eq!(report.worker_high.grants + report.worker_low.grants, 150);
        // +1 for the lease used to read the totals.
        assert_eq!(report.final_state.total_grants, 161);
        assert!(report.final_state.is_idle());
    }

    #[test]
    fn test_all_low_ratio_never_requests_high() {
        let report = run(config(2, 20, 0, 0.0)).unwrap();
        assert_eq!(report.worker_high.grants, 0);
        assert_eq!(report.worker_low.grants, 40);
    }

    #[test]
    fn test_invalid_ratio_is_rejected() {
        let err = run(config(1, 1, 1, 1.5)).unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }

    #[test]
    fn test_json_output_parses() {
        let mut out = Vec::new();
        execute(&mut out, config(1, 5, 2, 0.2), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["uploads"], 5);
        assert_eq!(value["frames_rendered"], 2);
    }

    #[test]
    fn test_text_summary_lists_tiers() {
        let mut out = Vec::new();
        execute(&mut out, config(1, 5, 2, 0.2), false).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("primary = grants 2"));
        assert!(output.contains("worker_low = "));
        assert!(output.contains("total_grants = 8"));
    }

    #[test]
    fn test_mean_wait_of_empty_stats_is_zero() {
        assert!(WaitStats::default().mean_wait_us().abs() < f64::EPSILON);
    }
}
