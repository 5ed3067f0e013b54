use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Scan phases that are timed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTiming {
    Allocate,
    Load,
    Scan,
    Save,
}

#[derive(Debug, Default)]
pub struct ScanMetrics {
    // Task outcomes
    pub tasks_started: AtomicUsize,
    pub tasks_completed: AtomicUsize,
    pub tasks_paused: AtomicUsize,
    pub load_failures: AtomicUsize,
    pub renderer_failures: AtomicUsize,

    // Phase timings
    pub total_allocate_us: AtomicU64,
    pub total_load_us: AtomicU64,
    pub total_scan_us: AtomicU64,
    pub total_save_us: AtomicU64,
    pub max_load_us: AtomicU64,

    // Phases that ran to completion, the divisor for per-region averages
    pub allocate_runs: AtomicUsize,
    pub load_runs: AtomicUsize,
    pub scan_runs: AtomicUsize,
    pub save_runs: AtomicUsize,

    pub chunks_loaded: AtomicUsize,

    // Session
    pub start_time: Option<Instant>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_started(&self) {
        self.tasks_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_paused(&self) {
        self.tasks_paused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_renderer_failure(&self) {
        self.renderer_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed phase of one task.
    pub fn record_phase(&self, phase: PhaseTiming, duration: Duration) {
        let us = duration.as_micros() as u64;
        let (total, runs) = match phase {
            PhaseTiming::Allocate => (&self.total_allocate_us, &self.allocate_runs),
            PhaseTiming::Load => {
                self.max_load_us.fetch_max(us, Ordering::Relaxed);
                (&self.total_load_us, &self.load_runs)
            }
            PhaseTiming::Scan => (&self.total_scan_us, &self.scan_runs),
            PhaseTiming::Save => (&self.total_save_us, &self.save_runs),
        };
        total.fetch_add(us, Ordering::Relaxed);
        runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunks_loaded(&self, count: usize) {
        self.chunks_loaded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();
        let started = self.tasks_started.load(Ordering::Relaxed);
        let completed = self.tasks_completed.load(Ordering::Relaxed);
        let paused = self.tasks_paused.load(Ordering::Relaxed);
        let load_failures = self.load_failures.load(Ordering::Relaxed);
        let renderer_failures = self.renderer_failures.load(Ordering::Relaxed);

        let ms = |counter: &AtomicU64| counter.load(Ordering::Relaxed) as f64 / 1000.0;
        let avg = |total: &AtomicU64, runs: &AtomicUsize| match runs.load(Ordering::Relaxed) {
            0 => 0.0,
            runs => ms(total) / runs as f64,
        };

        format!(
            "TileMC Scan Report\n\
             ==================\n\
             Session Duration: {:.2?}\n\n\
             [Tasks]\n\
             Started: {}\n\
             Completed: {}\n\
             Paused: {}\n\
             Load Failures: {}\n\
             Renderer Failures: {}\n\n\
             [Phases]\n\
             Allocate: {:.2} ms/region\n\
             Load: {:.2} ms/region (max {:.2} ms)\n\
             Scan: {:.2} ms/region\n\
             Save: {:.2} ms/region\n\
             Chunks Loaded: {}\n",
            uptime,
            started, completed, paused, load_failures, renderer_failures,
            avg(&self.total_allocate_us, &self.allocate_runs),
            avg(&self.total_load_us, &self.load_runs), ms(&self.max_load_us),
            avg(&self.total_scan_us, &self.scan_runs),
            avg(&self.total_save_us, &self.save_runs),
            self.chunks_loaded.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_timings_accumulate() {
        let metrics = ScanMetrics::new();
        metrics.record_phase(PhaseTiming::Load, Duration::from_micros(300));
        metrics.record_phase(PhaseTiming::Load, Duration::from_micros(100));
        metrics.record_phase(PhaseTiming::Save, Duration::from_micros(50));

        assert_eq!(metrics.total_load_us.load(Ordering::Relaxed), 400);
        assert_eq!(metrics.max_load_us.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.total_save_us.load(Ordering::Relaxed), 50);
        assert_eq!(metrics.total_scan_us.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_report_lists_outcomes() {
        let metrics = ScanMetrics::new();
        metrics.record_started();
        metrics.record_started();
        metrics.record_completed();
        metrics.record_load_failure();

        let report = metrics.generate_report();
        assert!(report.contains("Started: 2"));
        assert!(report.contains("Completed: 1"));
        assert!(report.contains("Load Failures: 1"));
        assert!(report.contains("Renderer Failures: 0"));
    }

    #[test]
    fn test_averages_count_only_completed_phases() {
        let metrics = ScanMetrics::new();
        for _ in 0..4 {
            metrics.record_started();
        }
        // every task allocated, only one got as far as saving
        for _ in 0..4 {
            metrics.record_phase(PhaseTiming::Allocate, Duration::from_millis(2));
        }
        metrics.record_phase(PhaseTiming::Save, Duration::from_millis(6));

        assert_eq!(metrics.allocate_runs.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.save_runs.load(Ordering::Relaxed), 1);
        let report = metrics.generate_report();
        assert!(report.contains("Allocate: 2.00 ms/region"));
        assert!(report.contains("Save: 6.00 ms/region"));
        assert!(report.contains("Scan: 0.00 ms/region"));
    }
}
