//! Counters for park health and the tracing subscriber setup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Running totals for one park.
pub struct Metrics {
    frame_count: AtomicU64,
    population: AtomicU64,
    spawns: AtomicU64,
    captures: AtomicU64,
    forced_flees: AtomicU64,
    despawns: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("frames", &self.frame_count())
            .field("spawns", &self.spawns())
            .field("captures", &self.captures())
            .field("forced_flees", &self.forced_flees())
            .field("despawns", &self.despawns())
            .finish()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            spawns: AtomicU64::new(0),
            captures: AtomicU64::new(0),
            forced_flees: AtomicU64::new(0),
            despawns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed frame with its wall-clock duration.
    pub fn record_frame(&self, duration: Duration, population: usize, active_stations: usize) {
        self.frame_count.fetch_add(1, Ordering::Relaxed);
        self.population.store(population as u64, Ordering::Relaxed);

        let frame = self.frame_count.load(Ordering::Relaxed);
        if frame.is_multiple_of(1000) {
            tracing::info!(
                frame = frame,
                population = population,
                active_stations = active_stations,
                spawns = self.spawns(),
                captures = self.captures(),
                forced_flees = self.forced_flees(),
                despawns = self.despawns(),
                duration_us = duration.as_micros() as u64,
                "Park frame"
            );
        }
    }

    pub fn record_spawn(&self) {
        self.spawns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture(&self) {
        self.captures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forced_flee(&self) {
        self.forced_flees.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_despawn(&self) {
        self.despawns.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn spawns(&self) -> u64 {
        self.spawns.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn captures(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn forced_flees(&self) -> u64 {
        self.forced_flees.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn despawns(&self) -> u64 {
        self.despawns.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}
