use anyhow::Result;
use serde::Serialize;

use crate::model::config::AppConfig;
use crate::model::park::{Park, ParkEvent};
use crate::model::snapshot::ParkSnapshot;
use crate::model::systems::population::PopulationEvent;
use pigeon_data::{CapturedPigeon, Position};

/// How long and how fast to run a headless session.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seconds: f64,
    pub fps: u64,
    /// Fixed player position held for the whole run.
    pub threat: Option<Position>,
}

impl RunOptions {
    #[must_use]
    pub fn frame_dt(&self) -> f64 {
        1.0 / self.fps.max(1) as f64
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        (self.seconds.max(0.0) * self.fps.max(1) as f64).round() as u64
    }
}

/// A capture after collection, with when and where it happened.
#[derive(Debug, Clone, Serialize)]
pub struct CollectedCapture {
    pub frame: u64,
    pub time: f64,
    pub station: u32,
    pub pigeon: CapturedPigeon,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub frames: u64,
    pub seed: Option<u64>,
    pub fingerprint: String,
    pub spawns: u64,
    pub forced_flees: u64,
    pub despawns: u64,
    pub captures: Vec<CollectedCapture>,
    pub earnings: u64,
    pub snapshot: ParkSnapshot,
}

/// Headless driver: steps the park at a fixed frame rate and collects every
/// capture as soon as it happens.
pub struct App {
    pub running: bool,
    pub park: Park,
    pub captures: Vec<CollectedCapture>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let park = Park::new(config)?;
        Ok(Self {
            running: true,
            park,
            captures: Vec::new(),
        })
    }

    /// Runs one frame and handles its events.
    pub fn step(&mut self, dt: f64, threat: Option<Position>) {
        for event in self.park.update(dt, threat) {
            match event {
                ParkEvent::Captured(capture) => {
                    if let Some(pigeon) = self.park.collect_capture(capture.station) {
                        self.captures.push(CollectedCapture {
                            frame: self.park.frame,
                            time: self.park.time,
                            station: capture.station.0,
                            pigeon,
                        });
                    }
                }
                ParkEvent::Population(PopulationEvent::Spawned { species, region, .. }) => {
                    tracing::debug!(frame = self.park.frame, species = %species, region = region.0, "Spawned");
                }
                ParkEvent::Population(_) => {}
            }
        }
    }

    pub fn run(&mut self, options: &RunOptions) -> RunReport {
        let dt = options.frame_dt();
        let frames = options.frames();
        for _ in 0..frames {
            if !self.running {
                break;
            }
            self.step(dt, options.threat);
        }
        self.report()
    }

    #[must_use]
    pub fn report(&self) -> RunReport {
        let metrics = &self.park.metrics;
        RunReport {
            frames: metrics.frame_count(),
            seed: self.park.config.world.seed,
            fingerprint: self.park.config.fingerprint(),
            spawns: metrics.spawns(),
            forced_flees: metrics.forced_flees(),
            despawns: metrics.despawns(),
            earnings: self
                .captures
                .iter()
                .map(|c| u64::from(c.pigeon.price()))
                .sum(),
            captures: self.captures.clone(),
            snapshot: self.park.snapshot(),
        }
    }
}
