//! telemetry/timers.rs
//! Stage timers for the pipeline.
//!
//! Summary: accumulates time spent reading, encrypting, reordering, writing,
//! and waiting on admission. Worker times add up across threads, so the sum
//! can exceed wall-clock elapsed.

use std::collections::{hash_map, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Read,
    Encrypt,
    Reorder,
    Write,
    Wait,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read    => "read",
            Stage::Encrypt => "encrypt",
            Stage::Reorder => "reorder",
            Stage::Write   => "write",
            Stage::Wait    => "wait",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    /// Time `f` and charge it to `stage`.
    pub fn measure<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add(stage, start.elapsed());
        out
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn total(&self) -> Duration {
        self.times.values().copied().sum()
    }

    pub fn merge(&mut self, other: &StageTimes) {
        for (stage, dur) in other {
            self.add(*stage, *dur);
        }
    }

    /// Check if all expected stages were measured (non-zero).
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.get(*s) > Duration::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stage, &Duration)> {
        self.times.iter()
    }

    /// One-line `stage=ms` summary, sorted by stage name.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .times
            .iter()
            .map(|(stage, dur)| format!("{}={:.3}ms", stage, dur.as_secs_f64() * 1_000.0))
            .collect();
        parts.sort();
        parts.join(" ")
    }
}

impl<'a> IntoIterator for &'a StageTimes {
    type Item = (&'a Stage, &'a Duration);
    type IntoIter = hash_map::Iter<'a, Stage, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.times.iter()
    }
}

#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            stage_times: StageTimes::default(),
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    pub fn elapsed(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => Instant::now().duration_since(self.start_time),
        }
    }
}
