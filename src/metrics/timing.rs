//! Timing helpers shared by the phases

use std::time::Instant;

use crate::metrics::phase_metric;

/// Records the elapsed time of a driver stage when dropped
pub struct TimingGuard {
    start: Instant,
    stage: &'static str,
}

impl TimingGuard {
    pub fn new(stage: &'static str) -> Self {
        Self { start: Instant::now(), stage }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        ::metrics::histogram!(
            phase_metric!(histogram, "driver", "stage_duration_seconds"),
            "stage" => self.stage
        )
        .record(self.elapsed_secs());
    }
}

/// Start timing a stage; the duration is recorded when the guard goes out of scope
pub fn time_stage(stage: &'static str) -> TimingGuard {
    TimingGuard::new(stage)
}
