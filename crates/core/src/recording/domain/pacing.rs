use std::time::Duration;

/// Decides how many output frame slots a recording owes at a given instant,
/// keeping the recorded timeline locked to wall-clock time at a fixed rate.
///
/// `recorded` is the timeline position derived from the logical frame
/// counter (frames / fps), not a wall-clock measurement; once frames exist
/// it is the authoritative definition of recorded duration.
#[derive(Clone, Copy, Debug)]
pub struct PacingEngine {
    fps: f64,
}

impl PacingEngine {
    pub fn new(fps: f32) -> Self {
        Self { fps: fps as f64 }
    }

    /// Number of output slots behind schedule after `elapsed` wall-clock
    /// time with `recorded` seconds already on the timeline.
    ///
    /// Never negative, and non-decreasing in `elapsed` for a fixed
    /// `recorded`.
    pub fn frames_due(&self, elapsed: Duration, recorded: Duration) -> usize {
        let delta = elapsed.as_secs_f64() - recorded.as_secs_f64();
        if delta <= 0.0 {
            return 0;
        }
        (delta * self.fps).floor() as usize
    }

    /// How many copies of a newly supplied frame to enqueue.
    ///
    /// At least one: a submission is never discarded, and the first frame of
    /// a session establishes the timeline even when nothing is due yet.
    pub fn replication(&self, elapsed: Duration, recorded: Duration) -> usize {
        self.frames_due(elapsed, recorded).max(1)
    }
}
