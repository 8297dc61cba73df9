use crate::constants::*;

/// Kill score is the only stored part; the time component is derived from elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub kill_score: u32,
}

impl Score {
    pub fn new() -> Self {
        Score { kill_score: 0 }
    }

    pub fn add_kill(&mut self) {
        self.kill_score = self.kill_score.saturating_add(SCORE_PER_KILL);
    }

    pub fn time_score(elapsed: f64) -> u32 {
        if elapsed.is_nan() || elapsed <= 0.0 {
            return 0;
        }
        (elapsed * TIME_SCORE_PER_SECOND).floor().min(u32::MAX as f64) as u32
    }

    pub fn total(&self, elapsed: f64) -> u32 {
        Score::time_score(elapsed).saturating_add(self.kill_score)
    }
}
