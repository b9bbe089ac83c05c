use std::time::{Duration, Instant};

use crate::game::Phase;

/// Play statistics for the current process. Nothing here outlives the run.
pub struct GameMetrics {
    /// Set while the clock is running
    running_since: Option<Instant>,
    /// Time played in the current game, excluding pauses
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    last_phase: Phase,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            last_phase: Phase::NotStarted,
        }
    }

    /// Follow the game's phase and score; call once per observed snapshot
    pub fn observe(&mut self, phase: Phase, score: u32) {
        self.observe_at(phase, score, Instant::now());
    }

    fn observe_at(&mut self, phase: Phase, score: u32, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.elapsed_time += now.saturating_duration_since(since);
        }

        if phase == Phase::NotStarted && self.last_phase != Phase::NotStarted {
            self.elapsed_time = Duration::ZERO;
        }

        if phase == Phase::Over && self.last_phase != Phase::Over {
            self.on_game_over(score);
        }

        if phase == Phase::Running {
            self.running_since = Some(now);
        }
        self.last_phase = phase;
    }

    fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
