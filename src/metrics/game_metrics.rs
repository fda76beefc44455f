use std::time::{Duration, Instant};

/// Wall-clock and throughput for the interactive session
pub struct Scoreboard {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    /// Ticks run since the session started
    pub ticks: u64,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            ticks: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_tick(&mut self) {
        self.ticks += 1;
    }

    /// Restart the clock for a new session
    pub fn on_session_reset(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.ticks = 0;
    }

    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs > 0.0 {
            self.ticks as f64 / secs
        } else {
            0.0
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}
