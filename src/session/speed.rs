//! Simulation speed presets
//!
//! Speed changes how often the loop ticks and how often agent runs are
//! redrawn. It never changes what happens inside a tick.

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::rl::AgentKind;

/// Shortest tick interval a human can be asked to keep up with
const HUMAN_MIN_TICK: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    /// 100 ms per step, every step drawn
    #[default]
    Normal,
    /// 70 ms per step, agents drawn every 5th step
    Fast,
    /// As fast as possible, agents drawn every 50th step
    Hyper,
}

impl SpeedMode {
    /// Delay between ticks. Zero means "run back to back".
    pub fn tick_interval(&self, kind: AgentKind) -> Duration {
        let interval = match self {
            SpeedMode::Normal => Duration::from_millis(100),
            SpeedMode::Fast => Duration::from_millis(70),
            SpeedMode::Hyper => Duration::ZERO,
        };
        if kind.is_human() {
            interval.max(HUMAN_MIN_TICK)
        } else {
            interval
        }
    }

    /// Redraw cadence in game steps. Human play is always drawn.
    pub fn render_every(&self, kind: AgentKind) -> u32 {
        if kind.is_human() {
            return 1;
        }
        match self {
            SpeedMode::Normal => 1,
            SpeedMode::Fast => 5,
            SpeedMode::Hyper => 50,
        }
    }

    /// Whether a frame is due after the round reached `steps`
    pub fn should_render(&self, kind: AgentKind, steps: u32) -> bool {
        steps % self.render_every(kind) == 0
    }

    /// Normal → Fast → Hyper → Normal
    pub fn next(&self) -> SpeedMode {
        match self {
            SpeedMode::Normal => SpeedMode::Fast,
            SpeedMode::Fast => SpeedMode::Hyper,
            SpeedMode::Hyper => SpeedMode::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedMode::Normal => "Normal",
            SpeedMode::Fast => "Fast",
            SpeedMode::Hyper => "HYPER",
        }
    }
}

impl fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
