//! Hyperparameter configuration for the learning agents

use serde::{Deserialize, Serialize};

/// ε-greedy exploration schedule
///
/// ε starts at `start`, is multiplied by `decay` after every finished episode
/// and never drops below `min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Initial exploration rate
    ///
    /// Default: 1.0
    pub start: f32,

    /// Exploration floor
    ///
    /// Default: 0.01
    pub min: f32,

    /// Multiplicative decay applied after each completed episode
    ///
    /// Default: 0.995 for tabular agents, 0.997 for DQN
    pub decay: f32,
}

impl ExplorationConfig {
    /// Schedule starting at 1.0 with a 0.01 floor and the given decay
    pub fn with_decay(decay: f32) -> Self {
        Self {
            start: 1.0,
            min: 0.01,
            decay,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.start) {
            return Err(format!("epsilon start must be in [0, 1], got {}", self.start));
        }
        if !(0.0..=1.0).contains(&self.min) || self.min > self.start {
            return Err(format!(
                "epsilon min must be in [0, start], got {} (start {})",
                self.min, self.start
            ));
        }
        if self.decay <= 0.0 || self.decay > 1.0 {
            return Err(format!("epsilon decay must be in (0, 1], got {}", self.decay));
        }
        Ok(())
    }
}

/// Configuration shared by the Q-learning and SARSA agents
///
/// # Example
///
/// ```rust
/// use snake_rl::rl::TabularConfig;
///
/// let config = TabularConfig {
///     learning_rate: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.gamma, 0.9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Step size α of the temporal-difference update
    ///
    /// Default: 0.1
    pub learning_rate: f32,

    /// Discount factor γ
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Exploration schedule
    pub exploration: ExplorationConfig,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            gamma: 0.9,
            exploration: ExplorationConfig::with_decay(0.995),
        }
    }
}

impl TabularConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        self.exploration.validate()
    }
}

/// Configuration for the deep Q-network agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor used in the bootstrapped target
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Transitions sampled (with replacement) per training step
    ///
    /// Default: 32
    pub batch_size: usize,

    /// Replay memory capacity; the oldest transition is evicted first
    ///
    /// Default: 2000
    pub memory_capacity: usize,

    /// Units in each of the two hidden layers
    ///
    /// Default: 24
    pub hidden_units: usize,

    /// Exploration schedule. Decays slower than the tabular agents'.
    pub exploration: ExplorationConfig,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.9,
            batch_size: 32,
            memory_capacity: 2000,
            hidden_units: 24,
            exploration: ExplorationConfig::with_decay(0.997),
        }
    }
}

impl DqnConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.hidden_units == 0 {
            return Err("hidden_units must be at least 1".to_string());
        }
        if self.batch_size > self.memory_capacity {
            return Err(format!(
                "batch_size ({}) cannot exceed memory_capacity ({})",
                self.batch_size, self.memory_capacity
            ));
        }
        self.exploration.validate()
    }
}

/// Everything needed to build any of the learning agents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub tabular: TabularConfig,
    pub dqn: DqnConfig,
    /// Seed for exploration and replay sampling; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tabular.validate().map_err(|e| format!("tabular: {e}"))?;
        self.dqn.validate().map_err(|e| format!("dqn: {e}"))
    }
}
