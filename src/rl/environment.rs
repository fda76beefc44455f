//! Grid environment driven by the episode loop
//!
//! Owns the game engine and the live round, and exposes the RL-facing view:
//! reset, step with a direction, and the encoded observation.

use super::observation::{EncodedState, encode_state};
use crate::game::{CollisionType, Direction, GameConfig, GameEngine, GameState};

/// What a single step produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub done: bool,
    pub ate_food: bool,
    pub collision: Option<CollisionType>,
    pub starved: bool,
}

/// Snake environment for reinforcement learning
///
/// # Example
///
/// ```rust
/// use snake_rl::game::{Direction, GameConfig};
/// use snake_rl::rl::GridEnvironment;
///
/// let mut env = GridEnvironment::with_seed(GameConfig::default(), 7);
/// let outcome = env.step(Direction::Left);
///
/// assert!(!outcome.done);
/// assert_eq!(env.state().snake.len(), 3);
/// ```
pub struct GridEnvironment {
    engine: GameEngine,
    state: GameState,
}

impl GridEnvironment {
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }

    /// Environment whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_engine(GameEngine::with_seed(config, seed))
    }

    fn from_engine(mut engine: GameEngine) -> Self {
        let state = engine.reset();
        Self { engine, state }
    }

    /// Start a new round and return its first observation
    pub fn reset_round(&mut self) -> EncodedState {
        self.state = self.engine.reset();
        self.encode()
    }

    /// Advance the round by one move
    ///
    /// Reversing directions are ignored. Stepping a finished round is a no-op
    /// that reports `done`.
    pub fn step(&mut self, direction: Direction) -> StepOutcome {
        let result = self.engine.step(&mut self.state, direction);
        StepOutcome {
            reward: result.reward,
            done: result.terminated,
            ate_food: result.info.ate_food,
            collision: result.info.collision_type,
            starved: result.info.starved,
        }
    }

    /// Encode the current snapshot
    pub fn encode(&self) -> EncodedState {
        encode_state(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the live round with a prepared snapshot
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn direction(&self) -> Direction {
        self.state.direction()
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }
}
