//! Snake RL - a grid snake game played by a human or learned by an agent
//!
//! This library provides:
//! - Core game logic with shaped rewards (`game`)
//! - State encoding and the Q-learning, SARSA and DQN agents (`rl`)
//! - The observe-act-learn episode loop (`session`)
//! - Score chart and training statistics (`metrics`)
//! - Terminal UI and headless training (`modes`, `render`, `input`)

pub mod config;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
pub mod session;
