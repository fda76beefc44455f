//! Reinforcement learning subsystem
//!
//! - [`GridEnvironment`]: reset/step over the game engine
//! - [`encode_state`]: the seven-flag observation shared by every agent
//! - [`Agent`]: the trait the episode loop drives, implemented by
//!   [`QLearningAgent`], [`SarsaAgent`] and [`DeepQAgent`]

pub mod agent;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod environment;
pub mod network;
pub mod observation;
pub mod q_learning;
pub mod q_table;
pub mod sarsa;

pub use agent::{Agent, AgentKind, Experience, Exploration, create_agent};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::{ReplayBuffer, Transition};
pub use config::{AgentConfig, DqnConfig, ExplorationConfig, TabularConfig};
pub use dqn::DeepQAgent;
pub use environment::{GridEnvironment, StepOutcome};
pub use network::{QNetwork, QNetworkConfig};
pub use observation::{EncodedState, FEATURE_COUNT, StateKey, encode_state};
pub use q_learning::QLearningAgent;
pub use q_table::QTable;
pub use sarsa::SarsaAgent;
