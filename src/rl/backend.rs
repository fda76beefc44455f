//! Burn backend aliases
//!
//! The DQN approximator is tiny (892 parameters), so the CPU `NdArray`
//! backend is all the agent needs.
//!
//! # Example
//!
//! ```rust
//! use snake_rl::rl::{DeepQAgent, DqnConfig, TrainingBackend, default_device};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let agent = DeepQAgent::<TrainingBackend>::new(
//!     DqnConfig::default(),
//!     StdRng::seed_from_u64(0),
//!     default_device(),
//! );
//! assert_eq!(agent.memory().len(), 0);
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend the DQN agent trains on
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Gradient-free counterpart, used for action selection and targets
pub type InferenceBackend = NdArray<f32>;

pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
