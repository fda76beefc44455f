//! Q-value approximator for the DQN agent
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 7]
//!   ↓ Linear(7 → 24) + ReLU
//!   ↓ Linear(24 → 24) + ReLU
//!   ↓ Linear(24 → 4)
//! Output: [batch, 4] action values (up, down, left, right)
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_rl::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(24).init::<Backend>(&device);
//!
//! let states = Tensor::zeros([5, 7], &device);
//! assert_eq!(network.forward(states).dims(), [5, 4]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};

use super::observation::FEATURE_COUNT;
use crate::game::NUM_ACTIONS;

/// Configuration for the Q-network
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Input features (default: 7)
    pub input_dim: usize,

    /// Units in each hidden layer
    pub hidden_units: usize,

    /// Output action values (default: 4)
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_units: usize) -> Self {
        Self {
            input_dim: FEATURE_COUNT,
            hidden_units,
            num_actions: NUM_ACTIONS,
        }
    }

    /// Initialize the network with fresh random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden1: LinearConfig::new(self.input_dim, self.hidden_units).init(device),
            hidden2: LinearConfig::new(self.hidden_units, self.hidden_units).init(device),
            output: LinearConfig::new(self.hidden_units, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(24)
    }
}

/// Feed-forward Q-network
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden1: Linear<B>,
    hidden2: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// `[batch, 7]` features to `[batch, 4]` action values
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden1.forward(states));
        let x = relu(self.hidden2.forward(x));
        self.output.forward(x)
    }
}
