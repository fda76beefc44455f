//! Deep Q-network agent with experience replay
//!
//! Every environment step is stored in a bounded replay memory and followed by
//! one training step on a batch sampled with replacement. The regression
//! target for the taken action is `r` on terminal transitions and
//! `r + γ max_a' Q(s', a')` otherwise; the other actions keep their current
//! prediction so only the taken action contributes to the loss.

use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};
use rand::rngs::StdRng;

use super::agent::{Agent, AgentKind, Experience, Exploration, random_action};
use super::buffer::{ReplayBuffer, Transition};
use super::config::DqnConfig;
use super::network::{QNetwork, QNetworkConfig};
use super::observation::{EncodedState, FEATURE_COUNT, features_to_tensor};
use super::q_table::{ActionValues, argmax_first};
use crate::game::{Direction, NUM_ACTIONS};

/// DQN agent
///
/// `model` is `None` when no compute backend could be set up. The agent then
/// reports itself as not ready and acts uniformly at random.
pub struct DeepQAgent<B: AutodiffBackend> {
    model: Option<QNetwork<B>>,
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,
    memory: ReplayBuffer,
    config: DqnConfig,
    exploration: Exploration,
    rng: StdRng,
    device: B::Device,
    training_steps: usize,
}

impl<B: AutodiffBackend> DeepQAgent<B> {
    pub fn new(config: DqnConfig, rng: StdRng, device: B::Device) -> Self {
        let model = QNetworkConfig::new(config.hidden_units).init::<B>(&device);
        Self::build(Some(model), config, rng, device)
    }

    /// An agent without an approximator
    ///
    /// The NdArray backend is always linked in, so `create_agent` never takes
    /// this path; embedders whose GPU backend fails to initialise can use it
    /// to keep the session running on random actions.
    pub fn unavailable(config: DqnConfig, rng: StdRng) -> Self {
        Self::build(None, config, rng, B::Device::default())
    }

    fn build(
        model: Option<QNetwork<B>>,
        config: DqnConfig,
        rng: StdRng,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            optim: AdamConfig::new().init(),
            memory: ReplayBuffer::new(config.memory_capacity),
            exploration: Exploration::new(&config.exploration),
            config,
            rng,
            device,
            training_steps: 0,
        }
    }

    /// Store a transition in replay memory
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    /// Number of optimizer steps taken so far
    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    /// Action values for a single feature vector, `None` when not ready
    pub fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Option<ActionValues> {
        let model = self.model.as_ref()?.valid();
        let input = features_to_tensor::<B::InnerBackend>(&[*features], &self.device);
        let values = model.forward(input).into_data().to_vec::<f32>().ok()?;

        values.try_into().ok()
    }

    /// Run one training step on a sampled batch
    ///
    /// Returns the batch loss, or `None` when memory holds fewer transitions
    /// than the batch size (the approximator is left untouched).
    pub fn replay(&mut self) -> Option<f32> {
        let batch_size = self.config.batch_size;
        if !self.memory.is_ready(batch_size) {
            return None;
        }
        let model = self.model.take()?;

        let batch = self.memory.sample(batch_size, &mut self.rng);
        let states: Vec<[f32; FEATURE_COUNT]> = batch.iter().map(|t| t.state).collect();
        let next_states: Vec<[f32; FEATURE_COUNT]> =
            batch.iter().map(|t| t.next_state).collect();

        let Some(targets) = self.targets(&model, &batch, &states, &next_states) else {
            tracing::warn!("could not read back predictions, skipping training step");
            self.model = Some(model);
            return None;
        };

        let predictions = model.forward(features_to_tensor::<B>(&states, &self.device));
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [batch_size, NUM_ACTIONS]),
            &self.device,
        );
        let loss = (predictions - targets).powf_scalar(2.0).mean();
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        self.model = Some(self.optim.step(self.config.learning_rate, model, grads));
        self.training_steps += 1;

        Some(loss_value)
    }

    /// Flattened `[batch, 4]` regression targets
    fn targets(
        &self,
        model: &QNetwork<B>,
        batch: &[&Transition],
        states: &[[f32; FEATURE_COUNT]],
        next_states: &[[f32; FEATURE_COUNT]],
    ) -> Option<Vec<f32>> {
        let frozen = model.valid();
        let current = frozen
            .forward(features_to_tensor::<B::InnerBackend>(states, &self.device))
            .into_data()
            .to_vec::<f32>()
            .ok()?;
        let next = frozen
            .forward(features_to_tensor::<B::InnerBackend>(next_states, &self.device))
            .into_data()
            .to_vec::<f32>()
            .ok()?;

        let mut targets = current;
        for (i, transition) in batch.iter().enumerate() {
            let row = i * NUM_ACTIONS;
            let target = if transition.done {
                transition.reward
            } else {
                let max_next = next[row..row + NUM_ACTIONS]
                    .iter()
                    .copied()
                    .fold(f32::NEG_INFINITY, f32::max);
                transition.reward + self.config.gamma * max_next
            };
            targets[row + transition.action.index()] = target;
        }
        Some(targets)
    }
}

impl<B: AutodiffBackend> Agent for DeepQAgent<B> {
    fn kind(&self) -> AgentKind {
        AgentKind::Dqn
    }

    fn choose_action(&mut self, state: &EncodedState) -> Direction {
        if !self.is_ready() || self.exploration.should_explore(&mut self.rng) {
            return random_action(&mut self.rng);
        }
        match self.predict(&state.vector) {
            Some(values) => Direction::from_index(argmax_first(&values)),
            None => random_action(&mut self.rng),
        }
    }

    fn observe_outcome(&mut self, experience: Experience<'_>) {
        self.remember(Transition {
            state: experience.state.vector,
            action: experience.action,
            reward: experience.reward,
            next_state: experience.next_state.vector,
            done: experience.done,
        });

        if let Some(loss) = self.replay() {
            tracing::trace!(loss, step = self.training_steps, "dqn training step");
        }

        if experience.done {
            self.exploration.decay();
        }
    }

    fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    fn is_ready(&self) -> bool {
        self.model.is_some()
    }
}
