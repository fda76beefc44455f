//! Tabular Q-learning (off-policy TD control)

use rand::rngs::StdRng;

use super::agent::{Agent, AgentKind, Experience, Exploration, random_action};
use super::config::TabularConfig;
use super::observation::EncodedState;
use super::q_table::{QTable, argmax_random_tie};
use crate::game::Direction;

/// Q-learning agent
///
/// Update rule: `Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') − Q(s,a)]`.
/// Greedy choices break ties uniformly at random among the tied maxima.
pub struct QLearningAgent {
    table: QTable,
    config: TabularConfig,
    exploration: Exploration,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(config: TabularConfig, rng: StdRng) -> Self {
        let exploration = Exploration::new(&config.exploration);
        Self {
            table: QTable::new(),
            config,
            exploration,
            rng,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }
}

impl Agent for QLearningAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::QLearning
    }

    fn choose_action(&mut self, state: &EncodedState) -> Direction {
        if self.exploration.should_explore(&mut self.rng) {
            return random_action(&mut self.rng);
        }
        // Unvisited states have nothing to exploit yet
        match self.table.get(state.key) {
            Some(values) => Direction::from_index(argmax_random_tie(values, &mut self.rng)),
            None => random_action(&mut self.rng),
        }
    }

    fn observe_outcome(&mut self, experience: Experience<'_>) {
        // Both rows exist after any update, matching lazy zero-initialisation
        self.table.row_mut(experience.next_state.key);
        let max_next = self.table.max_value(experience.next_state.key);
        let target = experience.reward + self.config.gamma * max_next;

        self.table.update_toward(
            experience.state.key,
            experience.action.index(),
            target,
            self.config.learning_rate,
        );

        if experience.done {
            self.exploration.decay();
        }
    }

    fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }
}
