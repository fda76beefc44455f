//! Tabular SARSA (on-policy TD control)

use rand::rngs::StdRng;

use super::agent::{Agent, AgentKind, Experience, Exploration, random_action};
use super::config::TabularConfig;
use super::observation::EncodedState;
use super::q_table::{QTable, argmax_first};
use crate::game::Direction;

/// SARSA agent
///
/// Update rule: `Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') − Q(s,a)]` where `a'` is
/// the action actually chosen from `s'`. Greedy choices break ties toward the
/// lowest action index, unlike [`super::QLearningAgent`].
pub struct SarsaAgent {
    table: QTable,
    config: TabularConfig,
    exploration: Exploration,
    rng: StdRng,
}

impl SarsaAgent {
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

impl Agent for SarsaAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Sarsa
    }

    fn choose_action(&mut self, state: &EncodedState) -> Direction {
        if self.exploration.should_explore(&mut self.rng) {
            return random_action(&mut self.rng);
        }
        match self.table.get(state.key) {
            Some(values) => Direction::from_index(argmax_first(values)),
            None => random_action(&mut self.rng),
        }
    }

    fn observe_outcome(&mut self, experience: Experience<'_>) {
        self.table.row_mut(experience.next_state.key);
        let next_q = experience.next_action.map_or(0.0, |next| {
            self.table.value(experience.next_state.key, next.index())
        });
        let target = experience.reward + self.config.gamma * next_q;

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

    fn needs_next_action(&self) -> bool {
        true
    }
}
