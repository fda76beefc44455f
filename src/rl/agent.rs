//! Agent abstraction shared by the episode loop and all learning strategies

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::backend::{TrainingBackend, default_device};
use super::config::{AgentConfig, ExplorationConfig};
use super::dqn::DeepQAgent;
use super::observation::EncodedState;
use super::q_learning::QLearningAgent;
use super::sarsa::SarsaAgent;
use crate::game::{Direction, NUM_ACTIONS};

/// Who picks the snake's moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Keyboard control
    Human,
    /// Tabular Q-learning
    #[value(name = "qlearning")]
    QLearning,
    /// Tabular SARSA
    Sarsa,
    /// Deep Q-network with experience replay
    Dqn,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Human,
        AgentKind::QLearning,
        AgentKind::Sarsa,
        AgentKind::Dqn,
    ];

    /// Configuration identifier: `human | qlearning | sarsa | dqn`
    pub fn id(&self) -> &'static str {
        match self {
            AgentKind::Human => "human",
            AgentKind::QLearning => "qlearning",
            AgentKind::Sarsa => "sarsa",
            AgentKind::Dqn => "dqn",
        }
    }

    /// Name shown on the HUD and chart legend
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Human => "Human",
            AgentKind::QLearning => "Q-Learning",
            AgentKind::Sarsa => "SARSA",
            AgentKind::Dqn => "DQN",
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, AgentKind::Human)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown algorithm '{s}' (expected human, qlearning, sarsa or dqn)"))
    }
}

/// One step of experience handed to an agent's learning hook
#[derive(Debug, Clone, Copy)]
pub struct Experience<'a> {
    pub state: &'a EncodedState,
    pub action: Direction,
    pub reward: f32,
    pub next_state: &'a EncodedState,
    pub done: bool,
    /// The action the agent will take from `next_state`. Only on-policy
    /// agents receive one.
    pub next_action: Option<Direction>,
}

/// Capability set every learning strategy implements
///
/// The episode loop drives agents exclusively through this trait.
pub trait Agent {
    fn kind(&self) -> AgentKind;

    /// Pick an action for the given state (ε-greedy)
    fn choose_action(&mut self, state: &EncodedState) -> Direction;

    /// Learning hook, called once per environment step
    fn observe_outcome(&mut self, experience: Experience<'_>);

    /// Current exploration rate
    fn epsilon(&self) -> f32;

    /// On-policy agents need the next action before they can learn
    fn needs_next_action(&self) -> bool {
        false
    }

    /// False when the agent cannot run its policy and acts uniformly at random
    fn is_ready(&self) -> bool {
        true
    }
}

/// ε-greedy exploration state
#[derive(Debug, Clone)]
pub struct Exploration {
    epsilon: f32,
    min: f32,
    decay: f32,
}

impl Exploration {
    pub fn new(config: &ExplorationConfig) -> Self {
        Self {
            epsilon: config.start,
            min: config.min,
            decay: config.decay,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Roll whether this step explores
    pub fn should_explore<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.r#gen::<f32>() < self.epsilon
    }

    /// Apply one episode's worth of decay, never going below the floor
    pub fn decay(&mut self) {
        if self.epsilon > self.min {
            self.epsilon = (self.epsilon * self.decay).max(self.min);
        }
    }
}

/// Uniformly random action
pub fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::from_index(rng.gen_range(0..NUM_ACTIONS))
}

/// RNG for an agent: seeded when the config carries a seed
pub(crate) fn agent_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Build a fresh agent for `kind`; `None` for human play
pub fn create_agent(kind: AgentKind, config: &AgentConfig) -> Option<Box<dyn Agent>> {
    match kind {
        AgentKind::Human => None,
        AgentKind::QLearning => Some(Box::new(QLearningAgent::new(
            config.tabular.clone(),
            agent_rng(config.seed),
        ))),
        AgentKind::Sarsa => Some(Box::new(SarsaAgent::new(
            config.tabular.clone(),
            agent_rng(config.seed),
        ))),
        AgentKind::Dqn => Some(Box::new(DeepQAgent::<TrainingBackend>::new(
            config.dqn.clone(),
            agent_rng(config.seed),
            default_device(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("qlearning".parse::<AgentKind>(), Ok(AgentKind::QLearning));
        assert_eq!("SARSA".parse::<AgentKind>(), Ok(AgentKind::Sarsa));
        assert_eq!("dqn".parse::<AgentKind>(), Ok(AgentKind::Dqn));
        assert_eq!("human".parse::<AgentKind>(), Ok(AgentKind::Human));
        assert!("ppo".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_kind_round_trips_through_id() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.id().parse::<AgentKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.id());
        }
    }

    #[test]
    fn test_kind_serde_uses_ids() {
        let json = serde_json::to_string(&AgentKind::QLearning).unwrap();
        assert_eq!(json, "\"qlearning\"");
    }

    #[test]
    fn test_exploration_decay_is_floored() {
        let mut exploration = Exploration::new(&ExplorationConfig::with_decay(0.5));
        let mut previous = exploration.epsilon();
        assert_eq!(previous, 1.0);

        for _ in 0..50 {
            exploration.decay();
            assert!(exploration.epsilon() <= previous);
            assert!(exploration.epsilon() >= 0.01);
            previous = exploration.epsilon();
        }
        assert_eq!(exploration.epsilon(), 0.01);
    }

    #[test]
    fn test_full_exploration_always_explores() {
        let exploration = Exploration::new(&ExplorationConfig::with_decay(0.995));
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| exploration.should_explore(&mut rng)));
    }

    #[test]
    fn test_create_agent() {
        let config = AgentConfig {
            seed: Some(3),
            ..Default::default()
        };
        assert!(create_agent(AgentKind::Human, &config).is_none());

        for kind in [AgentKind::QLearning, AgentKind::Sarsa, AgentKind::Dqn] {
            let agent = create_agent(kind, &config).unwrap();
            assert_eq!(agent.kind(), kind);
            assert_eq!(agent.epsilon(), 1.0);
            assert!(agent.is_ready());
        }

        let sarsa = create_agent(AgentKind::Sarsa, &config).unwrap();
        assert!(sarsa.needs_next_action());
    }
}
