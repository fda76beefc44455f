//! Headless training
//!
//! Runs an agent for a fixed number of episodes with no terminal UI, logging
//! rolling statistics through `tracing` and optionally exporting the score
//! chart as CSV at the end.
//!
//! # Example
//!
//! ```rust,no_run
//! use snake_rl::modes::{TrainConfig, TrainMode};
//! use snake_rl::rl::AgentKind;
//!
//! let config = TrainConfig::new(AgentKind::QLearning, 500);
//! let mut train_mode = TrainMode::new(config)?;
//! let stats = train_mode.run()?;
//! println!("{}", stats.format_summary());
//! # anyhow::Ok(())
//! ```

use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::info;

use crate::game::GameConfig;
use crate::metrics::{ScoreChart, TrainingStats};
use crate::rl::{AgentConfig, AgentKind, GridEnvironment};
use crate::session::EpisodeLoop;

/// Episodes averaged by the rolling statistics
const STATS_WINDOW: usize = 100;

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub algorithm: AgentKind,

    pub num_episodes: usize,

    /// Log rolling statistics every N episodes
    pub log_frequency: usize,

    /// Where to write the score chart once training finishes
    pub chart_csv: Option<PathBuf>,

    /// Seeds food placement; agent seeding lives in `agent_config`
    pub seed: Option<u64>,

    pub game_config: GameConfig,
    pub agent_config: AgentConfig,
}

impl TrainConfig {
    pub fn new(algorithm: AgentKind, num_episodes: usize) -> Self {
        Self {
            algorithm,
            num_episodes,
            log_frequency: 100,
            chart_csv: None,
            seed: None,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

pub struct TrainMode {
    episode_loop: EpisodeLoop<ScoreChart>,
    stats: TrainingStats,
    config: TrainConfig,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Result<Self> {
        if config.algorithm.is_human() {
            bail!("headless training needs a learning agent, not '{}'", config.algorithm);
        }

        let env = match config.seed {
            Some(seed) => GridEnvironment::with_seed(config.game_config.clone(), seed),
            None => GridEnvironment::new(config.game_config.clone()),
        };
        let episode_loop = EpisodeLoop::new(
            env,
            config.algorithm,
            config.agent_config.clone(),
            ScoreChart::new(config.algorithm),
        );

        Ok(Self {
            episode_loop,
            stats: TrainingStats::new(STATS_WINDOW),
            config,
        })
    }

    /// Train for the configured number of episodes
    pub fn run(&mut self) -> Result<&TrainingStats> {
        self.log_header();
        self.episode_loop.start();

        for episode in 0..self.config.num_episodes {
            self.run_episode();

            if (episode + 1) % self.config.log_frequency.max(1) == 0 {
                info!(
                    episode = episode + 1,
                    total = self.config.num_episodes,
                    "{}",
                    self.stats.format_summary()
                );
            }
        }
        self.episode_loop.stop();

        info!(
            high_score = self.episode_loop.high_score(),
            "training complete: {}",
            self.stats.format_summary()
        );

        if let Some(path) = &self.config.chart_csv {
            self.episode_loop.observer().export_csv(path)?;
            info!(path = %path.display(), "score chart exported");
        }

        Ok(&self.stats)
    }

    /// Tick until the current round ends and record it
    fn run_episode(&mut self) {
        let mut episode_reward = 0.0;
        while let Some(report) = self.episode_loop.tick() {
            episode_reward += report.reward;
            if report.done {
                self.stats.record_episode(
                    episode_reward,
                    report.round_steps,
                    report.score,
                    report.epsilon,
                );
                return;
            }
        }
    }

    fn log_header(&self) {
        let game = &self.config.game_config;
        info!(
            algorithm = %self.config.algorithm,
            episodes = self.config.num_episodes,
            grid = %format!("{}x{}", game.grid_width, game.grid_height),
            "starting headless training"
        );
        match self.config.algorithm {
            AgentKind::Dqn => {
                let dqn = &self.config.agent_config.dqn;
                info!(
                    learning_rate = dqn.learning_rate,
                    gamma = dqn.gamma,
                    batch_size = dqn.batch_size,
                    memory = dqn.memory_capacity,
                    epsilon_decay = dqn.exploration.decay,
                    "dqn hyperparameters"
                );
            }
            _ => {
                let tabular = &self.config.agent_config.tabular;
                info!(
                    learning_rate = tabular.learning_rate,
                    gamma = tabular.gamma,
                    epsilon_decay = tabular.exploration.decay,
                    "tabular hyperparameters"
                );
            }
        }
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn chart(&self) -> &ScoreChart {
        self.episode_loop.observer()
    }

    pub fn high_score(&self) -> u32 {
        self.episode_loop.high_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_config(algorithm: AgentKind, episodes: usize) -> TrainConfig {
        let mut config = TrainConfig::new(algorithm, episodes);
        config.game_config = GameConfig::new(10, 10);
        config.seed = Some(1);
        config.agent_config.seed = Some(2);
        config
    }

    #[test]
    fn test_human_is_rejected() {
        assert!(TrainMode::new(TrainConfig::new(AgentKind::Human, 10)).is_err());
    }

    #[test]
    fn test_runs_requested_episodes() {
        let mut train_mode = TrainMode::new(small_config(AgentKind::QLearning, 20)).unwrap();

        let stats = train_mode.run().unwrap();

        assert_eq!(stats.total_episodes(), 20);
        assert!(stats.total_steps() >= 20);
        assert!(stats.epsilon().unwrap() < 1.0);
        assert_eq!(train_mode.chart().series()[0].len(), 20);
    }

    #[test]
    fn test_sarsa_and_dqn_train() {
        for algorithm in [AgentKind::Sarsa, AgentKind::Dqn] {
            let mut train_mode = TrainMode::new(small_config(algorithm, 3)).unwrap();
            let stats = train_mode.run().unwrap();
            assert_eq!(stats.total_episodes(), 3);
        }
    }

    #[test]
    fn test_exports_chart_csv() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("scores.csv");
        let mut config = small_config(AgentKind::Sarsa, 5);
        config.chart_csv = Some(csv_path.clone());

        TrainMode::new(config).unwrap().run().unwrap();

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "series,episode,score");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("\"SARSA (Current)\",0,"));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut train_mode = TrainMode::new(small_config(AgentKind::QLearning, 15)).unwrap();
            train_mode.run().unwrap();
            train_mode.chart().to_csv()
        };
        assert_eq!(run(), run());
    }
}
