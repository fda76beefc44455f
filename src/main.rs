use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use snake_rl::config::SessionConfig;
use snake_rl::modes::{InteractiveConfig, InteractiveMode, TrainConfig, TrainMode};
use snake_rl::rl::AgentKind;
use snake_rl::session::SpeedMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_rl")]
#[command(version, about = "Snake on a grid: play it, or watch Q-learning, SARSA and DQN learn it")]
struct Cli {
    /// Who controls the snake
    #[arg(long, value_enum, default_value_t = AgentKind::Human)]
    algo: AgentKind,

    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// Initial simulation speed
    #[arg(long, value_enum, default_value_t = SpeedMode::Normal)]
    speed: SpeedMode,

    /// Train without the terminal UI
    #[arg(long)]
    headless: bool,

    /// Episodes to run in headless mode
    #[arg(long, default_value = "1000")]
    episodes: usize,

    /// Seed for food placement and agent exploration
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with game and agent settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the score chart as CSV
    #[arg(long)]
    chart_csv: Option<PathBuf>,

    /// Log headless progress every N episodes
    #[arg(long, default_value = "100")]
    log_frequency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut session = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(width) = cli.width {
        session.game.grid_width = width;
    }
    if let Some(height) = cli.height {
        session.game.grid_height = height;
    }
    if cli.seed.is_some() {
        session.agents.seed = cli.seed;
    }
    session.validate().map_err(|e| anyhow!("Invalid settings: {e}"))?;

    if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let mut config = TrainConfig::new(cli.algo, cli.episodes);
        config.log_frequency = cli.log_frequency;
        config.chart_csv = cli.chart_csv;
        config.seed = cli.seed;
        config.game_config = session.game;
        config.agent_config = session.agents;

        TrainMode::new(config)?.run()?;
    } else {
        let mut config = InteractiveConfig {
            algorithm: cli.algo,
            speed: cli.speed,
            seed: cli.seed,
            game_config: session.game,
            agent_config: session.agents,
            ..Default::default()
        };
        if let Some(path) = cli.chart_csv {
            config.chart_path = path;
        }

        InteractiveMode::new(config).run().await?;
    }

    Ok(())
}
