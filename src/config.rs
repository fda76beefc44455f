//! Session configuration file
//!
//! Every field is optional in the JSON; missing values take their defaults.
//!
//! ```json
//! {
//!   "game": { "grid_width": 15, "starvation_limit": 300 },
//!   "agents": { "tabular": { "learning_rate": 0.2 }, "seed": 7 }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::game::GameConfig;
use crate::rl::AgentConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub agents: AgentConfig,
}

impl SessionConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SessionConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.game.validate().map_err(|e| format!("game: {e}"))?;
        self.agents.validate().map_err(|e| format!("agents: {e}"))
    }
}
