use serde::{Deserialize, Serialize};

/// Configuration for the game grid and its reward model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Rewards
    /// Reward for eating food
    pub food_reward: f32,
    /// Reward for hitting a wall or the snake's own body
    pub collision_penalty: f32,
    /// Base reward for every step that neither eats nor collides
    pub step_penalty: f32,
    /// Added to the step reward when the head got strictly closer to the food
    pub approach_bonus: f32,
    /// Added to the step reward when the head did not get closer to the food
    pub retreat_penalty: f32,

    // Starvation guard
    /// Steps allowed without eating before the episode is forced to end
    pub starvation_limit: u32,
    /// Reward replacing the step outcome when the starvation guard fires
    pub starvation_penalty: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            food_reward: 50.0,
            collision_penalty: -50.0,
            step_penalty: -0.1,
            approach_bonus: 0.5,
            retreat_penalty: -0.6,
            starvation_limit: 500,
            starvation_penalty: -10.0,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Square grid of the given side length
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30, 30)
    }

    /// Validate the grid can hold the starting snake with room to spare
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(format!(
                "grid must be at least 2x2, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        // the snake starts at the centre and extends downward
        let room_below = self.grid_height - self.grid_height / 2;
        if self.initial_snake_length > room_below {
            return Err(format!(
                "initial_snake_length {} does not fit below the centre of a {}-row grid",
                self.initial_snake_length, self.grid_height
            ));
        }
        if self.initial_snake_length >= self.grid_width * self.grid_height {
            return Err("snake leaves no free cell for food".to_string());
        }
        if self.starvation_limit == 0 {
            return Err("starvation_limit must be positive".to_string());
        }
        Ok(())
    }
}
