use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// Whether the starvation guard ended the round
    pub starved: bool,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Shaped reward for this step
    pub reward: f32,
    /// Whether the round has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
///
/// Food placement draws from the engine's own RNG, so two engines built with
/// the same seed replay identical rounds for identical action sequences.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine seeded from the operating system
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a game engine with a fixed food-placement seed
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a new round: centred snake heading up, fresh food, zeroed counters
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Up,
            self.config.initial_snake_length,
        );

        // validated configs always leave a free cell
        let food = self.spawn_food_avoid_snake(&snake).unwrap_or(snake.head());

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, direction: Direction) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                    starved: false,
                },
            };
        }

        // Reversing into the neck is silently ignored
        if !state.snake.direction.is_opposite(direction) {
            state.snake.direction = direction;
        }

        let head = state.snake.head();
        let new_head = head.moved_in_direction(state.snake.direction);

        let mut reward;
        let mut terminated = false;
        let mut ate_food = false;

        let collision_type = state.collision_at(new_head);
        if collision_type.is_some() {
            reward = self.config.collision_penalty;
            terminated = true;
        } else {
            ate_food = new_head == state.food;
            let old_distance = head.manhattan(state.food);
            let new_distance = new_head.manhattan(state.food);

            state.snake.advance_to(new_head, ate_food);

            if ate_food {
                reward = self.config.food_reward;
                state.score += 1;
                state.steps_since_food = 0;
                match self.spawn_food_avoid_snake(&state.snake) {
                    Some(food) => state.food = food,
                    // The snake covers the whole board
                    None => terminated = true,
                }
            } else {
                reward = self.config.step_penalty;
                reward += if new_distance < old_distance {
                    self.config.approach_bonus
                } else {
                    self.config.retreat_penalty
                };
            }
        }

        state.steps += 1;
        state.steps_since_food += 1;

        let starved = state.steps_since_food > self.config.starvation_limit;
        if starved {
            reward = self.config.starvation_penalty;
            terminated = true;
        }

        if terminated {
            state.is_alive = false;
        }

        StepResult {
            reward,
            terminated,
            info: StepInfo {
                ate_food,
                collision_type,
                starved,
            },
        }
    }

    /// Spawn food at a uniformly random free cell, `None` when no cell is free
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Option<Position> {
        let width = self.config.grid_width;
        let free: Vec<Position> = (0..self.config.grid_height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x as i32, y as i32)))
            .filter(|pos| !snake.occupies(*pos))
            .collect();

        free.choose(&mut self.rng).copied()
    }
}
