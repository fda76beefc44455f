//! Compact state encoding shared by every agent
//!
//! The observation is seven binary features:
//!
//! | bit | feature                         |
//! |-----|---------------------------------|
//! | 6   | danger one step to the left     |
//! | 5   | danger one step straight ahead  |
//! | 4   | danger one step to the right    |
//! | 3   | food is left of the head        |
//! | 2   | food is right of the head       |
//! | 1   | food is above the head          |
//! | 0   | food is below the head          |
//!
//! Left and right are relative to the current heading. The tabular agents
//! index their Q-tables by the packed [`StateKey`]; the DQN agent feeds the
//! float vector to its network.

use std::fmt;

use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{Direction, GameState};

/// Length of the feature vector
pub const FEATURE_COUNT: usize = 7;

/// Number of distinct keys the encoder can produce
pub const NUM_STATE_KEYS: usize = 1 << FEATURE_COUNT;

/// Bit-packed feature vector, first feature in the most significant bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(u8);

impl StateKey {
    pub fn from_features(features: &[bool; FEATURE_COUNT]) -> Self {
        let bits = features
            .iter()
            .fold(0u8, |acc, &flag| (acc << 1) | u8::from(flag));
        Self(bits)
    }

    /// Raw 7-bit value, usable as a dense table index
    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for StateKey {
    /// Renders as the seven flags in order, e.g. `0100110`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.0, width = FEATURE_COUNT)
    }
}

/// An encoded environment snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedState {
    pub key: StateKey,
    pub vector: [f32; FEATURE_COUNT],
}

impl EncodedState {
    fn from_features(features: [bool; FEATURE_COUNT]) -> Self {
        Self {
            key: StateKey::from_features(&features),
            vector: features.map(|flag| if flag { 1.0 } else { 0.0 }),
        }
    }
}

/// Encode a game snapshot into the shared feature representation
pub fn encode_state(state: &GameState) -> EncodedState {
    let heading = state.direction();
    let head = state.snake.head();
    let food = state.food;

    let danger = |dir: Direction| state.collision_at(head.moved_in_direction(dir)).is_some();

    EncodedState::from_features([
        danger(heading.turned_left()),
        danger(heading),
        danger(heading.turned_right()),
        food.x < head.x,
        food.x > head.x,
        food.y < head.y,
        food.y > head.y,
    ])
}

/// Stack feature vectors into a `[batch, FEATURE_COUNT]` tensor
pub fn features_to_tensor<B: Backend>(
    vectors: &[[f32; FEATURE_COUNT]],
    device: &B::Device,
) -> Tensor<B, 2> {
    let data: Vec<f32> = vectors.iter().flatten().copied().collect();
    let tensor_data = TensorData::new(data, [vectors.len(), FEATURE_COUNT]);

    Tensor::<B, 2>::from_data(tensor_data, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, Position, Snake};
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn state(head: Position, direction: Direction, food: Position) -> GameState {
        GameState::new(Snake::new(head, direction, 3), food, 20, 20)
    }

    #[test]
    fn test_open_field_has_no_danger() {
        let encoded = encode_state(&state(
            Position::new(10, 10),
            Direction::Up,
            Position::new(10, 5),
        ));

        assert_eq!(encoded.vector, [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(encoded.key.to_string(), "0000010");
    }

    #[test]
    fn test_wall_dangers_are_relative_to_heading() {
        // Heading up along the left wall: left is the wall
        let encoded = encode_state(&state(
            Position::new(0, 10),
            Direction::Up,
            Position::new(5, 10),
        ));
        assert_eq!(&encoded.vector[..3], &[1.0, 0.0, 0.0]);

        // Heading right along the top wall: left is the wall
        let encoded = encode_state(&state(
            Position::new(10, 0),
            Direction::Right,
            Position::new(5, 10),
        ));
        assert_eq!(&encoded.vector[..3], &[1.0, 0.0, 0.0]);

        // Heading left into the left wall: straight is the wall
        let encoded = encode_state(&state(
            Position::new(0, 10),
            Direction::Left,
            Position::new(5, 10),
        ));
        assert_eq!(&encoded.vector[..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_body_danger() {
        // Head at (5,5) heading up, body curls to the right of the head
        let snake = Snake::from_segments(
            vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(6, 6),
                Position::new(6, 5),
            ],
            Direction::Up,
        )
        .unwrap();
        let state = GameState::new(snake, Position::new(0, 0), 20, 20);

        let encoded = encode_state(&state);
        assert_eq!(&encoded.vector[..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_food_flags_are_strict() {
        let encoded = encode_state(&state(
            Position::new(10, 10),
            Direction::Up,
            Position::new(10, 10),
        ));
        assert_eq!(&encoded.vector[3..], &[0.0, 0.0, 0.0, 0.0]);

        let encoded = encode_state(&state(
            Position::new(10, 10),
            Direction::Up,
            Position::new(3, 15),
        ));
        assert_eq!(&encoded.vector[3..], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_translation_invariance() {
        let a = encode_state(&state(
            Position::new(8, 8),
            Direction::Right,
            Position::new(12, 3),
        ));
        let b = encode_state(&state(
            Position::new(11, 12),
            Direction::Right,
            Position::new(15, 7),
        ));

        assert_eq!(a, b);
    }

    #[test]
    fn test_keys_are_collision_free() {
        let mut seen = std::collections::HashSet::new();
        for bits in 0..NUM_STATE_KEYS {
            let features: [bool; FEATURE_COUNT] =
                std::array::from_fn(|i| bits & (1 << (FEATURE_COUNT - 1 - i)) != 0);
            let key = StateKey::from_features(&features);
            assert_eq!(key.bits() as usize, bits);
            assert!(seen.insert(key));
        }
    }

    #[test]
    fn test_features_to_tensor_shape() {
        let device = NdArrayDevice::default();
        let vectors = [[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]; 3];

        let tensor = features_to_tensor::<TestBackend>(&vectors, &device);

        assert_eq!(tensor.dims(), [3, FEATURE_COUNT]);
        let sum: f32 = tensor.to_data().as_slice::<f32>().unwrap().iter().sum();
        assert_eq!(sum, 9.0);
    }
}
