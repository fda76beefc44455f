//! Experience replay memory for the DQN agent
//!
//! A bounded FIFO of transitions. Once full, pushing a transition evicts the
//! oldest one. Batches are drawn uniformly with replacement.

use std::collections::VecDeque;

use rand::Rng;

use super::observation::FEATURE_COUNT;
use crate::game::Direction;

/// A single stored transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: [f32; FEATURE_COUNT],
    pub action: Direction,
    pub reward: f32,
    pub next_state: [f32; FEATURE_COUNT],
    pub done: bool,
}

/// Replay memory
///
/// # Example
///
/// ```rust
/// use snake_rl::game::Direction;
/// use snake_rl::rl::{ReplayBuffer, Transition};
///
/// let mut buffer = ReplayBuffer::new(2);
/// for reward in [1.0, 2.0, 3.0] {
///     buffer.push(Transition {
///         state: [0.0; 7],
///         action: Direction::Up,
///         reward,
///         next_state: [0.0; 7],
///         done: false,
///     });
/// }
///
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.iter().next().unwrap().reward, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    /// Stored transitions, oldest first
    transitions: VecDeque<Transition>,

    /// Maximum buffer capacity
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest when full
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draw `batch_size` transitions uniformly, with replacement
    ///
    /// Returns an empty batch when the buffer is empty.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        if self.transitions.is_empty() {
            return Vec::new();
        }
        (0..batch_size)
            .map(|_| &self.transitions[rng.gen_range(0..self.transitions.len())])
            .collect()
    }

    /// Whether enough transitions are stored to draw a batch
    pub fn is_ready(&self, batch_size: usize) -> bool {
        self.transitions.len() >= batch_size
    }

    /// Transitions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
