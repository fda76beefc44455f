//! Q-table for the tabular agents

use std::collections::HashMap;

use rand::Rng;

use super::observation::StateKey;
use crate::game::NUM_ACTIONS;

/// Action values for one state, indexed by [`crate::game::Direction::index`]
pub type ActionValues = [f32; NUM_ACTIONS];

/// Q-table mapping encoded states to per-action values
///
/// Rows are created lazily with all-zero values the first time a state is
/// updated. The table only grows; it is dropped together with its agent.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    rows: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for a state, if it has been visited
    pub fn get(&self, state: StateKey) -> Option<&ActionValues> {
        self.rows.get(&state)
    }

    /// Values for a state, inserting a zero row on first visit
    pub fn row_mut(&mut self, state: StateKey) -> &mut ActionValues {
        self.rows.entry(state).or_insert([0.0; NUM_ACTIONS])
    }

    /// Single action value; unseen states read as zero
    pub fn value(&self, state: StateKey, action: usize) -> f32 {
        self.get(state).map_or(0.0, |row| row[action])
    }

    /// Largest action value in a state; unseen states read as zero
    pub fn max_value(&self, state: StateKey) -> f32 {
        self.get(state).map_or(0.0, |row| max_of(row))
    }

    /// Move `Q[state][action]` a fraction `learning_rate` of the way to `target`
    pub fn update_toward(
        &mut self,
        state: StateKey,
        action: usize,
        target: f32,
        learning_rate: f32,
    ) {
        let q = &mut self.row_mut(state)[action];
        *q += learning_rate * (target - *q);
    }

    /// Number of states with a row
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn max_of(values: &ActionValues) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

/// Indices holding the maximum value, in ascending order
pub fn tied_maxima(values: &ActionValues) -> Vec<usize> {
    let max = max_of(values);
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect()
}

/// Greedy action, ties broken uniformly at random
pub fn argmax_random_tie<R: Rng + ?Sized>(values: &ActionValues, rng: &mut R) -> usize {
    let best = tied_maxima(values);
    best[rng.gen_range(0..best.len())]
}

/// Greedy action, ties broken toward the lowest index
pub fn argmax_first(values: &ActionValues) -> usize {
    tied_maxima(values)[0]
}
