//! Rolling statistics for headless training runs

use std::collections::VecDeque;

/// Episode statistics over a sliding window plus lifetime totals
///
/// # Example
///
/// ```rust
/// use snake_rl::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(42.5, 120, 3, Some(0.8));
///
/// assert_eq!(stats.total_episodes(), 1);
/// assert_eq!(stats.best_score(), 3);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    episode_rewards: VecDeque<f32>,
    episode_lengths: VecDeque<u32>,
    episode_scores: VecDeque<u32>,

    /// Exploration rate after the most recent episode
    epsilon: Option<f32>,

    best_score: u32,
    total_episodes: usize,
    total_steps: usize,
    window_size: usize,
}

impl TrainingStats {
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            epsilon: None,
            best_score: 0,
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record a finished episode
    ///
    /// `reward` is the undiscounted return, `length` the number of steps.
    pub fn record_episode(&mut self, reward: f32, length: u32, score: u32, epsilon: Option<f32>) {
        push_windowed(&mut self.episode_rewards, reward, self.window_size);
        push_windowed(&mut self.episode_lengths, length, self.window_size);
        push_windowed(&mut self.episode_scores, score, self.window_size);
        self.epsilon = epsilon;
        self.best_score = self.best_score.max(score);
        self.total_episodes += 1;
        self.total_steps += length as usize;
    }

    pub fn mean_episode_reward(&self) -> f32 {
        mean(self.episode_rewards.iter().copied())
    }

    pub fn mean_episode_length(&self) -> f32 {
        mean(self.episode_lengths.iter().map(|&l| l as f32))
    }

    pub fn mean_episode_score(&self) -> f32 {
        mean(self.episode_scores.iter().map(|&s| s as f32))
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn epsilon(&self) -> Option<f32> {
        self.epsilon
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary, e.g.
    /// `Episodes: 10 | Steps: 812 | Reward: -31.20 | Score: 0.40 | Best: 2 | Len: 81.2 | Epsilon: 95%`
    pub fn format_summary(&self) -> String {
        let epsilon = self
            .epsilon
            .map_or_else(|| "--".to_string(), |e| format!("{:.0}%", e * 100.0));
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Best: {} | Len: {:.1} | Epsilon: {}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.best_score,
            self.mean_episode_length(),
            epsilon,
        )
    }
}

fn mean(values: impl ExactSizeIterator<Item = f32>) -> f32 {
    let len = values.len();
    if len == 0 {
        0.0
    } else {
        values.sum::<f32>() / len as f32
    }
}

fn push_windowed<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
    if deque.len() >= window_size {
        deque.pop_front();
    }
    deque.push_back(value);
}
