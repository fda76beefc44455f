//! Score-per-episode chart data
//!
//! The chart keeps one labelled series per run. Normally there is a single
//! `"<agent> (Current)"` series that is cleared on every session reset. In
//! compare mode previous runs are locked in place and each reset opens a new
//! `"<agent> (Run n)"` series, reusing a trailing series that never received
//! a point.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::rl::AgentKind;
use crate::session::EpisodeObserver;

/// Points kept per series
pub const CHART_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSeries {
    pub label: String,
    pub kind: AgentKind,
    points: VecDeque<(u32, u32)>,
}

impl ScoreSeries {
    fn new(label: String, kind: AgentKind) -> Self {
        Self {
            label,
            kind,
            points: VecDeque::with_capacity(CHART_CAPACITY),
        }
    }

    /// `(episode, score)` pairs, oldest first
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.points.iter().copied()
    }

    /// Points as plot coordinates
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|&(episode, score)| (episode as f64, score as f64))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScoreChart {
    series: Vec<ScoreSeries>,
    compare_mode: bool,
    capacity: usize,
}

impl ScoreChart {
    pub fn new(kind: AgentKind) -> Self {
        Self::with_capacity(kind, CHART_CAPACITY)
    }

    pub fn with_capacity(kind: AgentKind, capacity: usize) -> Self {
        Self {
            series: vec![current_series(kind)],
            compare_mode: false,
            capacity,
        }
    }

    /// Append a point to the newest series
    pub fn add_point(&mut self, episode: u32, score: u32) {
        let capacity = self.capacity;
        if let Some(series) = self.series.last_mut() {
            if series.points.len() >= capacity {
                series.points.pop_front();
            }
            series.points.push_back((episode, score));
        }
    }

    /// Start charting a new session for `kind`
    pub fn reset(&mut self, kind: AgentKind) {
        if !self.compare_mode {
            self.series = vec![current_series(kind)];
            return;
        }

        let trailing_empty = self.series.last().is_some_and(ScoreSeries::is_empty);
        if trailing_empty {
            let run = self.series.len();
            if let Some(last) = self.series.last_mut() {
                last.label = run_label(kind, run);
                last.kind = kind;
            }
        } else {
            let run = self.series.len() + 1;
            self.series.push(ScoreSeries::new(run_label(kind, run), kind));
        }
    }

    /// Flip compare mode and return the new setting
    ///
    /// Leaving compare mode does not drop locked runs by itself; the next
    /// [`ScoreChart::reset`] does.
    pub fn toggle_compare(&mut self) -> bool {
        self.compare_mode = !self.compare_mode;
        self.compare_mode
    }

    pub fn compare_mode(&self) -> bool {
        self.compare_mode
    }

    pub fn series(&self) -> &[ScoreSeries] {
        &self.series
    }

    /// Highest charted score, for axis scaling
    pub fn max_score(&self) -> u32 {
        self.series
            .iter()
            .flat_map(ScoreSeries::points)
            .map(|(_, score)| score)
            .max()
            .unwrap_or(0)
    }

    /// Smallest and largest charted episode index
    pub fn episode_bounds(&self) -> Option<(u32, u32)> {
        let episodes = self.series.iter().flat_map(ScoreSeries::points).map(|(e, _)| e);
        let (min, max) = episodes.fold((u32::MAX, 0), |(lo, hi), e| (lo.min(e), hi.max(e)));
        (min != u32::MAX).then_some((min, max))
    }

    /// `series,episode,score` rows for every charted point
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("series,episode,score\n");
        for series in &self.series {
            for (episode, score) in series.points() {
                let _ = writeln!(csv, "\"{}\",{episode},{score}", series.label);
            }
        }
        csv
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_csv())
            .with_context(|| format!("Failed to write chart to {}", path.display()))
    }
}

impl EpisodeObserver for ScoreChart {
    fn on_episode_end(&mut self, episode: u32, score: u32) {
        self.add_point(episode, score);
    }

    fn on_session_reset(&mut self, kind: AgentKind) {
        self.reset(kind);
    }
}

fn current_series(kind: AgentKind) -> ScoreSeries {
    ScoreSeries::new(format!("{} (Current)", kind.display_name()), kind)
}

fn run_label(kind: AgentKind, run: usize) -> String {
    format!("{} (Run {run})", kind.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(chart: &ScoreChart) -> Vec<&str> {
        chart.series().iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_points_are_capped() {
        let mut chart = ScoreChart::new(AgentKind::QLearning);
        for episode in 0..150 {
            chart.add_point(episode, episode % 7);
        }

        let series = &chart.series()[0];
        assert_eq!(series.len(), CHART_CAPACITY);
        assert_eq!(series.points().next(), Some((50, 50 % 7)));
        assert_eq!(chart.episode_bounds(), Some((50, 149)));
        assert_eq!(chart.max_score(), 6);
    }

    #[test]
    fn test_reset_without_compare_clears() {
        let mut chart = ScoreChart::new(AgentKind::Human);
        chart.add_point(0, 3);

        chart.reset(AgentKind::Dqn);

        assert_eq!(labels(&chart), vec!["DQN (Current)"]);
        assert!(chart.series()[0].is_empty());
        assert_eq!(chart.episode_bounds(), None);
    }

    #[test]
    fn test_compare_mode_locks_runs() {
        let mut chart = ScoreChart::new(AgentKind::QLearning);
        chart.add_point(0, 1);
        assert!(chart.toggle_compare());

        chart.reset(AgentKind::Sarsa);
        chart.add_point(0, 2);
        chart.reset(AgentKind::Dqn);

        assert_eq!(
            labels(&chart),
            vec!["Q-Learning (Current)", "SARSA (Run 2)", "DQN (Run 3)"]
        );
        assert_eq!(chart.series()[0].points().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn test_compare_mode_reuses_empty_trailing_series() {
        let mut chart = ScoreChart::new(AgentKind::Human);
        chart.add_point(0, 4);
        chart.toggle_compare();

        chart.reset(AgentKind::Human);
        chart.reset(AgentKind::Sarsa);
        chart.reset(AgentKind::QLearning);

        assert_eq!(labels(&chart), vec!["Human (Current)", "Q-Learning (Run 2)"]);
        assert_eq!(chart.series()[1].kind, AgentKind::QLearning);
    }

    #[test]
    fn test_observer_hooks() {
        let mut chart = ScoreChart::new(AgentKind::Sarsa);
        chart.on_episode_end(0, 2);
        chart.on_episode_end(1, 5);
        assert_eq!(chart.max_score(), 5);

        chart.on_session_reset(AgentKind::Sarsa);
        assert!(chart.series()[0].is_empty());
    }

    #[test]
    fn test_export_csv() {
        let mut chart = ScoreChart::new(AgentKind::Dqn);
        chart.add_point(0, 1);
        chart.add_point(1, 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        chart.export_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "series,episode,score\n\"DQN (Current)\",0,1\n\"DQN (Current)\",1,3\n"
        );
    }
}
