pub mod game_metrics;
pub mod score_chart;
pub mod training_stats;

pub use game_metrics::Scoreboard;
pub use score_chart::{CHART_CAPACITY, ScoreChart, ScoreSeries};
pub use training_stats::TrainingStats;
