//! Session control: the episode loop and its pacing

pub mod episode_loop;
pub mod speed;

pub use episode_loop::{EpisodeLoop, EpisodeObserver, LoopState, OverlayTitle, TickReport};
pub use speed::SpeedMode;
