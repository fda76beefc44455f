pub mod interactive;
pub mod train;

pub use interactive::{InteractiveConfig, InteractiveMode};
pub use train::{TrainConfig, TrainMode};
