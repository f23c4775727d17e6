//! Training metrics and logging.
//!
//! ## Metrics
//!
//! - [`RewardTracker`]: Episode rewards, moving average and loss history
//!
//! ## Loggers
//!
//! - [`ConsoleLogger`]: Progress lines through the `log` facade
//! - [`CSVLogger`]: CSV file logging for analysis

pub mod logger;
pub mod training_metrics;

pub use logger::{CSVLogger, ConsoleLogger, MetricsLogger, TrainingSnapshot};
pub use training_metrics::{RewardTracker, DEFAULT_REWARD_WINDOW};
