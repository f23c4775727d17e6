//! Checkpointing module.
//!
//! Persists everything a C51 run needs to resume: network weights, the replay
//! ring (with its write counter) and the reward/loss history.
//!
//! ## Example
//!
//! ```rust,ignore
//! use categorical_rl::checkpoint::{Checkpointer, CheckpointerConfig, TrainingState};
//!
//! let config = CheckpointerConfig::new("./checkpoints")
//!     .with_save_interval(500_000)
//!     .with_keep_last_n(5);
//! let mut checkpointer = Checkpointer::new(config)?;
//!
//! // In training loop:
//! if checkpointer.should_save(step) {
//!     checkpointer.save_model(&model, step, Some(tracker.average_reward()))?;
//!     checkpointer.save_replay(&store)?;
//!     checkpointer.save_training_state(&TrainingState { step, episode, tracker: tracker.clone() })?;
//! }
//!
//! // Resume:
//! let (model, step) = checkpointer.load_latest(model_template, &device)?;
//! let store = checkpointer.load_replay()?;
//! ```

pub mod checkpointer;

pub use checkpointer::{
    CheckpointError, CheckpointInfo, Checkpointer, CheckpointerConfig, TrainingState,
};
