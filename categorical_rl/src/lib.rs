//! # Categorical RL: C51 Distributional DQN Core
//!
//! Building blocks for categorical (C51) deep Q-learning on Atari-style
//! pixel observations: a fixed return support, the categorical Bellman
//! projection, a frame-deduplicating replay ring and its uniform sampler.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          C51 training step                          │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  env obs ──preprocess──▶ Frame ──insert──▶ CircularFrameStore       │
//! │                                              │  (frames + records)  │
//! │                                              ▼                      │
//! │                                       ReplaySampler                 │
//! │                                              │ ReplayBatch          │
//! │                 ┌────────────────────────────┴──────────┐           │
//! │                 ▼                                       ▼           │
//! │        target net (next states)                online net (states) │
//! │                 │ greedy distribution                   │           │
//! │                 ▼                                       │           │
//! │        CategoricalProjector ──projected target──▶ cross-entropy    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Everything is single-threaded and synchronous. `insert` takes
//! `&mut CircularFrameStore`; stacking and sampling borrow it immutably, so
//! the borrow checker rules out sampling during an insert.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use categorical_rl::{C51Config, ReplaySampler, TransitionRecord};
//!
//! let config = C51Config::new().with_replay_capacity(100_000).with_seed(0).build()?;
//! let projector = config.projector()?;
//! let mut store = config.frame_store()?;
//! let mut rng = config.rng();
//!
//! store.start_episode(&first_frame);
//! store.push_step(TransitionRecord::new(action, reward, done), &next_frame);
//!
//! let batch = ReplaySampler::new(&store).sample(config.batch_size, &mut rng)?;
//! let loss = c51_loss(&online, &target, &batch, &projector, config.gamma, &device)?;
//! ```

pub mod algorithms;
pub mod buffers;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod metrics;
pub mod scheduling;

// Core types
pub use crate::core::error::C51Error;
pub use crate::core::frame::{Frame, StackedState, FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, STACK_DEPTH};
pub use crate::core::preprocess::{clip_reward, max_pool, preprocess};
pub use crate::core::support::FixedSupport;
pub use crate::core::transition::TransitionRecord;

// Replay
pub use buffers::{CircularFrameStore, ReplayBatch, ReplaySampler, ReplaySnapshot};

// Algorithms
pub use algorithms::{
    c51_loss, epsilon_greedy, evaluate_logits, greedy_action, CategoricalProjector,
    DistributionalModel, DistributionalOutput,
};

pub use config::C51Config;

// Exploration scheduling
pub use scheduling::{ConstantEpsilon, EpsilonScheduler, LinearDecay};

pub use metrics::{CSVLogger, ConsoleLogger, MetricsLogger, RewardTracker, TrainingSnapshot};

// Checkpointing
pub use checkpoint::{CheckpointError, CheckpointInfo, Checkpointer, CheckpointerConfig, TrainingState};
