//! Exploration scheduling module.
//!
//! ## Available Schedulers
//!
//! - [`ConstantEpsilon`]: No scheduling (constant rate)
//! - [`LinearDecay`]: Linear anneal from start to end ε
//!
//! ## Example
//!
//! ```rust,ignore
//! use categorical_rl::scheduling::{EpsilonScheduler, LinearDecay};
//!
//! // 1.0 → 0.1 over the first million frames
//! let schedule = LinearDecay::new(1.0, 0.1, 1_000_000);
//!
//! // In the acting loop:
//! let eps = schedule.epsilon(step);
//! let action = epsilon_greedy(num_actions, eps, greedy, &mut rng);
//! ```

pub mod epsilon_scheduler;


pub use epsilon_scheduler::{ConstantEpsilon, EpsilonScheduler, LinearDecay};
