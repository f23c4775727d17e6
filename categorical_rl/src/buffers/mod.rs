//! Experience replay for pixel-based C51 training.
//!
//! - `CircularFrameStore`: fixed-capacity ring of single frames and transition
//!   records, with 4-frame stacks reconstructed on demand
//! - `ReplaySampler`: uniform batch sampling over the store

pub mod frame_store;
pub mod replay_sampler;

pub use frame_store::{CircularFrameStore, ReplaySnapshot};
pub use replay_sampler::{ReplayBatch, ReplaySampler};
