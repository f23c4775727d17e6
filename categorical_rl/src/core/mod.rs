//! Core types for the C51 agent: value support, frames, transition records.

pub mod error;
pub mod frame;
pub mod preprocess;
pub mod support;
pub mod transition;

pub use error::C51Error;
pub use frame::{Frame, StackedState, FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, STACK_DEPTH};
pub use preprocess::{clip_reward, max_pool, preprocess, resize_plane, rgb_to_luminance};
pub use support::FixedSupport;
pub use transition::{TransitionRecord, RECORD_WIDTH};
