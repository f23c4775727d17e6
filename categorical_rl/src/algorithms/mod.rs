//! Algorithm components for categorical DQN.
//!
//! - `categorical`: Bellman projection onto a fixed support (host side)
//! - `distributional`: softmax/expectation helpers and the C51 loss (burn)
//! - `exploration`: ε-greedy action selection

pub mod categorical;
pub mod distributional;
pub mod exploration;

#[cfg(test)]
mod tests;

pub use categorical::CategoricalProjector;
pub use distributional::{
    action_logits, c51_loss, categorical_cross_entropy, evaluate_logits, greedy_action,
    states_to_tensor, DistributionalModel, DistributionalOutput,
};
pub use exploration::{epsilon_greedy, epsilon_greedy_probs};
