//! Tensor side of C51: distributions, Q values and the categorical loss.
//!
//! A [`DistributionalModel`] maps stacked frames to one logit vector over the
//! support per action:
//!
//! ```text
//! states [B, 84, 84, 4] ──forward──▶ logits [B, A, N]
//!                                      │ softmax over N
//!                                      ▼
//!                        probs [B, A, N] ──Σ p·z──▶ Q [B, A]
//! ```
//!
//! The Bellman projection itself runs on the host (see
//! [`CategoricalProjector`](super::categorical::CategoricalProjector)), so the
//! target side is read back to `f32` slices between the target-network forward
//! pass and the loss.

use burn::tensor::activation::{log_softmax, softmax};
use burn::tensor::{backend::Backend, Tensor};

use super::categorical::CategoricalProjector;
use crate::buffers::ReplayBatch;
use crate::core::error::C51Error;
use crate::core::frame::{StackedState, FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, STACK_DEPTH};
use crate::core::support::FixedSupport;

/// A network producing per-action categorical logits.
pub trait DistributionalModel<B: Backend> {
    /// `states`: `[batch, 84, 84, 4]` in `[0, 1]`. Returns `[batch, actions, atoms]`.
    fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 3>;
}

/// Distributions and values derived from a batch of logits.
#[derive(Debug, Clone)]
pub struct DistributionalOutput<B: Backend> {
    /// `[batch, actions, atoms]`
    pub probs: Tensor<B, 3>,
    /// Expected return per action, `[batch, actions]`
    pub q_values: Tensor<B, 2>,
    /// Argmax of `q_values` per row (first index on ties)
    pub greedy_actions: Vec<usize>,
    /// Distribution of the greedy action, `[batch, atoms]`
    pub greedy_probs: Tensor<B, 2>,
}

/// Read a tensor back to host memory.
pub(crate) fn tensor_to_vec<B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
) -> Result<Vec<f32>, C51Error> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| C51Error::Tensor(format!("{:?}", e)))
}

/// Convert a flat `u8` batch of stacked states into a normalized tensor.
pub fn states_to_tensor<B: Backend>(
    states: &[u8],
    batch_size: usize,
    device: &B::Device,
) -> Result<Tensor<B, 4>, C51Error> {
    let expected = batch_size * FRAME_PIXELS * STACK_DEPTH;
    if states.len() != expected {
        return Err(C51Error::shape("states", expected, states.len()));
    }
    let normalized: Vec<f32> = states.iter().map(|&p| p as f32 / 255.0).collect();
    Ok(Tensor::<B, 1>::from_floats(normalized.as_slice(), device).reshape([
        batch_size,
        FRAME_HEIGHT,
        FRAME_WIDTH,
        STACK_DEPTH,
    ]))
}

/// Index of the largest value in each row of a row-major matrix.
fn argmax_rows(values: &[f32], cols: usize) -> Vec<usize> {
    values
        .chunks_exact(cols)
        .map(|row| {
            let mut best = 0;
            for (i, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// `[batch, actions, 1]` float mask selecting one action per row.
fn action_mask<B: Backend>(
    actions: &[usize],
    num_actions: usize,
    device: &B::Device,
) -> Result<Tensor<B, 3>, C51Error> {
    let batch = actions.len();
    let mut mask = vec![0.0f32; batch * num_actions];
    for (k, &action) in actions.iter().enumerate() {
        if action >= num_actions {
            return Err(C51Error::shape("action index", num_actions, action));
        }
        mask[k * num_actions + action] = 1.0;
    }
    Ok(Tensor::<B, 1>::from_floats(mask.as_slice(), device).reshape([batch, num_actions, 1]))
}

/// Softmax over atoms, expected values and greedy selection.
pub fn evaluate_logits<B: Backend>(
    logits: Tensor<B, 3>,
    support: &FixedSupport,
) -> Result<DistributionalOutput<B>, C51Error> {
    let [batch, num_actions, num_atoms] = logits.dims();
    if num_atoms != support.num_atoms() {
        return Err(C51Error::shape("logit atoms", support.num_atoms(), num_atoms));
    }
    let device = logits.device();

    let probs = softmax(logits, 2);
    let atoms = Tensor::<B, 1>::from_floats(support.atoms(), &device).reshape([1, 1, num_atoms]);
    let q_values = (probs.clone() * atoms)
        .sum_dim(2)
        .reshape([batch, num_actions]);

    let greedy_actions = argmax_rows(&tensor_to_vec(q_values.clone())?, num_actions);
    let mask = action_mask::<B>(&greedy_actions, num_actions, &device)?;
    let greedy_probs = (probs.clone() * mask)
        .sum_dim(1)
        .reshape([batch, num_atoms]);

    Ok(DistributionalOutput {
        probs,
        q_values,
        greedy_actions,
        greedy_probs,
    })
}

/// Logits of the taken actions, `[batch, atoms]`.
pub fn action_logits<B: Backend>(
    logits: Tensor<B, 3>,
    actions: &[u32],
) -> Result<Tensor<B, 2>, C51Error> {
    let [batch, num_actions, num_atoms] = logits.dims();
    if actions.len() != batch {
        return Err(C51Error::shape("actions", batch, actions.len()));
    }
    let actions: Vec<usize> = actions.iter().map(|&a| a as usize).collect();
    let mask = action_mask::<B>(&actions, num_actions, &logits.device())?;
    Ok((logits * mask).sum_dim(1).reshape([batch, num_atoms]))
}

/// Mean over the batch of `-Σ target · log_softmax(logits)`.
///
/// `target` is treated as a constant.
pub fn categorical_cross_entropy<B: Backend>(
    logits: Tensor<B, 2>,
    target: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    -(target.detach() * log_probs).sum_dim(1).mean()
}

/// C51 loss for one sampled batch.
///
/// The target network picks the greedy next action and its distribution,
/// which is projected through the Bellman update and compared with the online
/// network's distribution for the action actually taken.
pub fn c51_loss<B, M>(
    online: &M,
    target: &M,
    batch: &ReplayBatch,
    projector: &CategoricalProjector,
    gamma: f32,
    device: &B::Device,
) -> Result<Tensor<B, 1>, C51Error>
where
    B: Backend,
    M: DistributionalModel<B>,
{
    let batch_size = batch.len();
    let num_atoms = projector.num_atoms();

    let next_states = states_to_tensor::<B>(&batch.next_states, batch_size, device)?;
    let next_logits = target.forward(next_states).detach();
    let next = evaluate_logits(next_logits, projector.support())?;
    let next_probs = tensor_to_vec(next.greedy_probs)?;

    let projected =
        projector.project_batch(&next_probs, &batch.rewards, &batch.terminals, gamma)?;
    let target_dist =
        Tensor::<B, 1>::from_floats(projected.as_slice(), device).reshape([batch_size, num_atoms]);

    let states = states_to_tensor::<B>(&batch.states, batch_size, device)?;
    let chosen = action_logits(online.forward(states), &batch.actions)?;

    Ok(categorical_cross_entropy(chosen, target_dist))
}

/// Greedy action for a single stacked state.
pub fn greedy_action<B, M>(
    model: &M,
    state: &StackedState<'_>,
    support: &FixedSupport,
    device: &B::Device,
) -> Result<usize, C51Error>
where
    B: Backend,
    M: DistributionalModel<B>,
{
    let input = states_to_tensor::<B>(&state.to_hwc(), 1, device)?;
    let output = evaluate_logits(model.forward(input), support)?;
    output
        .greedy_actions
        .first()
        .copied()
        .ok_or_else(|| C51Error::Tensor("model returned an empty batch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_rows_prefers_first_on_ties() {
        assert_eq!(argmax_rows(&[1.0, 3.0, 3.0, 0.0, -1.0, -2.0], 3), vec![1, 0]);
    }
}
