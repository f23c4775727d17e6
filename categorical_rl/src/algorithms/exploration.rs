//! ε-greedy action selection.
//!
//! With probability ε a uniformly random action is taken, otherwise the
//! greedy one. The greedy action therefore has probability `1 - ε + ε/n`.

use rand::Rng;

/// Pick an action ε-greedily.
///
/// `epsilon` is clamped into `[0, 1]`. Panics if `num_actions == 0`.
pub fn epsilon_greedy<R: Rng + ?Sized>(
    num_actions: usize,
    epsilon: f32,
    greedy_action: usize,
    rng: &mut R,
) -> usize {
    assert!(num_actions > 0, "epsilon_greedy needs at least one action");
    let epsilon = epsilon.clamp(0.0, 1.0);
    if rng.gen::<f32>() < epsilon {
        rng.gen_range(0..num_actions)
    } else {
        greedy_action
    }
}

/// Probability of each action under ε-greedy selection.
pub fn epsilon_greedy_probs(num_actions: usize, epsilon: f32, greedy_action: usize) -> Vec<f32> {
    let epsilon = epsilon.clamp(0.0, 1.0);
    let mut probs = vec![epsilon / num_actions as f32; num_actions];
    if let Some(p) = probs.get_mut(greedy_action) {
        *p += 1.0 - epsilon;
    }
    probs
}
