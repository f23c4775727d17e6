//! Tests for the categorical Bellman projection.
//!
//! They cover:
//! - Exact placement when the shifted atom lands on the grid
//! - Linear splitting between neighbouring atoms
//! - Clipping of targets outside `[vmin, vmax]`
//! - Terminal handling (no bootstrap, independent of gamma)
//! - Mass and mean preservation (property tests)

use crate::algorithms::categorical::CategoricalProjector;
use crate::core::support::FixedSupport;

const TOL: f32 = 1e-5;

fn projector(vmin: f32, vmax: f32, num_atoms: usize) -> CategoricalProjector {
    CategoricalProjector::new(FixedSupport::new(vmin, vmax, num_atoms).unwrap())
}

fn project_one(
    p: &CategoricalProjector,
    probs: &[f32],
    reward: f32,
    terminal: bool,
    gamma: f32,
) -> Vec<f32> {
    let mut out = vec![0.0; p.num_atoms()];
    p.project(probs, reward, terminal, gamma, &mut out).unwrap();
    out
}

fn one_hot(n: usize, i: usize) -> Vec<f32> {
    let mut v = vec![0.0; n];
    v[i] = 1.0;
    v
}

fn uniform(n: usize) -> Vec<f32> {
    vec![1.0 / n as f32; n]
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < TOL,
            "bin {}: expected {}, got {} (full: {:?})",
            i,
            e,
            a,
            actual
        );
    }
}

// ============================================================================
// Grid Placement
// ============================================================================

/// reward=5, gamma=0 on a 21-atom [-10, 10] grid: every atom maps to 5,
/// which is atom 15 exactly.
#[test]
fn test_zero_gamma_collapses_onto_reward_atom() {
    let p = projector(-10.0, 10.0, 21);
    let probs: Vec<f32> = (1..=21).map(|i| i as f32).collect();
    let total: f32 = probs.iter().sum();
    let probs: Vec<f32> = probs.iter().map(|v| v / total).collect();

    let out = project_one(&p, &probs, 5.0, false, 0.0);

    let mass: f32 = probs.iter().sum();
    assert!((out[15] - mass).abs() < TOL, "bin 15 holds {}", out[15]);
    for (i, &v) in out.iter().enumerate() {
        if i != 15 {
            assert_eq!(v, 0.0, "bin {} should be empty", i);
        }
    }
}

/// A unit reward with gamma=1 shifts mass one atom to the right.
#[test]
fn test_unit_shift_moves_one_atom() {
    let p = projector(-2.0, 2.0, 5);
    let out = project_one(&p, &one_hot(5, 1), 1.0, false, 1.0);
    assert_close(&out, &one_hot(5, 2));
}

/// Zero reward with gamma=1 is the identity on the grid.
#[test]
fn test_identity_update_preserves_distribution() {
    let p = projector(-10.0, 10.0, 51);
    let probs: Vec<f32> = (0..51).map(|i| ((i % 7) + 1) as f32).collect();
    let total: f32 = probs.iter().sum();
    let probs: Vec<f32> = probs.iter().map(|v| v / total).collect();

    let out = project_one(&p, &probs, 0.0, false, 1.0);
    assert_close(&out, &probs);
}

// ============================================================================
// Linear Splitting
// ============================================================================

/// Tz = 0.3 between atoms 0 and 1: 70% to the lower, 30% to the upper.
#[test]
fn test_split_is_proportional_to_distance() {
    let p = projector(-1.0, 1.0, 3);
    let out = project_one(&p, &uniform(3), 0.3, true, 0.99);
    assert_close(&out, &[0.0, 0.7, 0.3]);
}

/// Halving a distribution's support pulls atoms toward the reward.
#[test]
fn test_half_gamma_contracts_support() {
    let p = projector(-4.0, 4.0, 5);
    // Atom -4 → -2 (atom 1), atom 4 → 2 (atom 3), atom 2 → 1 (between 2 and 3).
    let out = project_one(&p, &[0.25, 0.0, 0.0, 0.5, 0.25], 0.0, false, 0.5);
    assert_close(&out, &[0.0, 0.25, 0.25, 0.5, 0.0]);
}

// ============================================================================
// Clipping
// ============================================================================

#[test]
fn test_reward_above_vmax_lands_in_last_atom() {
    let p = projector(-10.0, 10.0, 51);
    let out = project_one(&p, &uniform(51), 1_000.0, false, 0.99);
    assert!((out[50] - 1.0).abs() < TOL);
    assert!(out[..50].iter().all(|&v| v == 0.0));
}

#[test]
fn test_reward_below_vmin_lands_in_first_atom() {
    let p = projector(-10.0, 10.0, 51);
    let out = project_one(&p, &uniform(51), -1_000.0, true, 0.99);
    assert!((out[0] - 1.0).abs() < TOL);
    assert!(out[1..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_bootstrapped_atoms_clip_at_edges() {
    let p = projector(-1.0, 1.0, 3);
    // 1 + 1·z: -1 → 0, 0 → 1, 1 → 2 (clipped to 1).
    let out = project_one(&p, &uniform(3), 1.0, false, 1.0);
    assert_close(&out, &[0.0, 1.0 / 3.0, 2.0 / 3.0]);
}

// ============================================================================
// Terminal Handling
// ============================================================================

#[test]
fn test_terminal_ignores_gamma() {
    let p = projector(-10.0, 10.0, 51);
    let probs: Vec<f32> = (0..51).map(|i| (i as f32 + 1.0) / 1326.0).collect();
    let baseline = project_one(&p, &probs, 1.7, true, 0.0);
    for gamma in [0.1, 0.5, 0.9, 0.99, 1.0] {
        assert_eq!(project_one(&p, &probs, 1.7, true, gamma), baseline);
    }
}

#[test]
fn test_terminal_ignores_target_shape() {
    let p = projector(-10.0, 10.0, 51);
    let a = project_one(&p, &one_hot(51, 3), -0.5, true, 0.99);
    let b = project_one(&p, &one_hot(51, 47), -0.5, true, 0.99);
    assert_close(&a, &b);
}

// ============================================================================
// Batch Projection
// ============================================================================

#[test]
fn test_batch_matches_per_sample_projection() {
    let p = projector(-10.0, 10.0, 11);
    let rows = [uniform(11), one_hot(11, 2), one_hot(11, 9)];
    let rewards = [0.4, -3.0, 12.0];
    let terminals = [false, true, false];
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();

    let batch = p.project_batch(&flat, &rewards, &terminals, 0.9).unwrap();
    assert_eq!(batch.len(), 33);
    for k in 0..3 {
        let single = project_one(&p, &rows[k], rewards[k], terminals[k], 0.9);
        assert_eq!(&batch[k * 11..(k + 1) * 11], single.as_slice());
    }
}

/// Unnormalized input keeps its total; the projector only warns.
#[test]
fn test_batch_preserves_unnormalized_mass() {
    let p = projector(-10.0, 10.0, 11);
    let probs = vec![0.05; 11];
    let out = p.project_batch(&probs, &[2.5], &[false], 0.99).unwrap();
    assert!((out.iter().sum::<f32>() - 0.55).abs() < TOL);
}

// ============================================================================
// Property-Based Tests with Proptest
// ============================================================================

#[cfg(test)]
mod proptest_projection {
    use super::*;
    use proptest::prelude::*;

    /// Strictly positive weights normalized to a distribution.
    fn distribution(n: usize) -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(0.001f32..1.0, n).prop_map(|w| {
            let total: f32 = w.iter().sum();
            w.into_iter().map(|v| v / total).collect()
        })
    }

    fn expectation(p: &CategoricalProjector, probs: &[f32]) -> f32 {
        p.support().expectation(probs).unwrap()
    }

    proptest! {
        /// Property: projection conserves total probability mass.
        #[test]
        fn test_mass_is_conserved(
            probs in distribution(51),
            reward in -25.0f32..25.0,
            gamma in 0.0f32..=1.0,
            terminal in any::<bool>(),
        ) {
            let p = projector(-10.0, 10.0, 51);
            let out = project_one(&p, &probs, reward, terminal, gamma);
            let before: f32 = probs.iter().sum();
            let after: f32 = out.iter().sum();
            prop_assert!(
                (before - after).abs() < TOL,
                "mass {} became {} (r={}, gamma={}, terminal={})",
                before, after, reward, gamma, terminal
            );
        }

        /// Property: every output bin is non-negative.
        #[test]
        fn test_output_is_non_negative(
            probs in distribution(21),
            reward in -25.0f32..25.0,
            gamma in 0.0f32..=1.0,
        ) {
            let p = projector(-10.0, 10.0, 21);
            let out = project_one(&p, &probs, reward, false, gamma);
            for (i, v) in out.iter().enumerate() {
                prop_assert!(*v >= 0.0, "bin {} is {}", i, v);
            }
        }

        /// Property: when nothing is clipped the mean follows the Bellman update.
        #[test]
        fn test_mean_follows_bellman_update(
            probs in distribution(51),
            reward in -5.0f32..5.0,
            gamma in 0.0f32..=0.5,
        ) {
            let p = projector(-10.0, 10.0, 51);
            let out = project_one(&p, &probs, reward, false, gamma);
            let expected = reward + gamma * expectation(&p, &probs);
            let actual = expectation(&p, &out);
            prop_assert!(
                (expected - actual).abs() < 1e-3,
                "mean {} expected {}", actual, expected
            );
        }

        /// Property: a terminal target's mean is the clipped reward.
        #[test]
        fn test_terminal_mean_is_clipped_reward(
            probs in distribution(51),
            reward in -25.0f32..25.0,
        ) {
            let p = projector(-10.0, 10.0, 51);
            let out = project_one(&p, &probs, reward, true, 0.99);
            let actual = expectation(&p, &out);
            prop_assert!((actual - reward.clamp(-10.0, 10.0)).abs() < 1e-3);
        }
    }
}
