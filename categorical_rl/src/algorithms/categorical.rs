//! Categorical (C51) Bellman projection.
//!
//! The distributional Bellman update shifts and scales each support atom,
//! which moves probability mass off the fixed grid. The projection puts that
//! mass back onto the two nearest atoms in proportion to distance.
//!
//! ## Key Equations
//!
//! For each target atom j with probability p_j:
//! - Tz_j = clip(r + (1 - done) · γ · z_j, V_min, V_max)
//! - b_j  = (Tz_j - V_min) / Δz
//! - l = ⌊b_j⌋, u = ⌈b_j⌉
//! - m_l += p_j · (u - b_j),  m_u += p_j · (b_j - l)   (m_l += p_j when l == u)
//!
//! ```text
//!   z:   -10 ........ -1    0    1 ........ 10
//!                         ^    ^
//!                   Tz = 0.3 → 70% to 0, 30% to 1
//! ```
//!
//! ## References
//!
//! - Bellemare et al., "A Distributional Perspective on Reinforcement
//!   Learning" (2017), Algorithm 1

use crate::core::error::C51Error;
use crate::core::support::FixedSupport;

/// Tolerance for the "probabilities sum to one" sanity warning.
const MASS_WARN_TOLERANCE: f32 = 1e-3;

/// Projects shifted target distributions back onto a fixed support.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalProjector {
    support: FixedSupport,
}

impl CategoricalProjector {
    pub fn new(support: FixedSupport) -> Self {
        Self { support }
    }

    /// The support distributions are projected onto.
    pub fn support(&self) -> &FixedSupport {
        &self.support
    }

    /// Number of atoms per distribution.
    #[inline]
    pub fn num_atoms(&self) -> usize {
        self.support.num_atoms()
    }

    fn check_gamma(gamma: f32) -> Result<(), C51Error> {
        if !gamma.is_finite() || !(0.0..=1.0).contains(&gamma) {
            return Err(C51Error::invalid(
                "gamma",
                format!("must be finite and in [0, 1], got {}", gamma),
            ));
        }
        Ok(())
    }

    /// Project a single target distribution into `out`.
    ///
    /// `out` is overwritten. Its total mass equals the total mass of
    /// `target_probs`.
    pub fn project(
        &self,
        target_probs: &[f32],
        reward: f32,
        terminal: bool,
        gamma: f32,
        out: &mut [f32],
    ) -> Result<(), C51Error> {
        Self::check_gamma(gamma)?;
        let n = self.num_atoms();
        if target_probs.len() != n {
            return Err(C51Error::shape("target_probs", n, target_probs.len()));
        }
        if out.len() != n {
            return Err(C51Error::shape("projection output", n, out.len()));
        }

        self.project_unchecked(target_probs, reward, terminal, gamma, out);
        Ok(())
    }

    /// Scatter-add projection; lengths and gamma already validated.
    fn project_unchecked(
        &self,
        target_probs: &[f32],
        reward: f32,
        terminal: bool,
        gamma: f32,
        out: &mut [f32],
    ) {
        let support = &self.support;
        let (vmin, vmax, delta) = (support.vmin(), support.vmax(), support.delta());
        let last = (support.num_atoms() - 1) as f32;
        let discount = if terminal { 0.0 } else { gamma };

        out.fill(0.0);
        for (&z, &p) in support.atoms().iter().zip(target_probs) {
            let tz = (reward + discount * z).clamp(vmin, vmax);
            let b = (tz - vmin) / delta;
            let l = b.floor().clamp(0.0, last);
            let u = b.ceil().clamp(0.0, last);

            if l == u {
                out[l as usize] += p;
            } else {
                out[l as usize] += p * (u - b);
                out[u as usize] += p * (b - l);
            }
        }
    }

    /// Project a batch of target distributions.
    ///
    /// `target_probs` is row-major `(batch, num_atoms)`; the result has the
    /// same layout.
    pub fn project_batch(
        &self,
        target_probs: &[f32],
        rewards: &[f32],
        terminals: &[bool],
        gamma: f32,
    ) -> Result<Vec<f32>, C51Error> {
        Self::check_gamma(gamma)?;
        let n = self.num_atoms();
        let batch = rewards.len();
        if terminals.len() != batch {
            return Err(C51Error::shape("terminals", batch, terminals.len()));
        }
        if target_probs.len() != batch * n {
            return Err(C51Error::shape("target_probs", batch * n, target_probs.len()));
        }

        let mut projected = vec![0.0f32; batch * n];
        for (k, (probs, out)) in target_probs
            .chunks_exact(n)
            .zip(projected.chunks_exact_mut(n))
            .enumerate()
        {
            let mass: f32 = probs.iter().sum();
            if (mass - 1.0).abs() > MASS_WARN_TOLERANCE {
                log::warn!(
                    "Target distribution {} sums to {:.6}, expected 1.0",
                    k,
                    mass
                );
            }
            self.project_unchecked(probs, rewards[k], terminals[k], gamma, out);
        }

        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector(vmin: f32, vmax: f32, n: usize) -> CategoricalProjector {
        CategoricalProjector::new(FixedSupport::new(vmin, vmax, n).unwrap())
    }

    #[test]
    fn test_rejects_bad_gamma() {
        let p = projector(-10.0, 10.0, 51);
        let probs = vec![1.0 / 51.0; 51];
        let mut out = vec![0.0; 51];
        for gamma in [-0.1, 1.5, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                p.project(&probs, 0.0, false, gamma, &mut out),
                Err(C51Error::InvalidConfiguration { field: "gamma", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        let p = projector(-10.0, 10.0, 11);
        let mut out = vec![0.0; 11];
        assert!(matches!(
            p.project(&[0.5, 0.5], 0.0, false, 0.9, &mut out),
            Err(C51Error::ShapeMismatch { what: "target_probs", .. })
        ));
        assert!(matches!(
            p.project_batch(&[0.0; 22], &[0.0, 0.0], &[false], 0.9),
            Err(C51Error::ShapeMismatch { what: "terminals", .. })
        ));
        assert!(matches!(
            p.project_batch(&[0.0; 21], &[0.0, 0.0], &[false, false], 0.9),
            Err(C51Error::ShapeMismatch { what: "target_probs", .. })
        ));
    }

    #[test]
    fn test_overwrites_output() {
        let p = projector(-1.0, 1.0, 3);
        let mut out = vec![9.0; 3];
        p.project(&[0.0, 1.0, 0.0], 0.0, true, 0.9, &mut out).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_batch() {
        let p = projector(-1.0, 1.0, 3);
        assert!(p.project_batch(&[], &[], &[], 0.99).unwrap().is_empty());
    }
}
