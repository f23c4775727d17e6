//! Fixed discrete support of value atoms.
//!
//! The atoms are `vmin, vmin + Δ, …, vmax` with `Δ = (vmax - vmin) / (N - 1)`.
//! The last atom is pinned to `vmax` so that it is exact regardless of
//! floating-point rounding in `vmin + (N - 1) * Δ`.

use super::error::C51Error;

/// Immutable, evenly spaced grid of return values.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSupport {
    vmin: f32,
    vmax: f32,
    delta: f32,
    atoms: Vec<f32>,
}

impl FixedSupport {
    /// Create a support of `num_atoms` atoms spanning `[vmin, vmax]`.
    ///
    /// Fails with `InvalidConfiguration` if `num_atoms < 2`, if `vmax <= vmin`,
    /// or if either bound is not finite.
    pub fn new(vmin: f32, vmax: f32, num_atoms: usize) -> Result<Self, C51Error> {
        if num_atoms < 2 {
            return Err(C51Error::invalid(
                "num_atoms",
                format!("must be >= 2, got {}", num_atoms),
            ));
        }
        if !vmin.is_finite() || !vmax.is_finite() {
            return Err(C51Error::invalid(
                "vmin/vmax",
                format!("bounds must be finite, got [{}, {}]", vmin, vmax),
            ));
        }
        if vmax <= vmin {
            return Err(C51Error::invalid(
                "vmax",
                format!("must be > vmin ({}), got {}", vmin, vmax),
            ));
        }

        let delta = (vmax - vmin) / (num_atoms - 1) as f32;
        let atoms = (0..num_atoms)
            .map(|i| {
                if i + 1 == num_atoms {
                    vmax
                } else {
                    vmin + i as f32 * delta
                }
            })
            .collect();

        Ok(Self {
            vmin,
            vmax,
            delta,
            atoms,
        })
    }

    /// Value of atom `i`.
    ///
    /// # Panics
    /// Panics if `i >= num_atoms`.
    #[inline]
    pub fn atom_value(&self, i: usize) -> f32 {
        self.atoms[i]
    }

    /// Spacing between neighbouring atoms.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn vmin(&self) -> f32 {
        self.vmin
    }

    #[inline]
    pub fn vmax(&self) -> f32 {
        self.vmax
    }

    #[inline]
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// All atom values in increasing order.
    #[inline]
    pub fn atoms(&self) -> &[f32] {
        &self.atoms
    }

    /// Expected value of a distribution over this support.
    pub fn expectation(&self, probs: &[f32]) -> Result<f32, C51Error> {
        if probs.len() != self.num_atoms() {
            return Err(C51Error::shape("probs", self.num_atoms(), probs.len()));
        }
        Ok(probs.iter().zip(&self.atoms).map(|(p, z)| p * z).sum())
    }
}
