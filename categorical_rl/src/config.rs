//! Configuration for categorical DQN training.
//!
//! Defaults follow the usual Atari setup for C51: 51 atoms on `[-10, 10]`,
//! a one-million-frame replay ring and ε annealed from 1.0 to 0.1 over the
//! first million frames.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::algorithms::categorical::CategoricalProjector;
use crate::buffers::CircularFrameStore;
use crate::core::error::C51Error;
use crate::core::frame::STACK_DEPTH;
use crate::core::support::FixedSupport;
use crate::scheduling::LinearDecay;

/// Configuration for a C51 agent.
#[derive(Debug, Clone, PartialEq)]
pub struct C51Config {
    // Optimization
    /// Optimizer learning rate
    pub learning_rate: f64,
    /// Discount factor
    pub gamma: f32,
    /// Samples per gradient step
    pub batch_size: usize,

    // Value distribution
    /// Lower bound of the return support
    pub vmin: f32,
    /// Upper bound of the return support
    pub vmax: f32,
    /// Number of support atoms
    pub num_atoms: usize,

    // Replay
    /// Frame slots in the replay ring
    pub replay_capacity: usize,

    // Exploration
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    /// Steps over which ε is annealed
    pub epsilon_decay_frames: u64,

    // Environment
    /// Emulator frames per agent step (max-pooled, rewards summed)
    pub skip_frame: usize,

    // Reporting
    /// Log progress every N episodes
    pub print_every: usize,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for C51Config {
    fn default() -> Self {
        Self {
            learning_rate: 2.5e-4,
            gamma: 0.99,
            batch_size: 32,
            vmin: -10.0,
            vmax: 10.0,
            num_atoms: 51,
            replay_capacity: 1_000_000,
            epsilon_start: 1.0,
            epsilon_end: 0.1,
            epsilon_decay_frames: 1_000_000,
            skip_frame: 4,
            print_every: 10,
            seed: None,
        }
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), C51Error> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(C51Error::invalid(
            field,
            format!("must be in [0, 1], got {}", value),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: usize) -> Result<(), C51Error> {
    if value == 0 {
        return Err(C51Error::invalid(field, "must be > 0, got 0"));
    }
    Ok(())
}

impl C51Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<(), C51Error> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(C51Error::invalid(
                "learning_rate",
                format!("must be finite and > 0, got {}", self.learning_rate),
            ));
        }
        check_unit("gamma", self.gamma)?;
        check_positive("batch_size", self.batch_size)?;
        check_positive("skip_frame", self.skip_frame)?;
        check_positive("print_every", self.print_every)?;

        if self.num_atoms < 2 {
            return Err(C51Error::invalid(
                "num_atoms",
                format!("must be >= 2, got {}", self.num_atoms),
            ));
        }
        if !self.vmin.is_finite() || !self.vmax.is_finite() || self.vmax <= self.vmin {
            return Err(C51Error::invalid(
                "vmax",
                format!("must exceed vmin ({} <= {})", self.vmax, self.vmin),
            ));
        }
        if self.replay_capacity <= STACK_DEPTH {
            return Err(C51Error::invalid(
                "replay_capacity",
                format!("must be > {}, got {}", STACK_DEPTH, self.replay_capacity),
            ));
        }

        check_unit("epsilon_start", self.epsilon_start)?;
        check_unit("epsilon_end", self.epsilon_end)?;
        Ok(())
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Self, C51Error> {
        self.validate()?;
        Ok(self)
    }

    // Builder methods

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the return support `[vmin, vmax]` and its resolution.
    pub fn with_support(mut self, vmin: f32, vmax: f32, num_atoms: usize) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self.num_atoms = num_atoms;
        self
    }

    pub fn with_replay_capacity(mut self, capacity: usize) -> Self {
        self.replay_capacity = capacity;
        self
    }

    /// Set the ε schedule: `start` → `end` over `frames` steps.
    pub fn with_epsilon(mut self, start: f32, end: f32, frames: u64) -> Self {
        self.epsilon_start = start;
        self.epsilon_end = end;
        self.epsilon_decay_frames = frames;
        self
    }

    pub fn with_skip_frame(mut self, skip: usize) -> Self {
        self.skip_frame = skip;
        self
    }

    pub fn with_print_every(mut self, episodes: usize) -> Self {
        self.print_every = episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // Factories

    pub fn support(&self) -> Result<FixedSupport, C51Error> {
        FixedSupport::new(self.vmin, self.vmax, self.num_atoms)
    }

    pub fn projector(&self) -> Result<CategoricalProjector, C51Error> {
        Ok(CategoricalProjector::new(self.support()?))
    }

    /// Allocate the replay ring. This is `replay_capacity × 7 KiB` of frames.
    pub fn frame_store(&self) -> Result<CircularFrameStore, C51Error> {
        CircularFrameStore::new(self.replay_capacity)
    }

    pub fn epsilon_schedule(&self) -> LinearDecay {
        LinearDecay::new(
            self.epsilon_start,
            self.epsilon_end,
            self.epsilon_decay_frames,
        )
    }

    /// RNG for sampling and exploration, seeded from `seed` when set.
    pub fn rng(&self) -> Xoshiro256StarStar {
        let seed = self.seed.unwrap_or_else(rand::random);
        log::debug!("Seeding RNG with {}", seed);
        Xoshiro256StarStar::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::EpsilonScheduler;
    use rand::Rng;

    #[test]
    fn test_default_is_valid() {
        let config = C51Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_atoms, 51);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.replay_capacity, 1_000_000);
    }

    #[test]
    fn test_builder_chain() {
        let config = C51Config::new()
            .with_gamma(0.9)
            .with_support(-5.0, 5.0, 21)
            .with_replay_capacity(64)
            .with_batch_size(8)
            .with_epsilon(0.5, 0.05, 100)
            .with_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.support().unwrap().num_atoms(), 21);
        assert_eq!(config.frame_store().unwrap().capacity(), 64);
        assert_eq!(config.projector().unwrap().support().vmax(), 5.0);
        assert_eq!(config.epsilon_schedule().epsilon(1_000), 0.05);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let cases: Vec<(C51Config, &str)> = vec![
            (C51Config::new().with_gamma(1.01), "gamma"),
            (C51Config::new().with_batch_size(0), "batch_size"),
            (C51Config::new().with_support(-1.0, 1.0, 1), "num_atoms"),
            (C51Config::new().with_support(1.0, -1.0, 51), "vmax"),
            (C51Config::new().with_replay_capacity(4), "replay_capacity"),
            (C51Config::new().with_epsilon(1.2, 0.1, 10), "epsilon_start"),
            (C51Config::new().with_learning_rate(0.0), "learning_rate"),
            (C51Config::new().with_skip_frame(0), "skip_frame"),
        ];
        for (config, expected) in cases {
            match config.build() {
                Err(C51Error::InvalidConfiguration { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {} to be rejected, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = C51Config::new().with_seed(42);
        let (mut a, mut b) = (config.rng(), config.rng());
        for _ in 0..8 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }
}
