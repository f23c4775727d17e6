//! Exploration rate schedules for ε-greedy acting.
//!
//! - `ConstantEpsilon`: Fixed exploration rate
//! - `LinearDecay`: Linear anneal from `start` to `end` over a number of frames
//!
//! # Data Integrity
//!
//! Schedulers validate inputs in debug builds and sanitize them in release
//! builds, so an ε outside `[0, 1]` never reaches action selection:
//!
//! - **Non-finite inputs**: NaN/Inf rates trigger a debug panic
//! - **Out-of-range rates**: values outside `[0, 1]` trigger a debug panic
//! - **Output clamping**: results stay between `start` and `end`

/// Exploration rate scheduler.
pub trait EpsilonScheduler: Send + Sync {
    /// ε to use at environment step `step` (0-based).
    fn epsilon(&self, step: u64) -> f32;
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Constant exploration rate.
///
/// In release builds, non-finite values become `1.0` (fully random).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantEpsilon {
    epsilon: f32,
}

impl ConstantEpsilon {
    /// # Panics (debug only)
    ///
    /// Panics if `epsilon` is non-finite or outside `[0, 1]`.
    pub fn new(epsilon: f32) -> Self {
        debug_assert!(
            epsilon.is_finite() && (0.0..=1.0).contains(&epsilon),
            "ConstantEpsilon: epsilon must be in [0, 1], got {}",
            epsilon
        );
        Self {
            epsilon: sanitize(epsilon),
        }
    }
}

impl EpsilonScheduler for ConstantEpsilon {
    fn epsilon(&self, _step: u64) -> f32 {
        self.epsilon
    }
}

/// Linear decay from `start` to `end` over `frames` steps.
///
/// ```text
/// ε(step) = start - (start - end) / (frames - 1) · (step + 1)
/// ε(step) = end                         for step > frames - 2
/// ```
///
/// The `step + 1` offset means step 0 already takes one decrement. With
/// `frames <= 1` the schedule is `end` from the first step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    start: f32,
    end: f32,
    frames: u64,
}

impl LinearDecay {
    /// # Panics (debug only)
    ///
    /// Panics if `start` or `end` is non-finite or outside `[0, 1]`.
    pub fn new(start: f32, end: f32, frames: u64) -> Self {
        debug_assert!(
            start.is_finite() && (0.0..=1.0).contains(&start),
            "LinearDecay: start must be in [0, 1], got {}",
            start
        );
        debug_assert!(
            end.is_finite() && (0.0..=1.0).contains(&end),
            "LinearDecay: end must be in [0, 1], got {}",
            end
        );

        Self {
            start: sanitize(start),
            end: sanitize(end),
            frames,
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    /// Number of steps over which ε is annealed.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl EpsilonScheduler for LinearDecay {
    fn epsilon(&self, step: u64) -> f32 {
        if self.frames <= 1 || step > self.frames - 2 {
            return self.end;
        }

        let slope = (self.start as f64 - self.end as f64) / (self.frames - 1) as f64;
        let eps = self.start as f64 - slope * (step + 1) as f64;

        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        (eps as f32).clamp(lo, hi)
    }
}
