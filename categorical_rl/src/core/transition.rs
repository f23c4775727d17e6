//! Transition records stored alongside frames in the replay ring.
//!
//! A record sits in the same ring slot as the frame the agent acted from:
//! `record[i]` describes the step that moved the agent from `frame[i]` to
//! `frame[i + 1]`.

use serde::{Deserialize, Serialize};

/// Width of a record row in the persisted `(capacity, 3)` layout.
pub const RECORD_WIDTH: usize = 3;

/// Action, reward and terminal flag of one environment step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Discrete action index taken
    pub action: u32,
    /// Reward received (already sign-clipped by the caller)
    pub reward: f32,
    /// Episode ended with this step
    pub terminal: bool,
}

impl TransitionRecord {
    /// Create a new record.
    pub fn new(action: u32, reward: f32, terminal: bool) -> Self {
        Self {
            action,
            reward,
            terminal,
        }
    }

    /// `0.0` for terminal steps, `1.0` otherwise.
    ///
    /// Multiplies the discounted future value in the Bellman target.
    #[inline]
    pub fn continuation(&self) -> f32 {
        1.0 - self.terminal_f32()
    }

    #[inline]
    pub fn terminal_f32(&self) -> f32 {
        if self.terminal {
            1.0
        } else {
            0.0
        }
    }

    /// Persisted row `(action, reward, terminal-as-float)`.
    pub fn to_row(&self) -> [f32; RECORD_WIDTH] {
        [self.action as f32, self.reward, self.terminal_f32()]
    }

    /// Inverse of [`to_row`](Self::to_row).
    ///
    /// The action is rounded and negative values saturate to 0; any non-zero
    /// terminal column counts as terminal.
    pub fn from_row(row: [f32; RECORD_WIDTH]) -> Self {
        Self {
            action: row[0].round().max(0.0) as u32,
            reward: row[1],
            terminal: row[2] != 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation() {
        assert_eq!(TransitionRecord::new(0, 1.0, false).continuation(), 1.0);
        assert_eq!(TransitionRecord::new(0, 1.0, true).continuation(), 0.0);
    }

    #[test]
    fn test_row_layout() {
        let record = TransitionRecord::new(3, -1.0, true);
        assert_eq!(record.to_row(), [3.0, -1.0, 1.0]);
        assert_eq!(TransitionRecord::from_row(record.to_row()), record);
    }

    #[test]
    fn test_from_row_tolerates_float_noise() {
        let record = TransitionRecord::from_row([4.0000005, 0.0, 0.0]);
        assert_eq!(record.action, 4);
        assert!(!record.terminal);
    }

    #[test]
    fn test_default_is_zeroed() {
        let record = TransitionRecord::default();
        assert_eq!(record.to_row(), [0.0, 0.0, 0.0]);
    }
}
