//! Episode reward and loss bookkeeping for a single training loop.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of episodes in the moving reward average.
pub const DEFAULT_REWARD_WINDOW: usize = 100;

/// Reward and loss history of a training run.
///
/// Rewards accumulate per step into the current episode; finishing the
/// episode appends its total to the history and updates the moving average.
/// Serializable so a run can resume with its history intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTracker {
    window: usize,
    /// Rewards of the most recent `window` episodes
    recent: VecDeque<f32>,
    recent_sum: f64,

    reward_history: Vec<f32>,
    /// Moving average after each finished episode
    average_history: Vec<f32>,
    loss_history: Vec<f32>,

    episode_reward: f32,
    episode_steps: u64,
    episode_loss_sum: f64,
    episode_loss_count: u64,
}

impl Default for RewardTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_WINDOW)
    }
}

impl RewardTracker {
    /// Create a tracker averaging over the last `window` episodes.
    ///
    /// A window of 0 is treated as 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            recent: VecDeque::with_capacity(window),
            recent_sum: 0.0,
            reward_history: Vec::new(),
            average_history: Vec::new(),
            loss_history: Vec::new(),
            episode_reward: 0.0,
            episode_steps: 0,
            episode_loss_sum: 0.0,
            episode_loss_count: 0,
        }
    }

    /// Record the reward of one agent step in the current episode.
    pub fn record_step(&mut self, reward: f32) {
        self.episode_reward += reward;
        self.episode_steps += 1;
    }

    /// Record the loss of one gradient step.
    pub fn record_loss(&mut self, loss: f32) {
        self.loss_history.push(loss);
        self.episode_loss_sum += loss as f64;
        self.episode_loss_count += 1;
    }

    /// Close the current episode and return its total reward.
    pub fn finish_episode(&mut self) -> f32 {
        let reward = self.episode_reward;

        if self.recent.len() == self.window {
            if let Some(old) = self.recent.pop_front() {
                self.recent_sum -= old as f64;
            }
        }
        self.recent.push_back(reward);
        self.recent_sum += reward as f64;

        self.reward_history.push(reward);
        self.average_history.push(self.average_reward());

        self.episode_reward = 0.0;
        self.episode_steps = 0;
        self.episode_loss_sum = 0.0;
        self.episode_loss_count = 0;
        reward
    }

    /// Mean reward over the last `window` finished episodes (0 if none).
    pub fn average_reward(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        (self.recent_sum / self.recent.len() as f64) as f32
    }

    /// Mean loss recorded during the current episode (0 if none).
    pub fn episode_loss(&self) -> f32 {
        if self.episode_loss_count == 0 {
            return 0.0;
        }
        (self.episode_loss_sum / self.episode_loss_count as f64) as f32
    }

    /// Reward accumulated so far in the current episode.
    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    /// Steps taken so far in the current episode.
    pub fn episode_steps(&self) -> u64 {
        self.episode_steps
    }

    /// Number of finished episodes.
    pub fn episodes(&self) -> usize {
        self.reward_history.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn reward_history(&self) -> &[f32] {
        &self.reward_history
    }

    pub fn average_history(&self) -> &[f32] {
        &self.average_history
    }

    pub fn loss_history(&self) -> &[f32] {
        &self.loss_history
    }

    /// Mean and population standard deviation of all finished episodes.
    pub fn summary(&self) -> (f32, f32) {
        let n = self.reward_history.len();
        if n == 0 {
            return (0.0, 0.0);
        }
        let mean = self.reward_history.iter().map(|&r| r as f64).sum::<f64>() / n as f64;
        let var = self
            .reward_history
            .iter()
            .map(|&r| (r as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        (mean as f32, var.sqrt() as f32)
    }
}
