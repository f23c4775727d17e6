//! Progress loggers for the training loop.
//!
//! Provides different sinks for per-episode training metrics.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Per-episode training snapshot for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSnapshot {
    /// 0-based index of the episode that just finished.
    pub episode: u64,
    /// Total reward of that episode.
    pub reward: f32,
    /// Moving average reward.
    pub avg_reward: f32,
    /// Mean loss over the episode's gradient steps.
    pub loss: f32,
    /// Exploration rate at the end of the episode.
    pub epsilon: f32,
    /// Agent steps in the episode.
    pub episode_steps: u64,
    /// Agent steps since training started.
    pub total_steps: u64,
}

impl TrainingSnapshot {
    /// Create a new training snapshot.
    pub fn new(episode: u64, reward: f32, avg_reward: f32) -> Self {
        Self {
            episode,
            reward,
            avg_reward,
            loss: 0.0,
            epsilon: 0.0,
            episode_steps: 0,
            total_steps: 0,
        }
    }

    pub fn with_loss(mut self, loss: f32) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the episode length and the running step total.
    pub fn with_steps(mut self, episode_steps: u64, total_steps: u64) -> Self {
        self.episode_steps = episode_steps;
        self.total_steps = total_steps;
        self
    }
}

/// Logger trait for different logging backends.
pub trait MetricsLogger: Send {
    /// Log a training snapshot.
    fn log(&mut self, snapshot: &TrainingSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Progress lines through the `log` facade, every `print_every` episodes.
pub struct ConsoleLogger {
    print_every: u64,
    start_time: Instant,
    started: bool,
}

impl ConsoleLogger {
    /// A `print_every` of 0 is treated as 1.
    pub fn new(print_every: usize) -> Self {
        Self {
            print_every: print_every.max(1) as u64,
            start_time: Instant::now(),
            started: false,
        }
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }

    /// Whether the episode with this 0-based index is reported.
    pub fn should_log(&self, episode: u64) -> bool {
        episode % self.print_every == 0
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        if !self.started {
            log::info!("Start training C51");
            self.started = true;
        }
        if !self.should_log(snapshot.episode) {
            return;
        }

        log::info!(
            "Episode {}: reward {}, avg_reward {:.3}, loss {:.5}, epsilon {:.3}, steps {}, total steps {}",
            snapshot.episode + 1,
            snapshot.reward,
            snapshot.avg_reward,
            snapshot.loss,
            snapshot.epsilon,
            snapshot.episode_steps,
            snapshot.total_steps
        );
        log::info!(
            "time (minutes): {}",
            self.start_time.elapsed().as_secs() / 60
        );
    }

    fn flush(&mut self) {
        log::logger().flush();
    }
}

/// CSV file logger for analysis.
pub struct CSVLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CSVLogger {
    /// Create a new CSV logger, truncating `path`.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "episode,reward,avg_reward,loss,epsilon,episode_steps,total_steps,elapsed_secs"
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }
}

impl MetricsLogger for CSVLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        if let Err(e) = writeln!(
            self.writer,
            "{},{},{:.4},{:.6},{:.4},{},{},{:.2}",
            snapshot.episode + 1,
            snapshot.reward,
            snapshot.avg_reward,
            snapshot.loss,
            snapshot.epsilon,
            snapshot.episode_steps,
            snapshot.total_steps,
            elapsed
        ) {
            log::warn!("Failed to write metrics row: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush metrics file: {}", e);
        }
    }
}

impl Drop for CSVLogger {
    fn drop(&mut self) {
        self.flush();
    }
}
